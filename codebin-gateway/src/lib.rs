//! HTTP gateway for the codebin snippet store.
//!
//! Exposes snippet save/load endpoints backed by the TTL lifecycle manager,
//! a pass-through compile endpoint, and the daily expiry sweep.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod compile;
pub mod config;
pub mod error;
pub mod page;
pub mod routes;
pub mod scheduler;
