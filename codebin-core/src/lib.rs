//! Core types for the codebin snippet store.
//!
//! Defines the snippet record, its two-level key (namespace, id), the
//! retention window and the clock used to evaluate it.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod error;
pub mod id;
pub mod snippet;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CoreError;
pub use id::{Namespace, SnippetId};
pub use snippet::{Snippet, Ttl};
