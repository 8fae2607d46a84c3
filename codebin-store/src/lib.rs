//! Snippet storage for codebin.
//!
//! [`SnippetStore`] is the namespace-scoped key-value adapter, with an
//! in-memory and a file-backed implementation. [`SnippetLifecycle`] layers
//! the retention policy on top: lazy expiry on read and a bulk sweep.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod error;
pub mod file;
pub mod lifecycle;
pub mod memory;

pub use backend::{SnippetStore, SnippetStream};
pub use error::{LifecycleError, StoreError};
pub use file::FileStore;
pub use lifecycle::{LoadOutcome, SnippetLifecycle, SweepReport};
pub use memory::MemoryStore;
