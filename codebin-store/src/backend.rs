//! Store adapter abstraction.
//!
//! Allows swapping between the in-memory and file-backed stores (or a test
//! fake) without changing the lifecycle logic.

use std::sync::Arc;

use async_trait::async_trait;
use codebin_core::{Namespace, Snippet, SnippetId};
use futures::stream::BoxStream;

use crate::StoreError;

/// Lazy, non-restartable listing of a namespace.
///
/// Each item is one entry; an `Err` item reports a single unreadable entry
/// and the stream keeps going after it.
pub type SnippetStream = BoxStream<'static, Result<Snippet, StoreError>>;

/// Namespace-scoped key-value access with no business logic.
///
/// Implementations perform no retries. Every failure of the underlying
/// medium surfaces as a [`StoreError`].
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Fetch the snippet at `(namespace, id)`. No side effects.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the store cannot be read.
    async fn get(&self, namespace: &Namespace, id: &SnippetId)
        -> Result<Option<Snippet>, StoreError>;

    /// Upsert `snippet` at `(namespace, snippet.id)`.
    ///
    /// The write is atomic: readers see either the old or the new value.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the write fails; nothing is stored then.
    async fn set(&self, namespace: &Namespace, snippet: &Snippet) -> Result<(), StoreError>;

    /// Remove the key if present. Returns whether a value was removed.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the store cannot be written.
    async fn delete(&self, namespace: &Namespace, id: &SnippetId) -> Result<bool, StoreError>;

    /// Remove the key only if the stored `created_at` equals `created_at`.
    ///
    /// Compare and delete happen atomically with respect to `set`, so a save
    /// that lands after the caller's read is never removed.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the store cannot be read or written.
    async fn delete_if_unchanged(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
        created_at: i64,
    ) -> Result<bool, StoreError>;

    /// List every entry under `namespace` at call time, lazily.
    ///
    /// No ordering is guaranteed. Entries written after the call may or may
    /// not appear.
    fn list_all(&self, namespace: &Namespace) -> SnippetStream;

    /// Check that the store is reachable.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] or [`StoreError::Io`] if not.
    async fn health_check(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: SnippetStore + ?Sized> SnippetStore for Arc<T> {
    async fn get(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
    ) -> Result<Option<Snippet>, StoreError> {
        (**self).get(namespace, id).await
    }

    async fn set(&self, namespace: &Namespace, snippet: &Snippet) -> Result<(), StoreError> {
        (**self).set(namespace, snippet).await
    }

    async fn delete(&self, namespace: &Namespace, id: &SnippetId) -> Result<bool, StoreError> {
        (**self).delete(namespace, id).await
    }

    async fn delete_if_unchanged(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
        created_at: i64,
    ) -> Result<bool, StoreError> {
        (**self).delete_if_unchanged(namespace, id, created_at).await
    }

    fn list_all(&self, namespace: &Namespace) -> SnippetStream {
        (**self).list_all(namespace)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        (**self).health_check().await
    }
}
