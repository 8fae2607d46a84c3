//! In-process store backed by nested hash maps.
//!
//! Nothing survives a restart. Used when no data directory is configured and
//! as the fake in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use codebin_core::{Namespace, Snippet, SnippetId};
use futures::{stream, StreamExt};
use tokio::sync::RwLock;

use crate::backend::{SnippetStore, SnippetStream};
use crate::StoreError;

type Entries = HashMap<Namespace, HashMap<SnippetId, Snippet>>;

/// Thread-safe in-memory snippet store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries under `namespace`.
    pub async fn len(&self, namespace: &Namespace) -> usize {
        self.entries.read().await.get(namespace).map_or(0, HashMap::len)
    }

    /// `true` if `namespace` holds no entries.
    pub async fn is_empty(&self, namespace: &Namespace) -> bool {
        self.len(namespace).await == 0
    }
}

#[async_trait]
impl SnippetStore for MemoryStore {
    async fn get(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
    ) -> Result<Option<Snippet>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .get(namespace)
            .and_then(|ns| ns.get(id))
            .cloned())
    }

    async fn set(&self, namespace: &Namespace, snippet: &Snippet) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .entry(namespace.clone())
            .or_default()
            .insert(snippet.id.clone(), snippet.clone());
        Ok(())
    }

    async fn delete(&self, namespace: &Namespace, id: &SnippetId) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .write()
            .await
            .get_mut(namespace)
            .and_then(|ns| ns.remove(id))
            .is_some())
    }

    async fn delete_if_unchanged(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
        created_at: i64,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let Some(ns) = entries.get_mut(namespace) else {
            return Ok(false);
        };
        match ns.get(id) {
            Some(current) if current.created_at == created_at => {
                ns.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn list_all(&self, namespace: &Namespace) -> SnippetStream {
        // The namespace is snapshotted on first poll; the lock is not held
        // while the caller consumes the stream.
        let entries = Arc::clone(&self.entries);
        let namespace = namespace.clone();
        stream::once(async move {
            let snapshot: Vec<Result<Snippet, StoreError>> = entries
                .read()
                .await
                .get(&namespace)
                .map(|ns| ns.values().cloned().map(Ok).collect())
                .unwrap_or_default();
            stream::iter(snapshot)
        })
        .flatten()
        .boxed()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
