//! Snippet lifecycle manager: TTL policy, lazy expiry on read, and the
//! namespace-wide sweep.
//!
//! Both expiry paths remove entries with
//! [`SnippetStore::delete_if_unchanged`], keyed on the `created_at` that was
//! just read. A save landing between the read and the delete therefore
//! survives; the stale delete becomes a no-op.

use std::sync::Arc;

use codebin_core::{Clock, Namespace, Snippet, SnippetId, SystemClock, Ttl};
use futures::StreamExt;

use crate::backend::SnippetStore;
use crate::LifecycleError;

/// Result of a [`SnippetLifecycle::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snippet is live.
    Found(Snippet),
    /// Nothing was ever stored at the id, or it was already removed.
    NotFound,
    /// The snippet existed but had outlived the TTL; it has been deleted.
    Expired,
}

/// Counters for one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries read from the listing.
    pub scanned: usize,
    /// Expired entries removed.
    pub deleted: usize,
    /// Expired entries left alone because a newer save replaced them.
    pub skipped: usize,
    /// Entries that could not be read or deleted.
    pub failed: usize,
}

/// Enforces the retention window over a [`SnippetStore`].
///
/// The manager holds no state besides its configuration; the store is the
/// only shared mutable resource.
pub struct SnippetLifecycle<S: SnippetStore> {
    store: S,
    namespace: Namespace,
    ttl: Ttl,
    clock: Arc<dyn Clock>,
}

impl<S: SnippetStore> SnippetLifecycle<S> {
    /// Manage `store` with the `"codes"` namespace, a 30 day TTL and the
    /// system clock.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            namespace: Namespace::codes(),
            ttl: Ttl::DEFAULT,
            clock: Arc::new(SystemClock),
        }
    }

    /// Override the retention window.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    /// Read time from `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Keep snippets under `namespace` instead of `"codes"`.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configured retention window.
    #[must_use]
    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    /// Store `content` at `id`, stamped with the current time.
    ///
    /// Any previous snippet at `id` is replaced; the last writer wins.
    ///
    /// # Errors
    /// Returns [`LifecycleError::InvalidArgument`] if `id` is empty or
    /// `content` is `None`, and [`LifecycleError::Store`] if the write fails.
    pub async fn save(&self, id: &str, content: Option<&str>) -> Result<Snippet, LifecycleError> {
        let id = SnippetId::new(id)?;
        let Some(content) = content else {
            return Err(LifecycleError::InvalidArgument("content is missing".to_owned()));
        };
        let snippet = Snippet::new(id, content, self.clock.now_millis());
        self.store.set(&self.namespace, &snippet).await?;
        tracing::debug!(id = %snippet.id, bytes = snippet.content.len(), "snippet saved");
        Ok(snippet)
    }

    /// Fetch the snippet at `id`, deleting it first if it has expired.
    ///
    /// An expired value is never returned. The delete completes before this
    /// returns, so a following `load` sees [`LoadOutcome::NotFound`].
    ///
    /// # Errors
    /// Returns [`LifecycleError::InvalidArgument`] for an empty id and
    /// [`LifecycleError::Store`] if the read or the expiry delete fails.
    pub async fn load(&self, id: &str) -> Result<LoadOutcome, LifecycleError> {
        let id = SnippetId::new(id)?;
        let Some(snippet) = self.store.get(&self.namespace, &id).await? else {
            return Ok(LoadOutcome::NotFound);
        };
        let now = self.clock.now_millis();
        if !self.ttl.is_expired(&snippet, now) {
            return Ok(LoadOutcome::Found(snippet));
        }

        let removed = self
            .store
            .delete_if_unchanged(&self.namespace, &id, snippet.created_at)
            .await?;
        tracing::debug!(
            %id,
            age_ms = snippet.age_at(now),
            removed,
            "expired snippet removed on read"
        );
        Ok(LoadOutcome::Expired)
    }

    /// Remove the snippet at `id`. Returns whether one existed.
    ///
    /// # Errors
    /// Returns [`LifecycleError::InvalidArgument`] for an empty id and
    /// [`LifecycleError::Store`] if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<bool, LifecycleError> {
        let id = SnippetId::new(id)?;
        Ok(self.store.delete(&self.namespace, &id).await?)
    }

    /// Delete every expired snippet in the namespace.
    ///
    /// The expiry cut-off is evaluated against the time the sweep started.
    /// A failure to read or delete one entry is logged and counted; the pass
    /// continues with the next entry and never fails as a whole.
    pub async fn sweep(&self) -> SweepReport {
        let now = self.clock.now_millis();
        let mut report = SweepReport::default();
        let mut entries = self.store.list_all(&self.namespace);

        while let Some(item) = entries.next().await {
            report.scanned += 1;
            let snippet = match item {
                Ok(snippet) => snippet,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(error = %e, "skipping unreadable entry during sweep");
                    continue;
                }
            };
            if !self.ttl.is_expired(&snippet, now) {
                continue;
            }
            match self
                .store
                .delete_if_unchanged(&self.namespace, &snippet.id, snippet.created_at)
                .await
            {
                Ok(true) => {
                    report.deleted += 1;
                    tracing::info!(
                        namespace = %self.namespace,
                        id = %snippet.id,
                        "deleted expired entry"
                    );
                }
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(id = %snippet.id, error = %e, "failed to delete expired entry");
                }
            }
        }

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "sweep complete"
        );
        report
    }
}
