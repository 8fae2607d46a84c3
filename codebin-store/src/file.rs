//! Filesystem-backed snippet store.
//!
//! Layout: `<root>/<namespace>/<sha256(id)>.json`, one JSON record per
//! snippet. Hashing the id keeps arbitrary caller-supplied ids out of path
//! names; the id itself is stored inside the record.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use codebin_core::{Namespace, Snippet, SnippetId};
use futures::{stream, StreamExt};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;

use crate::backend::{SnippetStore, SnippetStream};
use crate::StoreError;

const RECORD_EXT: &str = "json";

/// Snippet store persisting each entry as a JSON file.
///
/// Writes go to a temporary file that is renamed into place, so readers never
/// observe a partial record. Mutations are serialized through an in-process
/// lock; the store assumes it is the only writer of its directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
    tmp_seq: AtomicU64,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), write_lock: Mutex::new(()), tmp_seq: AtomicU64::new(0) }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &Namespace) -> PathBuf {
        self.root.join(namespace.as_str())
    }

    fn record_path(&self, namespace: &Namespace, id: &SnippetId) -> PathBuf {
        self.namespace_dir(namespace).join(format!("{}.{RECORD_EXT}", record_name(id)))
    }

    async fn write_record(&self, path: &Path, snippet: &Snippet) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(snippet).map_err(|e| StoreError::codec(path, e))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await.map_err(|e| StoreError::io(dir, e))?;
        }
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{RECORD_EXT}.tmp{seq}"));
        let result = match fs::write(&tmp, &bytes).await {
            Ok(()) => fs::rename(&tmp, path).await.map_err(|e| StoreError::io(path, e)),
            Err(e) => Err(StoreError::io(&tmp, e)),
        };
        if result.is_err() {
            // A failed write may leave a partial temp file behind.
            let _ = fs::remove_file(&tmp).await;
        }
        result
    }

    async fn remove_record(path: &Path) -> Result<bool, StoreError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// Hex SHA-256 of the id, used as the record's file stem.
fn record_name(id: &SnippetId) -> String {
    let digest = Sha256::digest(id.as_str().as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Decoded records must sit at the path their id hashes to; anything else is
/// invisible to `get` and `delete` and is reported instead of listed.
fn check_placement(path: &Path, snippet: Snippet) -> Result<Snippet, StoreError> {
    let expected = record_name(&snippet.id);
    if path.file_stem().is_some_and(|stem| *stem == *expected) {
        Ok(snippet)
    } else {
        Err(StoreError::Misplaced { path: path.to_path_buf(), id: snippet.id.into() })
    }
}

/// Read and decode one record. `Ok(None)` if the file is gone.
async fn read_record(path: &Path) -> Result<Option<Snippet>, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::codec(path, e))
}

fn is_record(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RECORD_EXT)
}

enum Listing {
    Open(PathBuf),
    Reading(PathBuf, fs::ReadDir),
    Done,
}

#[async_trait]
impl SnippetStore for FileStore {
    async fn get(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
    ) -> Result<Option<Snippet>, StoreError> {
        read_record(&self.record_path(namespace, id)).await
    }

    async fn set(&self, namespace: &Namespace, snippet: &Snippet) -> Result<(), StoreError> {
        let path = self.record_path(namespace, &snippet.id);
        let _guard = self.write_lock.lock().await;
        self.write_record(&path, snippet).await
    }

    async fn delete(&self, namespace: &Namespace, id: &SnippetId) -> Result<bool, StoreError> {
        let path = self.record_path(namespace, id);
        let _guard = self.write_lock.lock().await;
        Self::remove_record(&path).await
    }

    async fn delete_if_unchanged(
        &self,
        namespace: &Namespace,
        id: &SnippetId,
        created_at: i64,
    ) -> Result<bool, StoreError> {
        let path = self.record_path(namespace, id);
        let _guard = self.write_lock.lock().await;
        match read_record(&path).await? {
            Some(current) if current.created_at == created_at => Self::remove_record(&path).await,
            _ => Ok(false),
        }
    }

    fn list_all(&self, namespace: &Namespace) -> SnippetStream {
        let start = Listing::Open(self.namespace_dir(namespace));
        stream::unfold(start, |mut state| async move {
            loop {
                state = match state {
                    Listing::Done => return None,
                    Listing::Open(dir) => {
                        let opened = fs::read_dir(&dir).await;
                        match opened {
                            Ok(entries) => Listing::Reading(dir, entries),
                            // A namespace nobody wrote to yet is simply empty.
                            Err(e) if e.kind() == ErrorKind::NotFound => return None,
                            Err(e) => return Some((Err(StoreError::io(dir, e)), Listing::Done)),
                        }
                    }
                    Listing::Reading(dir, mut entries) => {
                        let next = entries.next_entry().await;
                        let path = match next {
                            Ok(None) => return None,
                            Ok(Some(entry)) => entry.path(),
                            Err(e) => return Some((Err(StoreError::io(dir, e)), Listing::Done)),
                        };
                        if !is_record(&path) {
                            Listing::Reading(dir, entries)
                        } else {
                            match read_record(&path).await {
                                Ok(Some(snippet)) => {
                                    let item = check_placement(&path, snippet);
                                    return Some((item, Listing::Reading(dir, entries)));
                                }
                                // Deleted between readdir and read.
                                Ok(None) => Listing::Reading(dir, entries),
                                Err(e) => return Some((Err(e), Listing::Reading(dir, entries))),
                            }
                        }
                    }
                };
            }
        })
        .boxed()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        let meta = fs::metadata(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("{} is not a directory", self.root.display())))
        }
    }
}
