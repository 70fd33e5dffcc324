//! Folder path resolution with a TTL cache
//!
//! Folder handles come from walking the store's folder tree one path
//! segment at a time, which costs a remote call per segment. Resolutions
//! are cached by normalized path for a fixed time-to-live so repeated
//! list/search calls against the same folder skip the traversal.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::error::{EngineError, Result};
use crate::remote::{FolderId, Mailbox, RetryPolicy};

/// A cached folder resolution
#[derive(Debug, Clone)]
pub struct ResolvedFolder {
    /// Normalized path the entry is keyed by
    pub path: String,
    /// The store's folder handle
    pub handle: FolderId,
    /// When the traversal ran
    pub resolved_at: DateTime<Utc>,
}

/// Resolves folder paths against the store, caching results for a TTL.
///
/// The TTL check and any re-resolution happen under one lock so two callers
/// racing on a stale entry cannot interleave; the worst case is duplicate
/// traversal work, never a torn entry.
pub struct FolderResolver {
    ttl: Duration,
    cache: RwLock<HashMap<String, ResolvedFolder>>,
}

impl FolderResolver {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a `/`- or `\`-separated folder path to its handle.
    ///
    /// Serves from the cache when a fresh entry exists; otherwise walks the
    /// tree segment by segment and caches the result. Fails with
    /// [`EngineError::FolderNotFound`] when any segment is absent or the
    /// path has no segments at all.
    pub fn resolve(
        &self,
        mailbox: &dyn Mailbox,
        retry: &RetryPolicy,
        path: &str,
    ) -> Result<FolderId> {
        let segments = split_path(path);
        if segments.is_empty() {
            return Err(EngineError::FolderNotFound {
                path: path.to_string(),
            });
        }
        let key = segments.join("/").to_lowercase();

        let mut cache = self.cache.write().unwrap();
        if let Some(entry) = cache.get(&key)
            && Utc::now() - entry.resolved_at < self.ttl
        {
            return Ok(entry.handle.clone());
        }

        let handle = traverse(mailbox, retry, path, &segments)?;
        cache.insert(
            key.clone(),
            ResolvedFolder {
                path: key,
                handle: handle.clone(),
                resolved_at: Utc::now(),
            },
        );
        Ok(handle)
    }

    /// Drop every cached resolution, fresh or stale. Used when the caller
    /// signals the folder tree may have changed.
    pub fn clear(&self) {
        self.cache.write().unwrap().clear();
    }
}

/// Split a path into trimmed, non-empty segments on `/` or `\`
fn split_path(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Walk the folder tree from the root, one segment at a time
fn traverse(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    path: &str,
    segments: &[String],
) -> Result<FolderId> {
    let mut current: Option<FolderId> = None;
    for segment in segments {
        let child = retry.run(mailbox, || mailbox.child_folder(current.as_ref(), segment))?;
        match child {
            Some(folder) => current = Some(folder),
            None => {
                return Err(EngineError::FolderNotFound {
                    path: path.to_string(),
                });
            }
        }
    }

    current.ok_or_else(|| EngineError::FolderNotFound {
        path: path.to_string(),
    })
}
