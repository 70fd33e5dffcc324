//! In-memory mailbox implementation
//!
//! This implementation backs unit and integration tests and serves as a
//! stand-in until a real automation bridge is linked in. It keeps a folder
//! tree and per-folder item lists behind RwLocks, evaluates server filters
//! with the store's substring semantics, and can inject transient/fatal
//! failures to exercise the retry and fallback paths.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use super::{Field, FieldValue, FolderId, ItemHandle, Mailbox, RemoteError};
use crate::search::{MatchField, ServerFilter};

/// One mail item held by the in-memory store
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub received_at: DateTime<Utc>,
    pub body: String,
    pub recipients: Vec<String>,
    pub attachments: Vec<String>,
}

impl StoredItem {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            sender: sender.into(),
            received_at,
            body: String::new(),
            recipients: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Text of one field, the way the store's filter sees it
    fn field_text(&self, field: MatchField) -> String {
        match field {
            MatchField::Subject => self.subject.clone(),
            MatchField::SenderName => self.sender.clone(),
            MatchField::Body => self.body.clone(),
            MatchField::RecipientNames => self.recipients.join("; "),
        }
    }
}

/// In-memory implementation of [`Mailbox`].
///
/// Folder handles are lowercased path tokens; item handles are the item
/// ids. Items are kept newest-first per folder, matching the ordering
/// contract of the trait.
pub struct InMemoryMailbox {
    /// Set of known folder tokens (lowercased full paths)
    folders: RwLock<HashMap<String, ()>>,
    /// Folder token -> items, newest-first
    items: RwLock<HashMap<String, Vec<StoredItem>>>,
    /// Item id -> item, for field reads
    by_id: RwLock<HashMap<String, StoredItem>>,

    // Fault injection
    filter_supported: AtomicBool,
    filter_failing: AtomicBool,
    pending_transient: AtomicU32,
    failing_items: RwLock<HashSet<String>>,

    // Call counters, for cache/round-trip assertions
    reconnects: AtomicUsize,
    child_folder_calls: AtomicUsize,
    items_calls: AtomicUsize,
    filtered_calls: AtomicUsize,
    field_reads: AtomicUsize,
}

impl InMemoryMailbox {
    /// Create a new empty in-memory mailbox
    pub fn new() -> Self {
        Self {
            folders: RwLock::new(HashMap::new()),
            items: RwLock::new(HashMap::new()),
            by_id: RwLock::new(HashMap::new()),
            filter_supported: AtomicBool::new(true),
            filter_failing: AtomicBool::new(false),
            pending_transient: AtomicU32::new(0),
            failing_items: RwLock::new(HashSet::new()),
            reconnects: AtomicUsize::new(0),
            child_folder_calls: AtomicUsize::new(0),
            items_calls: AtomicUsize::new(0),
            filtered_calls: AtomicUsize::new(0),
            field_reads: AtomicUsize::new(0),
        }
    }

    /// Create a folder (and any missing ancestors) from a `/`-separated
    /// path, returning the leaf's handle
    pub fn add_folder(&self, path: &str) -> FolderId {
        let mut folders = self.folders.write().unwrap();
        let mut token = String::new();
        for segment in path.split('/').filter(|s| !s.trim().is_empty()) {
            if token.is_empty() {
                token = segment.trim().to_lowercase();
            } else {
                token = format!("{}/{}", token, segment.trim().to_lowercase());
            }
            folders.entry(token.clone()).or_insert(());
        }
        FolderId::new(token)
    }

    /// Add an item to a folder, keeping the folder's newest-first order
    pub fn add_item(&self, folder: &FolderId, item: StoredItem) {
        self.by_id
            .write()
            .unwrap()
            .insert(item.id.clone(), item.clone());

        let mut items = self.items.write().unwrap();
        let list = items.entry(folder.0.clone()).or_default();
        let pos = list
            .iter()
            .position(|existing| existing.received_at < item.received_at)
            .unwrap_or(list.len());
        list.insert(pos, item);
    }

    /// Make `filtered_items` report [`RemoteError::Unsupported`]
    pub fn set_filter_supported(&self, supported: bool) {
        self.filter_supported.store(supported, Ordering::SeqCst);
    }

    /// Make `filtered_items` fail with a fatal error
    pub fn set_filter_failing(&self, failing: bool) {
        self.filter_failing.store(failing, Ordering::SeqCst);
    }

    /// Make the next `n` enumeration/field calls fail transiently
    pub fn inject_transient_failures(&self, n: u32) {
        self.pending_transient.store(n, Ordering::SeqCst);
    }

    /// Make every field read on one item fail fatally
    pub fn fail_fields_for(&self, id: &str) {
        self.failing_items.write().unwrap().insert(id.to_string());
    }

    pub fn reconnect_count(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn child_folder_calls(&self) -> usize {
        self.child_folder_calls.load(Ordering::SeqCst)
    }

    pub fn items_calls(&self) -> usize {
        self.items_calls.load(Ordering::SeqCst)
    }

    pub fn filtered_calls(&self) -> usize {
        self.filtered_calls.load(Ordering::SeqCst)
    }

    pub fn field_reads(&self) -> usize {
        self.field_reads.load(Ordering::SeqCst)
    }

    /// Consume one injected transient failure, if any is pending
    fn take_transient(&self) -> Result<(), RemoteError> {
        let pending = self.pending_transient.load(Ordering::SeqCst);
        if pending > 0
            && self
                .pending_transient
                .compare_exchange(pending, pending - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(RemoteError::Transient(anyhow!(
                "injected transient failure"
            )));
        }
        Ok(())
    }

    /// Evaluate a server filter the way the store's restrict call would:
    /// case-insensitive substring per term and field, OR within a term,
    /// AND/OR across terms, plus the received-date bound
    fn filter_matches(filter: &ServerFilter, item: &StoredItem) -> bool {
        if let Some(since) = filter.since
            && item.received_at < since
        {
            return false;
        }
        if filter.terms.is_empty() {
            return true;
        }

        let term_hit = |needle: &str| {
            let needle = needle.to_lowercase();
            filter
                .fields
                .iter()
                .any(|f| item.field_text(*f).to_lowercase().contains(&needle))
        };

        if filter.match_all {
            filter.terms.iter().all(|t| term_hit(t.text()))
        } else {
            filter.terms.iter().any(|t| term_hit(t.text()))
        }
    }
}

impl Default for InMemoryMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox for InMemoryMailbox {
    fn reconnect(&self) -> Result<(), RemoteError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn child_folder(
        &self,
        parent: Option<&FolderId>,
        name: &str,
    ) -> Result<Option<FolderId>, RemoteError> {
        self.child_folder_calls.fetch_add(1, Ordering::SeqCst);

        let candidate = match parent {
            None => name.trim().to_lowercase(),
            Some(p) => format!("{}/{}", p.0, name.trim().to_lowercase()),
        };

        let folders = self.folders.read().unwrap();
        Ok(folders
            .contains_key(&candidate)
            .then(|| FolderId::new(candidate)))
    }

    fn items(
        &self,
        folder: &FolderId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ItemHandle>, RemoteError> {
        self.items_calls.fetch_add(1, Ordering::SeqCst);
        self.take_transient()?;

        let items = self.items.read().unwrap();
        let Some(list) = items.get(&folder.0) else {
            if self.folders.read().unwrap().contains_key(&folder.0) {
                return Ok(Vec::new());
            }
            return Err(RemoteError::Fatal(anyhow!("unknown folder {}", folder.0)));
        };

        Ok(list
            .iter()
            .skip(offset)
            .take(limit)
            .map(|item| ItemHandle::new(item.id.clone()))
            .collect())
    }

    fn filtered_items(
        &self,
        folder: &FolderId,
        filter: &ServerFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ItemHandle>, RemoteError> {
        self.filtered_calls.fetch_add(1, Ordering::SeqCst);

        if !self.filter_supported.load(Ordering::SeqCst) {
            return Err(RemoteError::Unsupported(
                "store does not implement restrict".to_string(),
            ));
        }
        if self.filter_failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Fatal(anyhow!("restrict call rejected")));
        }
        self.take_transient()?;

        let items = self.items.read().unwrap();
        let Some(list) = items.get(&folder.0) else {
            if self.folders.read().unwrap().contains_key(&folder.0) {
                return Ok(Vec::new());
            }
            return Err(RemoteError::Fatal(anyhow!("unknown folder {}", folder.0)));
        };

        Ok(list
            .iter()
            .filter(|item| Self::filter_matches(filter, item))
            .skip(offset)
            .take(limit)
            .map(|item| ItemHandle::new(item.id.clone()))
            .collect())
    }

    fn get_field(&self, item: &ItemHandle, field: Field) -> Result<FieldValue, RemoteError> {
        self.field_reads.fetch_add(1, Ordering::SeqCst);
        self.take_transient()?;

        if self.failing_items.read().unwrap().contains(&item.0) {
            return Err(RemoteError::Fatal(anyhow!(
                "injected field failure for {}",
                item.0
            )));
        }

        let by_id = self.by_id.read().unwrap();
        let Some(stored) = by_id.get(&item.0) else {
            return Err(RemoteError::Fatal(anyhow!("no item with id {}", item.0)));
        };

        Ok(match field {
            Field::EntryId => FieldValue::Text(stored.id.clone()),
            Field::Subject => FieldValue::Text(stored.subject.clone()),
            Field::SenderName => FieldValue::Text(stored.sender.clone()),
            Field::ReceivedAt => FieldValue::Time(stored.received_at),
            Field::Body => FieldValue::Text(stored.body.clone()),
            Field::RecipientNames => FieldValue::TextList(stored.recipients.clone()),
            Field::AttachmentNames => {
                if stored.attachments.is_empty() {
                    FieldValue::Empty
                } else {
                    FieldValue::TextList(stored.attachments.clone())
                }
            }
        })
    }
}
