//! Boundary to the mail client's automation interface
//!
//! The desktop mail application exposes a stateful object model that must
//! only be driven from one thread. This module renders that boundary as the
//! [`Mailbox`] trait: per-segment folder lookup, newest-first item
//! enumeration (plain or server-filtered), and per-field reads on individual
//! items. Everything above this module works with plain owned data copied
//! out through these calls.

mod memory;
mod retry;

pub use memory::{InMemoryMailbox, StoredItem};
pub use retry::RetryPolicy;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::search::ServerFilter;

/// Failures reported by the automation interface.
///
/// The variant determines retry behavior: [`RemoteError::Transient`] calls
/// are retried by the [`RetryPolicy`], everything else propagates
/// immediately.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connection-class failure. Safe to retry after reconnecting.
    #[error("transient automation failure: {0}")]
    Transient(anyhow::Error),

    /// Invalid call or missing object. Retrying cannot help.
    #[error("automation call failed: {0}")]
    Fatal(anyhow::Error),

    /// The store cannot apply this filter server-side.
    #[error("server-side filter unsupported: {0}")]
    Unsupported(String),
}

impl RemoteError {
    /// `true` if the failure is connection-class and worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Opaque handle to a resolved folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to one item inside an enumeration pass.
///
/// Handles are only valid for the pass that produced them and are never
/// stored; copied field data outlives them instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHandle(pub String);

impl ItemHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Fields readable from a remote item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Permanent identifier of the item
    EntryId,
    /// Subject line
    Subject,
    /// Sender display string ("Name <addr>" or bare name)
    SenderName,
    /// Received timestamp
    ReceivedAt,
    /// Plain text body
    Body,
    /// Recipient display strings
    RecipientNames,
    /// Attachment file names
    AttachmentNames,
}

/// A field value read from a remote item
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    TextList(Vec<String>),
    Time(DateTime<Utc>),
    /// The item has no value for the field
    Empty,
}

impl FieldValue {
    /// The value as text, if it is textual
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a list of strings, if it is one
    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            Self::TextList(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a timestamp, if it is one
    pub fn into_time(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(t) => Some(t),
            _ => None,
        }
    }
}

/// The automation interface of the mail application.
///
/// Implementations must return items **newest-first** (by received time)
/// from [`Mailbox::items`] and [`Mailbox::filtered_items`]; the enumerator
/// relies on that ordering to stop early once an item falls outside the
/// date window. Folder-name matching in [`Mailbox::child_folder`] is
/// case-insensitive.
///
/// All calls must originate from the thread that owns the connection; the
/// trait is deliberately `&self`-based and synchronous.
pub trait Mailbox {
    /// Re-establish the underlying connection handle.
    ///
    /// Called by the retry policy between transient attempts.
    fn reconnect(&self) -> Result<(), RemoteError>;

    /// Look up a child folder by name (case-insensitive) under `parent`,
    /// or under the root container when `parent` is `None`.
    fn child_folder(
        &self,
        parent: Option<&FolderId>,
        name: &str,
    ) -> Result<Option<FolderId>, RemoteError>;

    /// A page of the folder's items, newest-first. An empty page means the
    /// folder is exhausted.
    fn items(
        &self,
        folder: &FolderId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ItemHandle>, RemoteError>;

    /// A page of the folder's items matching `filter`, newest-first,
    /// filtered by the store itself. May fail with
    /// [`RemoteError::Unsupported`] when the store cannot filter
    /// server-side; callers fall back to [`Mailbox::items`] plus in-memory
    /// predicates.
    fn filtered_items(
        &self,
        folder: &FolderId,
        filter: &ServerFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ItemHandle>, RemoteError>;

    /// Read one field from an item.
    fn get_field(&self, item: &ItemHandle, field: Field) -> Result<FieldValue, RemoteError>;
}

impl<T: Mailbox + ?Sized> Mailbox for std::sync::Arc<T> {
    fn reconnect(&self) -> Result<(), RemoteError> {
        (**self).reconnect()
    }

    fn child_folder(
        &self,
        parent: Option<&FolderId>,
        name: &str,
    ) -> Result<Option<FolderId>, RemoteError> {
        (**self).child_folder(parent, name)
    }

    fn items(
        &self,
        folder: &FolderId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ItemHandle>, RemoteError> {
        (**self).items(folder, offset, limit)
    }

    fn filtered_items(
        &self,
        folder: &FolderId,
        filter: &ServerFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ItemHandle>, RemoteError> {
        (**self).filtered_items(folder, filter, offset, limit)
    }

    fn get_field(&self, item: &ItemHandle, field: Field) -> Result<FieldValue, RemoteError> {
        (**self).get_field(item, field)
    }
}
