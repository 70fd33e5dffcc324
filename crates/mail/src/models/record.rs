//! Extracted record model
//!
//! An [`ExtractedRecord`] is the engine's snapshot of one remote mail item:
//! plain owned data copied out of the automation interface, safe to hold
//! after the enumeration pass that produced it has ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permanent identifier of a remote mail item, stable across enumeration
/// passes. Used as the result-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A mail address with optional display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailAddress {
    /// Display name (e.g., "John Doe")
    pub name: Option<String>,
    /// Address (e.g., "john@example.com")
    pub address: String,
}

impl MailAddress {
    /// Create an address without a display name
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    /// Parse an address from a string like "John Doe <john@example.com>"
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if let Some(angle_start) = s.rfind('<')
            && let Some(angle_end) = s.rfind('>')
            && angle_start < angle_end
        {
            let name = s[..angle_start].trim();
            let address = s[angle_start + 1..angle_end].trim();
            return Self {
                name: if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                },
                address: address.to_string(),
            };
        }

        Self {
            name: None,
            address: s.to_string(),
        }
    }

    /// The name shown for this address: the display name when present,
    /// the bare address otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

/// Attachment metadata as reported by the remote item. Content is never
/// fetched here; only names and count cross the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub count: usize,
    pub names: Vec<String>,
}

impl AttachmentSummary {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            count: names.len(),
            names,
        }
    }
}

/// One extracted mail record. Immutable once built.
///
/// `body`, `recipients`, and `attachments` are only populated by the full
/// extraction profile; list operations leave them `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Stable identifier of the remote item
    pub id: EntryId,
    /// Subject line
    pub subject: String,
    /// Sender's display name
    pub sender_name: String,
    /// When the item was received
    pub received_at: DateTime<Utc>,
    /// Plain text body (full profile only)
    pub body: Option<String>,
    /// Recipients (full profile only)
    pub recipients: Option<Vec<MailAddress>>,
    /// Attachment metadata (full profile only)
    pub attachments: Option<AttachmentSummary>,
}

impl ExtractedRecord {
    /// Create a new record builder
    pub fn builder(id: EntryId) -> RecordBuilder {
        RecordBuilder::new(id)
    }
}

/// Builder for [`ExtractedRecord`] instances
pub struct RecordBuilder {
    id: EntryId,
    subject: String,
    sender_name: String,
    received_at: Option<DateTime<Utc>>,
    body: Option<String>,
    recipients: Option<Vec<MailAddress>>,
    attachments: Option<AttachmentSummary>,
}

impl RecordBuilder {
    fn new(id: EntryId) -> Self {
        Self {
            id,
            subject: String::new(),
            sender_name: String::new(),
            received_at: None,
            body: None,
            recipients: None,
            attachments: None,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn sender_name(mut self, sender_name: impl Into<String>) -> Self {
        self.sender_name = sender_name.into();
        self
    }

    pub fn received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn recipients(mut self, recipients: Vec<MailAddress>) -> Self {
        self.recipients = Some(recipients);
        self
    }

    pub fn attachments(mut self, attachments: AttachmentSummary) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn build(self) -> ExtractedRecord {
        ExtractedRecord {
            id: self.id,
            subject: self.subject,
            sender_name: self.sender_name,
            received_at: self.received_at.unwrap_or_else(Utc::now),
            body: self.body,
            recipients: self.recipients,
            attachments: self.attachments,
        }
    }
}
