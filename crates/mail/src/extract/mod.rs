//! Field extraction from remote items
//!
//! Every remote field read is a round-trip into the automation interface,
//! so extraction is split into a minimal profile (the four fields list
//! views need) and a full profile (body, recipients, attachment metadata).
//! Reads always happen on the calling thread; derivation of records from
//! the copied fields is pure and may run on a bounded worker pool for
//! large batches.

mod pool;

use anyhow::bail;
use chrono::{DateTime, Utc};

use crate::config::EngineSettings;
use crate::error::{EngineError, Result};
use crate::models::{AttachmentSummary, EntryId, ExtractedRecord, MailAddress};
use crate::remote::{Field, ItemHandle, Mailbox, RemoteError, RetryPolicy};

/// Which fields to extract per item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Stable id, subject, sender, received time. Used by list views.
    Minimal,
    /// Everything, including body, recipients, and attachment metadata.
    Full,
}

/// Plain owned copies of an item's fields, safe to hand to workers.
///
/// `body`, `recipients`, and `attachments` stay `None` until the full
/// profile reads them.
#[derive(Debug, Clone)]
pub struct RawFields {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub received_at: DateTime<Utc>,
    pub body: Option<String>,
    pub recipients: Option<Vec<String>>,
    pub attachments: Option<Vec<String>>,
}

/// One enumerated item: its handle (valid only for the current pass) plus
/// the minimal fields already copied out of it
#[derive(Debug)]
pub struct RawItem {
    pub handle: ItemHandle,
    pub fields: RawFields,
}

/// Read the minimal field set from a remote item
pub fn read_minimal(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    handle: &ItemHandle,
) -> Result<RawFields> {
    let id = retry
        .run(mailbox, || mailbox.get_field(handle, Field::EntryId))?
        .into_text()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            EngineError::Remote(RemoteError::Fatal(anyhow::anyhow!("item has no entry id")))
        })?;

    let subject = retry
        .run(mailbox, || mailbox.get_field(handle, Field::Subject))?
        .into_text()
        .unwrap_or_default();

    let sender = retry
        .run(mailbox, || mailbox.get_field(handle, Field::SenderName))?
        .into_text()
        .unwrap_or_default();

    let received_at = retry
        .run(mailbox, || mailbox.get_field(handle, Field::ReceivedAt))?
        .into_time()
        .ok_or_else(|| {
            EngineError::Remote(RemoteError::Fatal(anyhow::anyhow!(
                "item {id} has no received time"
            )))
        })?;

    Ok(RawFields {
        id,
        subject,
        sender,
        received_at,
        body: None,
        recipients: None,
        attachments: None,
    })
}

/// Read the remaining full-profile fields into an item's copied field set
pub fn read_full(mailbox: &dyn Mailbox, retry: &RetryPolicy, item: &mut RawItem) -> Result<()> {
    item.fields.body = retry
        .run(mailbox, || mailbox.get_field(&item.handle, Field::Body))?
        .into_text();

    item.fields.recipients = retry
        .run(mailbox, || {
            mailbox.get_field(&item.handle, Field::RecipientNames)
        })?
        .into_list();

    item.fields.attachments = retry
        .run(mailbox, || {
            mailbox.get_field(&item.handle, Field::AttachmentNames)
        })?
        .into_list();

    Ok(())
}

/// Extract records from a batch of enumerated items.
///
/// Full-profile remote reads run on the calling thread. Derivation runs
/// sequentially for small batches and on a bounded worker pool otherwise;
/// if the pool cannot be created, derivation falls back to sequential.
/// A failing item is dropped with a debug note — one bad item never fails
/// the batch. Returns the records (in enumeration order) and the number of
/// items dropped.
pub fn extract_batch(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    settings: &EngineSettings,
    items: Vec<RawItem>,
    profile: Profile,
) -> (Vec<ExtractedRecord>, usize) {
    let mut dropped = 0;

    let mut raws: Vec<RawFields> = Vec::with_capacity(items.len());
    for mut item in items {
        if profile == Profile::Full
            && let Err(err) = read_full(mailbox, retry, &mut item)
        {
            dropped += 1;
            log::debug!("dropping item {}: {err}", item.fields.id);
            continue;
        }
        raws.push(item.fields);
    }

    let (records, derive_dropped) = if raws.len() >= settings.parallel_threshold.max(1) {
        match pool::build(settings.worker_threads) {
            Ok(pool) => pool::derive_on(&pool, raws, profile),
            Err(err) => {
                log::debug!("worker pool unavailable ({err}); deriving sequentially");
                derive_sequential(raws, profile)
            }
        }
    } else {
        derive_sequential(raws, profile)
    };

    (records, dropped + derive_dropped)
}

/// Derive records one by one on the calling thread
fn derive_sequential(raws: Vec<RawFields>, profile: Profile) -> (Vec<ExtractedRecord>, usize) {
    let mut records = Vec::with_capacity(raws.len());
    let mut dropped = 0;
    for raw in raws {
        match derive_record(raw, profile) {
            Ok(record) => records.push(record),
            Err(err) => {
                dropped += 1;
                log::debug!("dropping undecodable item: {err}");
            }
        }
    }
    (records, dropped)
}

/// Build an [`ExtractedRecord`] from copied fields. Pure — no remote access.
fn derive_record(raw: RawFields, profile: Profile) -> anyhow::Result<ExtractedRecord> {
    if raw.id.is_empty() {
        bail!("item has no stable id");
    }

    let sender_name = MailAddress::parse(&raw.sender).display_name().to_string();
    let mut builder = ExtractedRecord::builder(EntryId::new(raw.id))
        .subject(raw.subject.trim())
        .sender_name(sender_name)
        .received_at(raw.received_at);

    if profile == Profile::Full {
        if let Some(body) = raw.body {
            builder = builder.body(normalize_body(&body));
        }
        if let Some(recipients) = raw.recipients {
            builder = builder.recipients(
                recipients
                    .iter()
                    .map(|r| MailAddress::parse(r))
                    .collect(),
            );
        }
        if let Some(names) = raw.attachments {
            builder = builder.attachments(AttachmentSummary::new(names));
        }
    }

    Ok(builder.build())
}

/// Normalize line endings and trim surrounding whitespace
fn normalize_body(body: &str) -> String {
    body.replace("\r\n", "\n").trim().to_string()
}
