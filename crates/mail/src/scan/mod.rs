//! Folder enumeration
//!
//! Walks a folder's items newest-first under a date window, count bound,
//! and wall-clock budget. The server-side filter is tried first; on any
//! failure the pass falls back to plain enumeration with the in-memory
//! predicate — an explicit two-step strategy chain rather than nested
//! error handlers. Default-bounded operations widen their date window
//! progressively while nothing matches; explicit windows are honored
//! literally.

mod budget;

pub use budget::ScanBudget;

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineSettings;
use crate::error::Result;
use crate::extract::{RawFields, RawItem, read_minimal};
use crate::models::Bounds;
use crate::remote::{Field, FolderId, ItemHandle, Mailbox, RetryPolicy};
use crate::search::{MatchField, Predicate, ServerFilter};

/// Day window applied when the caller supplies no bound
pub const DEFAULT_DAY_WINDOW: u32 = 7;

/// Widening ladder for default-bounded scans. Each step only runs when the
/// previous one matched nothing; the last step is the hard cap.
const WIDENING_LADDER: [u32; 3] = [DEFAULT_DAY_WINDOW, 14, 30];

/// Why an enumeration pass stopped before covering the whole window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// The requested result count was reached
    MaxCount,
    /// The wall-clock budget ran out
    Budget,
}

/// Statistics accumulated over one list/search operation
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    /// Items examined during enumeration
    pub examined: usize,
    /// Items that matched and entered extraction
    pub matched: usize,
    /// Items dropped because their fields could not be read or derived
    pub dropped: usize,
    /// Effective day window of the final pass (`None` for count bounds)
    pub window_days: Option<u32>,
    /// Set when the result may be incomplete
    pub truncation: Option<TruncationReason>,
    /// Total operation duration
    pub duration_ms: u64,
}

impl ScanStats {
    /// `true` when enumeration covered everything it was asked to
    pub fn complete(&self) -> bool {
        self.truncation.is_none()
    }
}

/// The outcome of a scan: matched items (newest-first) plus statistics
#[derive(Debug)]
pub struct ScanOutcome {
    pub items: Vec<RawItem>,
    pub stats: ScanStats,
}

/// Enumerate a folder under the given bounds.
///
/// `filter` enables the server-side strategy; `predicate` is applied
/// per-item on the fallback path. Passing neither makes every in-window
/// item a match (list semantics).
pub fn scan_folder(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    settings: &EngineSettings,
    folder: &FolderId,
    filter: Option<&ServerFilter>,
    predicate: Option<&Predicate>,
    bounds: Bounds,
) -> Result<ScanOutcome> {
    let started = Instant::now();
    let budget = ScanBudget::new(settings.scan_budget());

    let (ladder, max_count): (Vec<Option<u32>>, Option<usize>) = match bounds {
        Bounds::Default => (WIDENING_LADDER.iter().map(|d| Some(*d)).collect(), None),
        Bounds::Days(days) => (vec![Some(days)], None),
        Bounds::Count(count) => (vec![None], Some(count)),
    };

    let mut outcome = scan_pass(
        mailbox, retry, settings, folder, filter, predicate, ladder[0], max_count, &budget,
    )?;

    for window in ladder.iter().skip(1) {
        if !outcome.items.is_empty() || outcome.stats.truncation.is_some() {
            break;
        }
        log::debug!(
            "nothing within {:?} days, widening to {:?}",
            outcome.stats.window_days,
            window
        );
        outcome = scan_pass(
            mailbox, retry, settings, folder, filter, predicate, *window, max_count, &budget,
        )?;
    }

    outcome.stats.duration_ms = started.elapsed().as_millis() as u64;
    Ok(outcome)
}

/// One pass over the folder at a fixed window: server-side strategy first,
/// in-memory fallback second
#[allow(clippy::too_many_arguments)]
fn scan_pass(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    settings: &EngineSettings,
    folder: &FolderId,
    filter: Option<&ServerFilter>,
    predicate: Option<&Predicate>,
    window_days: Option<u32>,
    max_count: Option<usize>,
    budget: &ScanBudget,
) -> Result<ScanOutcome> {
    let since = window_days.map(|days| Utc::now() - Duration::days(i64::from(days)));

    if let Some(filter) = filter {
        let bounded = filter.clone().with_since(since);
        match enumerate(
            mailbox,
            retry,
            settings,
            folder,
            Some(&bounded),
            None,
            since,
            max_count,
            budget,
        ) {
            Ok(mut outcome) => {
                outcome.stats.window_days = window_days;
                return Ok(outcome);
            }
            Err(err) => {
                log::warn!("server-side filter failed, filtering in memory: {err}");
            }
        }
    }

    let mut outcome = enumerate(
        mailbox, retry, settings, folder, None, predicate, since, max_count, budget,
    )?;
    outcome.stats.window_days = window_days;
    Ok(outcome)
}

/// Page through the folder, collecting matches until a termination
/// condition fires: count reached, an item falls outside the window
/// (newest-first order makes that final), or the budget runs out.
#[allow(clippy::too_many_arguments)]
fn enumerate(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    settings: &EngineSettings,
    folder: &FolderId,
    filter: Option<&ServerFilter>,
    predicate: Option<&Predicate>,
    since: Option<DateTime<Utc>>,
    max_count: Option<usize>,
    budget: &ScanBudget,
) -> Result<ScanOutcome> {
    let mut stats = ScanStats::default();
    let mut items: Vec<RawItem> = Vec::new();

    if max_count == Some(0) {
        stats.truncation = Some(TruncationReason::MaxCount);
        return Ok(ScanOutcome { items, stats });
    }

    let batch = settings.scan_batch_size.max(1);
    let mut offset = 0;

    'folder: loop {
        if budget.exhausted() {
            stats.truncation = Some(TruncationReason::Budget);
            break;
        }

        let handles = match filter {
            Some(f) => retry.run(mailbox, || mailbox.filtered_items(folder, f, offset, batch))?,
            None => retry.run(mailbox, || mailbox.items(folder, offset, batch))?,
        };
        if handles.is_empty() {
            break;
        }
        offset += handles.len();

        for handle in handles {
            stats.examined += 1;

            let raw = match read_minimal(mailbox, retry, &handle) {
                Ok(raw) => raw,
                Err(err) => {
                    stats.dropped += 1;
                    log::debug!("skipping item with unreadable fields: {err}");
                    continue;
                }
            };

            if let Some(since) = since
                && raw.received_at < since
            {
                // Newest-first order: nothing older can be in the window
                break 'folder;
            }

            let matched = match predicate {
                Some(p) => p.matches(|field| field_text(mailbox, retry, &handle, &raw, field)),
                None => true,
            };

            if matched {
                items.push(RawItem {
                    handle,
                    fields: raw,
                });
                stats.matched += 1;

                if max_count.is_some_and(|m| items.len() >= m) {
                    stats.truncation = Some(TruncationReason::MaxCount);
                    break 'folder;
                }
            }
        }
    }

    Ok(ScanOutcome { items, stats })
}

/// Field text for predicate evaluation. Subject and sender come from the
/// already-copied minimal fields; body and recipients are read on demand.
/// Unreadable fields yield `None` and simply cannot match.
fn field_text(
    mailbox: &dyn Mailbox,
    retry: &RetryPolicy,
    handle: &ItemHandle,
    raw: &RawFields,
    field: MatchField,
) -> Option<String> {
    match field {
        MatchField::Subject => Some(raw.subject.clone()),
        MatchField::SenderName => Some(raw.sender.clone()),
        MatchField::Body => match retry.run(mailbox, || mailbox.get_field(handle, Field::Body)) {
            Ok(value) => value.into_text(),
            Err(err) => {
                log::debug!("body read failed for {}: {err}", raw.id);
                None
            }
        },
        MatchField::RecipientNames => {
            match retry.run(mailbox, || mailbox.get_field(handle, Field::RecipientNames)) {
                Ok(value) => value.into_list().map(|names| names.join("; ")),
                Err(err) => {
                    log::debug!("recipient read failed for {}: {err}", raw.id);
                    None
                }
            }
        }
    }
}
