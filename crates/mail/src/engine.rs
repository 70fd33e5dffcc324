//! Engine facade
//!
//! [`MailEngine`] owns everything a request needs: the mailbox boundary,
//! the retry policy, the folder cache, and the result cache. Instances are
//! independent — two engines never share state, so tests and embedders can
//! run several side by side.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::config::EngineSettings;
use crate::error::Result;
use crate::extract::{Profile, extract_batch};
use crate::folders::FolderResolver;
use crate::models::{Bounds, ExtractedRecord, Scope, SearchRequest};
use crate::remote::{Mailbox, RetryPolicy};
use crate::results::{PageView, ResultCache};
use crate::scan::{ScanStats, scan_folder};
use crate::search::{Predicate, ServerFilter, proximity_match, scope_fields, tokenize};

/// What a list/search hands back: the first result page plus the scan
/// statistics, including the incompleteness indicator for truncated passes
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub page: PageView,
    pub stats: ScanStats,
}

/// The search/listing/retrieval engine.
///
/// All remote calls run synchronously on the caller's thread; the mailbox
/// object model is not reentrant across threads, so one engine belongs to
/// one thread. The result cache is swapped wholesale on every list/search —
/// `page` and `get` always see either the previous cache or the new one,
/// never a mix.
pub struct MailEngine {
    mailbox: Box<dyn Mailbox>,
    settings: EngineSettings,
    retry: RetryPolicy,
    folders: FolderResolver,
    cache: RwLock<Arc<ResultCache>>,
}

impl MailEngine {
    /// Create an engine over a mailbox boundary with explicit settings
    pub fn new(mailbox: Box<dyn Mailbox>, settings: EngineSettings) -> Self {
        let retry = settings.retry_policy();
        let folders = FolderResolver::new(settings.folder_ttl_secs);
        Self {
            mailbox,
            settings,
            retry,
            folders,
            cache: RwLock::new(Arc::new(ResultCache::default())),
        }
    }

    /// Create an engine with settings loaded from the config directory
    pub fn with_loaded_settings(mailbox: Box<dyn Mailbox>) -> Self {
        Self::new(mailbox, EngineSettings::load())
    }

    /// List a folder's items, newest-first, under a date-window or count
    /// bound. Rebuilds the result cache and returns its first page.
    pub fn list(&self, folder_path: &str, bounds: Bounds) -> Result<QueryOutcome> {
        log::info!("listing {folder_path:?} with {bounds:?}");

        let folder = self
            .folders
            .resolve(self.mailbox.as_ref(), &self.retry, folder_path)?;
        let scan = scan_folder(
            self.mailbox.as_ref(),
            &self.retry,
            &self.settings,
            &folder,
            None,
            None,
            bounds,
        )?;

        let mut stats = scan.stats;
        let (records, dropped) = extract_batch(
            self.mailbox.as_ref(),
            &self.retry,
            &self.settings,
            scan.items,
            Profile::Minimal,
        );
        stats.dropped += dropped;

        let page = self.install(records);
        log::info!(
            "listed {} of {} examined items in {}ms",
            page.total,
            stats.examined,
            stats.duration_ms
        );
        Ok(QueryOutcome { page, stats })
    }

    /// Run a search request. Rebuilds the result cache and returns its
    /// first page.
    pub fn search(&self, request: &SearchRequest) -> Result<QueryOutcome> {
        log::info!(
            "searching {:?} in {:?} ({:?}, match_all={})",
            request.terms,
            request.folder_path,
            request.scope,
            request.match_all
        );

        let terms = tokenize(&request.terms)?;
        let predicate = Predicate::new(
            terms.clone(),
            scope_fields(request.scope),
            request.match_all,
        );
        let filter = ServerFilter::build(&terms, request.scope, request.match_all);

        let folder =
            self.folders
                .resolve(self.mailbox.as_ref(), &self.retry, &request.folder_path)?;
        let scan = scan_folder(
            self.mailbox.as_ref(),
            &self.retry,
            &self.settings,
            &folder,
            filter.as_ref(),
            Some(&predicate),
            request.bounds,
        )?;

        let mut stats = scan.stats;
        let (mut records, dropped) = extract_batch(
            self.mailbox.as_ref(),
            &self.retry,
            &self.settings,
            scan.items,
            Profile::Full,
        );
        stats.dropped += dropped;

        // Substring filters accept bodies whose terms are scattered across
        // unrelated sentences; AND-logic body searches get the proximity
        // refinement on the extracted text.
        if request.scope == Scope::Body && request.match_all {
            records.retain(|record| {
                record
                    .body
                    .as_deref()
                    .is_some_and(|body| proximity_match(body, &terms))
            });
        }

        let page = self.install(records);
        log::info!(
            "search matched {} of {} examined items in {}ms",
            page.total,
            stats.examined,
            stats.duration_ms
        );
        Ok(QueryOutcome { page, stats })
    }

    /// A page of the current result cache (1-based)
    pub fn page(&self, page: usize) -> Result<PageView> {
        self.cache.read().unwrap().page(page)
    }

    /// The record at a 1-based position in the current result cache.
    /// Positions are only valid until the next list/search.
    pub fn get(&self, position: usize) -> Result<ExtractedRecord> {
        self.cache.read().unwrap().get(position).cloned()
    }

    /// Drop all cached folder resolutions. Call when the folder tree may
    /// have changed.
    pub fn clear_folder_cache(&self) {
        self.folders.clear();
    }

    /// Swap in a freshly built result cache and return its first page
    fn install(&self, records: Vec<ExtractedRecord>) -> PageView {
        let cache = Arc::new(ResultCache::rebuild(records));
        let page = cache.first_page();
        *self.cache.write().unwrap() = cache;
        page
    }
}
