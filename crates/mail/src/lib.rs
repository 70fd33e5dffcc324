//! Mail crate - mailbox search, listing, and retrieval over a desktop mail
//! client's automation interface
//!
//! This crate provides the engine behind Mailscout's mail tools:
//! - Domain models (ExtractedRecord, SearchRequest, MailAddress)
//! - The automation-interface boundary trait with retry/backoff and an
//!   in-memory implementation for tests
//! - Folder path resolution with a TTL cache
//! - Query building: server-side DASL filters plus equivalent in-memory
//!   predicates for the fallback path
//! - Bounded newest-first folder enumeration with progressive date
//!   widening and a wall-clock budget
//! - Minimal/full field extraction with a worker pool for large batches
//! - Proximity refinement for AND-logic body searches
//! - A position-addressable result cache with fixed-size pages
//!
//! Connection bootstrap, message composition, and presentation live in
//! their own crates; this crate never sends mail and never installs a
//! logger.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod folders;
pub mod models;
pub mod remote;
pub mod results;
pub mod scan;
pub mod search;

pub use config::EngineSettings;
pub use engine::{MailEngine, QueryOutcome};
pub use error::{EngineError, Result};
pub use folders::{FolderResolver, ResolvedFolder};
pub use models::{
    AttachmentSummary, Bounds, EntryId, ExtractedRecord, MailAddress, Scope, SearchRequest,
};
pub use remote::{
    Field, FieldValue, FolderId, InMemoryMailbox, ItemHandle, Mailbox, RemoteError, RetryPolicy,
    StoredItem,
};
pub use results::{PAGE_SIZE, PageView, ResultCache};
pub use scan::{DEFAULT_DAY_WINDOW, ScanStats, TruncationReason};
pub use search::{PROXIMITY_WINDOW, Predicate, ServerFilter, Term, proximity_match, tokenize};
