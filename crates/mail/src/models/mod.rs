//! Domain models for the search/retrieval engine

mod record;
mod request;

pub use record::{AttachmentSummary, EntryId, ExtractedRecord, MailAddress, RecordBuilder};
pub use request::{Bounds, Scope, SearchRequest};
