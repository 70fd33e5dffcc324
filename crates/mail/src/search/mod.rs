//! Query building and matching
//!
//! Turns a structured search request into the two equivalent forms the
//! enumerator needs: a server-side [`ServerFilter`] for the store's
//! restrict call, and an in-memory [`Predicate`] for the fallback path.
//! Body searches get a proximity refinement pass after extraction.

mod filter;
mod predicate;
mod proximity;
mod query;

pub use filter::{DATE_RECEIVED_PROPERTY, MatchField, ServerFilter, scope_fields};
pub use predicate::Predicate;
pub use proximity::{PROXIMITY_WINDOW, proximity_match};
pub use query::{Term, tokenize};
