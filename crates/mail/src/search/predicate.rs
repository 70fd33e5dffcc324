//! In-memory match predicate
//!
//! The client-side equivalent of the server filter: the same
//! term/field/AND/OR semantics evaluated over field text pulled from the
//! item itself. Used whenever the server-side path is unavailable or
//! unreliable for the requested scope.

use crate::search::{MatchField, Term};

/// An in-memory predicate over item field text.
///
/// A term matches when its text occurs (case-insensitive substring) in any
/// in-scope field; `match_all` decides whether every term must match or any
/// one suffices. Quoted phrases match as one contiguous substring here;
/// proximity refinement for body searches happens after extraction.
#[derive(Debug, Clone)]
pub struct Predicate {
    terms: Vec<Term>,
    fields: Vec<MatchField>,
    match_all: bool,
}

impl Predicate {
    pub fn new(terms: Vec<Term>, fields: &[MatchField], match_all: bool) -> Self {
        Self {
            terms,
            fields: fields.to_vec(),
            match_all,
        }
    }

    /// The fields this predicate reads
    pub fn fields(&self) -> &[MatchField] {
        &self.fields
    }

    /// Evaluate the predicate. `text_of` supplies the item's text for one
    /// field, or `None` when the field is absent or unreadable; unreadable
    /// fields simply cannot match.
    pub fn matches(&self, mut text_of: impl FnMut(MatchField) -> Option<String>) -> bool {
        let texts: Vec<String> = self
            .fields
            .iter()
            .filter_map(|f| text_of(*f))
            .map(|t| t.to_lowercase())
            .collect();

        if texts.is_empty() {
            return false;
        }
        if self.terms.is_empty() {
            return true;
        }

        let term_hit = |term: &Term| {
            let needle = term.text().to_lowercase();
            texts.iter().any(|text| text.contains(&needle))
        };

        if self.match_all {
            self.terms.iter().all(term_hit)
        } else {
            self.terms.iter().any(term_hit)
        }
    }
}
