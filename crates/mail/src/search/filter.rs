//! Server-side filter expressions
//!
//! Maps search scopes onto the store's property schema and builds the
//! DASL-style filter text handed to the automation interface's restrict
//! call. The filter also stays structurally inspectable so in-process
//! implementations of the boundary can evaluate it without parsing text.

use chrono::{DateTime, Utc};

use crate::models::Scope;
use crate::search::Term;

/// Schema property holding the received timestamp
pub const DATE_RECEIVED_PROPERTY: &str = "urn:schemas:httpmail:datereceived";

/// A record field a search term can match against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Subject,
    SenderName,
    Body,
    RecipientNames,
}

impl MatchField {
    /// The store's schema identifier for this field
    pub fn property(self) -> &'static str {
        match self {
            Self::Subject => "urn:schemas:httpmail:subject",
            Self::SenderName => "urn:schemas:httpmail:fromname",
            Self::Body => "urn:schemas:httpmail:textdescription",
            Self::RecipientNames => "urn:schemas:httpmail:displayto",
        }
    }

    /// Whether the store filters this field reliably server-side.
    ///
    /// Display-name matching for senders and recipients is inconsistent
    /// across stores and always runs through the in-memory predicate.
    pub fn server_filterable(self) -> bool {
        matches!(self, Self::Subject | Self::Body)
    }
}

/// The fields a scope matches against
pub fn scope_fields(scope: Scope) -> &'static [MatchField] {
    match scope {
        Scope::Subject => &[MatchField::Subject],
        Scope::Sender => &[MatchField::SenderName],
        Scope::Recipient => &[MatchField::RecipientNames],
        Scope::Body => &[MatchField::Body],
        Scope::All => &[
            MatchField::Subject,
            MatchField::SenderName,
            MatchField::Body,
            MatchField::RecipientNames,
        ],
    }
}

/// A server-side filter: per-term substring conditions over the in-scope
/// fields, OR-combined within a term, AND/OR-combined across terms, plus an
/// optional received-date lower bound.
#[derive(Debug, Clone)]
pub struct ServerFilter {
    pub terms: Vec<Term>,
    pub fields: Vec<MatchField>,
    pub match_all: bool,
    pub since: Option<DateTime<Utc>>,
}

impl ServerFilter {
    /// Build a filter for the request, or `None` when the scope contains a
    /// field the store cannot filter reliably (the whole request then uses
    /// the in-memory predicate so AND/OR semantics stay uniform).
    pub fn build(terms: &[Term], scope: Scope, match_all: bool) -> Option<Self> {
        let fields = scope_fields(scope);
        if !fields.iter().all(|f| f.server_filterable()) {
            return None;
        }

        Some(Self {
            terms: terms.to_vec(),
            fields: fields.to_vec(),
            match_all,
            since: None,
        })
    }

    /// Set the received-date lower bound
    pub fn with_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self
    }

    /// Render the DASL-style filter text passed to the store's restrict
    /// call, e.g.
    /// `(urn:schemas:httpmail:subject LIKE '%status%') AND
    ///  urn:schemas:httpmail:datereceived >= '2026-08-01'`.
    pub fn to_dasl(&self) -> String {
        let mut term_clauses = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let escaped = term.text().replace('\'', "''");
            let conditions: Vec<String> = self
                .fields
                .iter()
                .map(|f| format!("{} LIKE '%{}%'", f.property(), escaped))
                .collect();
            if conditions.len() == 1 {
                term_clauses.push(conditions.into_iter().next().unwrap_or_default());
            } else {
                term_clauses.push(format!("({})", conditions.join(" OR ")));
            }
        }

        let joiner = if self.match_all { " AND " } else { " OR " };
        let mut expr = match term_clauses.len() {
            0 => String::new(),
            1 => term_clauses.remove(0),
            _ => format!("({})", term_clauses.join(joiner)),
        };

        if let Some(since) = self.since {
            let bound = format!(
                "{} >= '{}'",
                DATE_RECEIVED_PROPERTY,
                since.format("%Y-%m-%d %H:%M")
            );
            expr = if expr.is_empty() {
                bound
            } else {
                format!("{expr} AND {bound}")
            };
        }

        expr
    }
}
