//! Search and listing request models

use serde::{Deserialize, Serialize};

/// Which record fields a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Subject,
    Sender,
    Recipient,
    Body,
    All,
}

/// How far an enumeration pass reaches into a folder.
///
/// A day window and a result-count cap are mutually exclusive by
/// construction; callers pick one or leave the bound at its default
/// (a fixed day window with progressive widening).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bounds {
    /// No bound supplied: a 7-day window, progressively widened while
    /// nothing matches.
    Default,
    /// An explicit day window, honored literally (never widened).
    Days(u32),
    /// Newest N items, with no date restriction.
    Count(usize),
}

impl Default for Bounds {
    fn default() -> Self {
        Self::Default
    }
}

/// A structured, pre-validated search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search terms. A term wrapped in double quotes is matched as one
    /// contiguous phrase; unquoted text is split on whitespace.
    pub terms: Vec<String>,
    /// `true` = every term must match (AND), `false` = any term (OR)
    pub match_all: bool,
    /// Fields to match against
    pub scope: Scope,
    /// Folder to search, as a `/`- or `\`-separated path
    pub folder_path: String,
    /// Date-window or count bound for the enumeration pass
    #[serde(default)]
    pub bounds: Bounds,
}
