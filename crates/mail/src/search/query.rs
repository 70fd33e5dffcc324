//! Search term tokenization
//!
//! Splits raw request terms into words and quoted phrases. A segment
//! wrapped in double quotes is kept as one contiguous phrase; everything
//! else splits on whitespace.

use crate::error::{EngineError, Result};

/// One search token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A single word, matched as a substring
    Word(String),
    /// A quoted multi-word phrase, matched as one contiguous substring
    Phrase(String),
}

impl Term {
    /// The token's text without quoting
    pub fn text(&self) -> &str {
        match self {
            Self::Word(s) | Self::Phrase(s) => s,
        }
    }

    pub fn is_phrase(&self) -> bool {
        matches!(self, Self::Phrase(_))
    }
}

/// Tokenize raw request terms into [`Term`]s.
///
/// Rejects requests that contain no usable tokens with
/// [`EngineError::InvalidQuery`].
pub fn tokenize(inputs: &[String]) -> Result<Vec<Term>> {
    let mut terms = Vec::new();
    for input in inputs {
        scan_tokens(input, &mut terms);
    }

    if terms.is_empty() {
        return Err(EngineError::InvalidQuery(
            "search requires at least one term".to_string(),
        ));
    }

    Ok(terms)
}

/// Scan one raw term string into words and quoted phrases
fn scan_tokens(input: &str, out: &mut Vec<Term>) {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        // Skip whitespace
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        if chars[i] == '"' {
            // Quoted phrase: everything up to the closing quote
            let mut phrase = String::new();
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                phrase.push(chars[i]);
                i += 1;
            }
            if i < chars.len() {
                i += 1; // consume closing quote
            }
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                out.push(Term::Phrase(phrase.to_string()));
            }
        } else {
            // Unquoted word, up to the next whitespace
            let mut word = String::new();
            while i < chars.len() && !chars[i].is_whitespace() {
                word.push(chars[i]);
                i += 1;
            }
            out.push(Term::Word(word));
        }
    }
}
