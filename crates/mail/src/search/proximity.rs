//! Proximity refinement for body searches
//!
//! Substring filters accept bodies where AND-combined terms occur hundreds
//! of characters apart in unrelated sentences. This refinement keeps a body
//! only when every independent term occurs and the distinct terms co-occur
//! within a fixed character window. Quoted phrases are exempt from the
//! window but must match as exact contiguous substrings.

use crate::search::Term;

/// Maximum character span between the first and last distinct term of a
/// co-occurrence
pub const PROXIMITY_WINDOW: usize = 50;

/// Check whether `body` satisfies an AND-logic body search: every quoted
/// phrase appears verbatim, and the distinct unquoted terms all occur
/// within [`PROXIMITY_WINDOW`] characters of each other somewhere in the
/// text. Matching is case-insensitive.
pub fn proximity_match(body: &str, terms: &[Term]) -> bool {
    let haystack = body.to_lowercase();

    let mut words: Vec<String> = Vec::new();
    for term in terms {
        match term {
            Term::Phrase(phrase) => {
                if !haystack.contains(&phrase.to_lowercase()) {
                    return false;
                }
            }
            Term::Word(word) => words.push(word.to_lowercase()),
        }
    }

    words.sort();
    words.dedup();

    match words.len() {
        0 => true,
        1 => haystack.contains(&words[0]),
        _ => min_span(&haystack, &words).is_some_and(|span| span <= PROXIMITY_WINDOW),
    }
}

/// The smallest span (distance between start offsets) of any region of
/// `haystack` containing every word, or `None` when some word is absent.
fn min_span(haystack: &str, words: &[String]) -> Option<usize> {
    // (offset, word index) for every occurrence of every word
    let mut occurrences: Vec<(usize, usize)> = Vec::new();
    for (idx, word) in words.iter().enumerate() {
        let mut found = false;
        for (offset, _) in haystack.match_indices(word.as_str()) {
            occurrences.push((offset, idx));
            found = true;
        }
        if !found {
            return None;
        }
    }
    occurrences.sort_unstable();

    // Sliding window over the merged occurrence list: shrink from the left
    // while the window still covers every distinct word.
    let mut counts = vec![0usize; words.len()];
    let mut covered = 0;
    let mut best: Option<usize> = None;
    let mut lo = 0;

    for hi in 0..occurrences.len() {
        let (_, word) = occurrences[hi];
        if counts[word] == 0 {
            covered += 1;
        }
        counts[word] += 1;

        while covered == words.len() {
            let span = occurrences[hi].0 - occurrences[lo].0;
            best = Some(best.map_or(span, |b| b.min(span)));

            let (_, lo_word) = occurrences[lo];
            counts[lo_word] -= 1;
            if counts[lo_word] == 0 {
                covered -= 1;
            }
            lo += 1;
        }
    }

    best
}
