//! Bounded worker pool for record derivation
//!
//! Workers only ever see [`RawFields`] copies — remote handles never cross
//! a thread boundary. Order of the input batch is preserved.

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use super::{Profile, RawFields, derive_record};
use crate::models::ExtractedRecord;

/// Build a pool of the configured size
pub(super) fn build(threads: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
}

/// Derive records from copied fields across the pool. Failing items are
/// dropped with a debug note; the second element counts them.
pub(super) fn derive_on(
    pool: &ThreadPool,
    raws: Vec<RawFields>,
    profile: Profile,
) -> (Vec<ExtractedRecord>, usize) {
    let results: Vec<anyhow::Result<ExtractedRecord>> = pool.install(|| {
        raws.into_par_iter()
            .map(|raw| derive_record(raw, profile))
            .collect()
    });

    let mut records = Vec::with_capacity(results.len());
    let mut dropped = 0;
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                dropped += 1;
                log::debug!("dropping undecodable item: {err}");
            }
        }
    }
    (records, dropped)
}
