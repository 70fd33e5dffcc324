//! Position-addressable result cache and pager
//!
//! Every list/search rebuilds the cache from scratch; it is never merged
//! incrementally. Callers address records only through 1-based positions
//! in the rebuild's order, which go stale on the next rebuild.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{EntryId, ExtractedRecord};

/// Records per page
pub const PAGE_SIZE: usize = 5;

/// Ordered store of extracted records, addressed by 1-based position.
///
/// `order` defines display positions; every id in it has an entry in
/// `records` and appears exactly once.
#[derive(Debug, Default)]
pub struct ResultCache {
    order: Vec<EntryId>,
    records: HashMap<EntryId, ExtractedRecord>,
}

impl ResultCache {
    /// Build a fresh cache from records in display order. Duplicate ids
    /// keep their first occurrence.
    pub fn rebuild(records: Vec<ExtractedRecord>) -> Self {
        let mut order = Vec::with_capacity(records.len());
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            if map.contains_key(&record.id) {
                log::debug!("ignoring duplicate record {}", record.id.as_str());
                continue;
            }
            order.push(record.id.clone());
            map.insert(record.id.clone(), record);
        }
        Self {
            order,
            records: map,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of pages in the current cache
    pub fn page_count(&self) -> usize {
        self.order.len().div_ceil(PAGE_SIZE)
    }

    /// The records at page `page` (1-based). Out-of-range pages fail, they
    /// are never clamped.
    pub fn page(&self, page: usize) -> Result<PageView> {
        let pages = self.page_count();
        if page < 1 || page > pages {
            return Err(EngineError::PageOutOfRange { page, pages });
        }
        Ok(self.page_view(page))
    }

    /// The first page, or an empty view when the cache holds nothing.
    /// Used for the view returned directly from list/search.
    pub fn first_page(&self) -> PageView {
        if self.is_empty() {
            return PageView {
                page: 1,
                page_count: 0,
                total: 0,
                records: Vec::new(),
            };
        }
        self.page_view(1)
    }

    fn page_view(&self, page: usize) -> PageView {
        let start = (page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.order.len());
        let records = self.order[start..end]
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();
        PageView {
            page,
            page_count: self.page_count(),
            total: self.order.len(),
            records,
        }
    }

    /// The record at a 1-based position. Out-of-range positions fail.
    pub fn get(&self, position: usize) -> Result<&ExtractedRecord> {
        let count = self.order.len();
        if position < 1 || position > count {
            return Err(EngineError::PositionNotFound { position, count });
        }
        self.records
            .get(&self.order[position - 1])
            .ok_or(EngineError::PositionNotFound { position, count })
    }
}

/// One page of results plus totals, computed on demand from the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    /// 1-based page number
    pub page: usize,
    /// Total pages in the cache
    pub page_count: usize,
    /// Total records in the cache
    pub total: usize,
    /// The page's records, at most [`PAGE_SIZE`]
    pub records: Vec<ExtractedRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_record(id: &str) -> ExtractedRecord {
        ExtractedRecord::builder(EntryId::new(id))
            .subject(format!("Subject {id}"))
            .sender_name("Sender")
            .received_at(Utc::now())
            .build()
    }

    fn cache_of(n: usize) -> ResultCache {
        ResultCache::rebuild((1..=n).map(|i| make_record(&format!("e{i}"))).collect())
    }

    #[test]
    fn test_pages_partition_without_gaps_or_overlaps() {
        let cache = cache_of(13);
        assert_eq!(cache.page_count(), 3);

        let mut seen = Vec::new();
        for page in 1..=cache.page_count() {
            let view = cache.page(page).unwrap();
            assert!(view.records.len() <= PAGE_SIZE);
            assert_eq!(view.total, 13);
            seen.extend(view.records.iter().map(|r| r.id.clone()));
        }

        assert_eq!(seen.len(), 13);
        let expected: Vec<EntryId> = (1..=13).map(|i| EntryId::new(format!("e{i}"))).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_page_out_of_range_fails() {
        let cache = cache_of(7);
        assert!(matches!(
            cache.page(0),
            Err(EngineError::PageOutOfRange { page: 0, pages: 2 })
        ));
        assert!(matches!(
            cache.page(3),
            Err(EngineError::PageOutOfRange { page: 3, pages: 2 })
        ));
    }

    #[test]
    fn test_get_by_position() {
        let cache = cache_of(7);
        assert_eq!(cache.get(1).unwrap().id.as_str(), "e1");
        assert_eq!(cache.get(7).unwrap().id.as_str(), "e7");
    }

    #[test]
    fn test_get_out_of_range_fails() {
        let cache = cache_of(3);
        assert!(matches!(
            cache.get(0),
            Err(EngineError::PositionNotFound { .. })
        ));
        assert!(matches!(
            cache.get(4),
            Err(EngineError::PositionNotFound { .. })
        ));

        let empty = ResultCache::default();
        assert!(matches!(
            empty.get(1),
            Err(EngineError::PositionNotFound { .. })
        ));
    }

    #[test]
    fn test_first_page_on_empty_cache() {
        let empty = ResultCache::default();
        let view = empty.first_page();
        assert_eq!(view.total, 0);
        assert_eq!(view.page_count, 0);
        assert!(view.records.is_empty());
    }

    #[test]
    fn test_rebuild_deduplicates_by_id() {
        let cache = ResultCache::rebuild(vec![
            make_record("e1"),
            make_record("e2"),
            make_record("e1"),
        ]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_page_view_serializes() {
        let cache = cache_of(2);
        let view = cache.page(1).unwrap();
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"total\":2"));
    }
}
