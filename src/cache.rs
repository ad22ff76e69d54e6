// Explicit in-memory response cache, owned by the view that uses it
// Keyed by request parameters; invalidation only happens on an explicit
// user-requested refresh

use crate::models::{AnalyticsResponse, FetchedAt, RecommendAllResponse};
use chrono::Utc;
use std::collections::HashMap;

/// Cache key for a listing page: (page, page_size)
pub type PageKey = (usize, usize);

/// A cached response plus the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
    pub value: T,
    pub fetched_at: FetchedAt,
}

/// Per-view response cache for the listing and analytics queries.
///
/// Navigating back to an already-fetched page is served from here without a
/// network round trip; a refresh invalidates the entry first so the refetch
/// actually hits the server.
#[derive(Debug, Default)]
pub struct ResponseCache {
    pages: HashMap<PageKey, CachedEntry<RecommendAllResponse>>,
    analytics: Option<CachedEntry<AnalyticsResponse>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_page(&self, key: PageKey) -> Option<&CachedEntry<RecommendAllResponse>> {
        self.pages.get(&key)
    }

    pub fn insert_page(&mut self, key: PageKey, response: RecommendAllResponse) {
        self.pages.insert(
            key,
            CachedEntry {
                value: response,
                fetched_at: Utc::now(),
            },
        );
    }

    /// Drop one page so the next fetch goes to the server.
    pub fn invalidate_page(&mut self, key: PageKey) {
        self.pages.remove(&key);
    }

    /// Drop every cached listing page (used when a refresh should not trust
    /// neighboring pages either).
    pub fn invalidate_all_pages(&mut self) {
        self.pages.clear();
    }

    pub fn get_analytics(&self) -> Option<&CachedEntry<AnalyticsResponse>> {
        self.analytics.as_ref()
    }

    pub fn insert_analytics(&mut self, response: AnalyticsResponse) {
        self.analytics = Some(CachedEntry {
            value: response,
            fetched_at: Utc::now(),
        });
    }

    pub fn invalidate_analytics(&mut self) {
        self.analytics = None;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_page(page: usize) -> RecommendAllResponse {
        RecommendAllResponse {
            page,
            page_size: 10,
            records_returned: 0,
            data: vec![],
        }
    }

    #[test]
    fn test_page_hit_and_miss() {
        let mut cache = ResponseCache::new();
        cache.insert_page((0, 10), create_test_page(0));

        assert!(cache.get_page((0, 10)).is_some());
        assert!(cache.get_page((1, 10)).is_none());
        assert!(cache.get_page((0, 25)).is_none());
    }

    #[test]
    fn test_invalidate_page_forces_miss() {
        let mut cache = ResponseCache::new();
        cache.insert_page((0, 10), create_test_page(0));

        cache.invalidate_page((0, 10));
        assert!(cache.get_page((0, 10)).is_none());
    }

    #[test]
    fn test_invalidate_all_pages() {
        let mut cache = ResponseCache::new();
        cache.insert_page((0, 10), create_test_page(0));
        cache.insert_page((1, 10), create_test_page(1));

        cache.invalidate_all_pages();
        assert!(cache.get_page((0, 10)).is_none());
        assert!(cache.get_page((1, 10)).is_none());
    }

    #[test]
    fn test_insert_overwrites_existing_entry() {
        let mut cache = ResponseCache::new();
        cache.insert_page((0, 10), create_test_page(0));

        let mut refreshed = create_test_page(0);
        refreshed.records_returned = 7;
        cache.insert_page((0, 10), refreshed);

        assert_eq!(cache.get_page((0, 10)).unwrap().value.records_returned, 7);
    }
}
