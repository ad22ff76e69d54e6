// Listing pipeline for the "all recommendations" view
// Dedup by account number, free-text filter, server-driven pagination

use crate::models::CustomerRecommendation;
use std::collections::HashMap;

/// Page size requested from GET /recommend-all
pub const PAGE_SIZE: usize = 10;

// ============================================================================
// DEDUPLICATION
// ============================================================================

/// Collapse duplicate account numbers within a fetched page.
///
/// Last write wins: when the same `account_number` appears more than once,
/// the record keeps its first position in the page but carries the fields of
/// the last occurrence.
pub fn dedup_by_account(records: Vec<CustomerRecommendation>) -> Vec<CustomerRecommendation> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut result: Vec<CustomerRecommendation> = Vec::new();

    for record in records {
        match positions.get(&record.account_number) {
            Some(&index) => result[index] = record,
            None => {
                positions.insert(record.account_number.clone(), result.len());
                result.push(record);
            }
        }
    }

    result
}

// ============================================================================
// FILTERING
// ============================================================================

/// Free-text filter over the page currently in memory (not a server search).
///
/// Matches case-insensitively as a substring of the customer name, or as a
/// case-sensitive substring of the account number.
pub fn matches_filter(record: &CustomerRecommendation, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    record
        .customer_name
        .to_lowercase()
        .contains(&term.to_lowercase())
        || record.account_number.contains(term)
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Server-driven pagination state for the listing view.
///
/// The server reports no total count, so "has more" is a heuristic: a page
/// that came back exactly full is assumed to have a successor. When the final
/// page happens to be exactly full this yields one extra fetch that returns
/// an empty page. Known boundary behavior, kept until the API grows a total
/// count or an explicit has-more flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Pagination { page: 0, page_size }
    }

    /// Previous is disabled at page 0.
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Next is enabled only when the current page came back exactly full.
    pub fn has_next(&self, records_returned: usize) -> bool {
        records_returned == self.page_size
    }

    /// Advance one page if the heuristic allows it. Returns true on change.
    pub fn next(&mut self, records_returned: usize) -> bool {
        if self.has_next(records_returned) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns true on change.
    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecommendedProduct;

    fn create_test_record(account: &str, name: &str, cluster: u32) -> CustomerRecommendation {
        CustomerRecommendation {
            customer_id: format!("id-{}", account),
            customer_name: name.to_string(),
            account_number: account.to_string(),
            cluster,
            recommended_products: vec![RecommendedProduct {
                name: "Gold Savings".to_string(),
                reason: "Test".to_string(),
            }],
        }
    }

    #[test]
    fn test_dedup_last_occurrence_wins() {
        let records = vec![
            create_test_record("A", "First A", 1),
            create_test_record("B", "Only B", 2),
            create_test_record("A", "Last A", 3),
        ];

        let deduped = dedup_by_account(records);
        assert_eq!(deduped.len(), 2);

        // "A" keeps its original position but carries the later record
        assert_eq!(deduped[0].account_number, "A");
        assert_eq!(deduped[0].customer_name, "Last A");
        assert_eq!(deduped[0].cluster, 3);
        assert_eq!(deduped[1].account_number, "B");
    }

    #[test]
    fn test_dedup_without_duplicates_is_identity() {
        let records = vec![
            create_test_record("A", "Jane", 1),
            create_test_record("B", "John", 2),
        ];

        let deduped = dedup_by_account(records.clone());
        assert_eq!(deduped, records);
    }

    #[test]
    fn test_filter_name_case_insensitive() {
        let record = create_test_record("ACC-1", "Jane Doe", 1);

        assert!(matches_filter(&record, "jane"));
        assert!(matches_filter(&record, "DOE"));
        assert!(!matches_filter(&record, "smith"));
    }

    #[test]
    fn test_filter_account_substring() {
        let record = create_test_record("ACC-12345", "Jane Doe", 1);

        assert!(matches_filter(&record, "123"));
        assert!(matches_filter(&record, "ACC-12345"));
        assert!(!matches_filter(&record, "999"));
    }

    #[test]
    fn test_filter_empty_term_matches_all() {
        let record = create_test_record("ACC-1", "Jane Doe", 1);
        assert!(matches_filter(&record, ""));
    }

    #[test]
    fn test_pagination_full_page_enables_next() {
        let mut pagination = Pagination::new(10);

        assert!(pagination.has_next(10));
        assert!(pagination.next(10));
        assert_eq!(pagination.page, 1);
    }

    #[test]
    fn test_pagination_short_page_disables_next() {
        let mut pagination = Pagination::new(10);

        assert!(!pagination.has_next(9));
        assert!(!pagination.next(9));
        assert_eq!(pagination.page, 0);
    }

    #[test]
    fn test_pagination_previous_disabled_at_page_zero() {
        let mut pagination = Pagination::new(10);

        assert!(!pagination.has_previous());
        assert!(!pagination.previous());
        assert_eq!(pagination.page, 0);

        pagination.next(10);
        assert!(pagination.previous());
        assert_eq!(pagination.page, 0);
    }
}
