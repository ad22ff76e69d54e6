// Recommendation Dashboard - Core Library
// Exposes the batch-import/export pipeline for the CLI, the TUI, and tests

pub mod api;
pub mod cache;
pub mod export;
pub mod fetch;
pub mod listing;
pub mod models;
pub mod spreadsheet;
pub mod working_set;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use cache::{CachedEntry, PageKey, ResponseCache};
pub use export::{export_recommendations, write_csv, EXPORT_FILENAME};
pub use fetch::{Fetcher, Token};
pub use listing::{dedup_by_account, matches_filter, Pagination, PAGE_SIZE};
pub use models::{
    AnalyticsResponse, BatchRecommendRequest, ClusterDistribution, CustomerRecommendation,
    ProductFrequency, RecommendAllResponse, RecommendedProduct,
};
pub use spreadsheet::{
    import_account_numbers, write_template, ImportError, ACCOUNT_COLUMN, TEMPLATE_FILENAME,
};
pub use working_set::AccountWorkingSet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
