// Recommendation API client (blocking)
// One request per call, no retries: the user re-triggers the action instead

use crate::models::{
    AnalyticsResponse, BatchRecommendRequest, CustomerRecommendation, RecommendAllResponse,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Fallback when RECOMMEND_API_URL is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "RECOMMEND_API_URL";

// ============================================================================
// ERRORS
// ============================================================================

/// Transport and server failures. The working set and any previously fetched
/// page are never discarded because of one of these; the user retries by
/// re-invoking the same action.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Connection, DNS, or timeout failure
    Network(String),

    /// Non-success HTTP status with response body
    Http(u16, String),

    /// Response body did not match the expected shape
    Parse(String),

    /// The requested account has no recommendation
    NotFound(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::NotFound(account) => {
                write!(f, "No recommendation found for account {}", account)
            }
        }
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// CLIENT
// ============================================================================

/// Blocking client for the remote recommendation service.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (trailing slash tolerated).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("recommend-dashboard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from RECOMMEND_API_URL, falling back to localhost.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /customer/{accountNumber} - single recommendation lookup
    pub fn customer(&self, account_number: &str) -> Result<CustomerRecommendation, ApiError> {
        let url = format!("{}/customer/{}", self.base_url, account_number);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(account_number.to_string()));
        }

        Self::parse_response(response)
    }

    /// POST /recommend-batch - recommendations for the full working set.
    ///
    /// Atomic: either the full list comes back or the call fails.
    pub fn recommend_batch(
        &self,
        account_numbers: &[String],
    ) -> Result<Vec<CustomerRecommendation>, ApiError> {
        let url = format!("{}/recommend-batch", self.base_url);
        let body = BatchRecommendRequest {
            account_numbers: account_numbers.to_vec(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::parse_response(response)
    }

    /// GET /recommend-all?page={n}&page_size={m} - one page of the listing
    pub fn recommend_all(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<RecommendAllResponse, ApiError> {
        let url = self.recommend_all_url(page, page_size);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::parse_response(response)
    }

    /// GET /analytics - aggregate statistics
    pub fn analytics(&self) -> Result<AnalyticsResponse, ApiError> {
        let url = format!("{}/analytics", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::parse_response(response)
    }

    fn recommend_all_url(&self, page: usize, page_size: usize) -> String {
        format!(
            "{}/recommend-all?page={}&page_size={}",
            self.base_url, page, page_size
        )
    }

    fn parse_response<T: DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Http(status.as_u16(), body));
        }

        response.json().map_err(|e| ApiError::Parse(e.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://example.com/api/").unwrap();
        assert_eq!(client.base_url(), "http://example.com/api");
    }

    #[test]
    fn test_recommend_all_url_shape() {
        let client = ApiClient::new("http://example.com").unwrap();
        assert_eq!(
            client.recommend_all_url(3, 10),
            "http://example.com/recommend-all?page=3&page_size=10"
        );
    }

    #[test]
    fn test_connection_failure_is_network_error() {
        // Port 1 on loopback refuses immediately
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client.analytics().unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
