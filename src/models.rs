// Wire types for the remote recommendation API
// Field names follow the server's JSON exactly; camelCase payloads are renamed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// RECOMMENDATION TYPES
// ============================================================================

/// A single product the server recommends for a customer.
/// Opaque payload: displayed, never interpreted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub name: String,
    pub reason: String,
}

/// One customer's recommendation record, as returned by
/// `/customer/{account}`, `/recommend-batch` and `/recommend-all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecommendation {
    pub customer_id: String,
    pub customer_name: String,
    pub account_number: String,
    pub cluster: u32,
    pub recommended_products: Vec<RecommendedProduct>,
}

/// Request body for POST /recommend-batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecommendRequest {
    pub account_numbers: Vec<String>,
}

/// Response envelope for GET /recommend-all?page={n}&page_size={m}
///
/// The server does not report a total count; `records_returned` is all the
/// pagination signal there is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendAllResponse {
    pub page: usize,
    pub page_size: usize,
    pub records_returned: usize,
    pub data: Vec<CustomerRecommendation>,
}

// ============================================================================
// ANALYTICS TYPES
// ============================================================================

/// One bucket of the cluster distribution histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDistribution {
    pub cluster: String,
    pub value: u64,
    pub percentage: String,
}

/// Product frequency entry (how often a product was recommended).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFrequency {
    pub name: String,
    pub value: u64,
    pub description: String,
}

/// Aggregate statistics from GET /analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(rename = "totalCustomers")]
    pub total_customers: u64,

    #[serde(rename = "totalRecommendations")]
    pub total_recommendations: u64,

    #[serde(rename = "conversionRate")]
    pub conversion_rate: Option<f64>,

    #[serde(rename = "avgProductsPerCustomer")]
    pub avg_products_per_customer: f64,

    #[serde(rename = "clusterDistribution")]
    pub cluster_distribution: Vec<ClusterDistribution>,

    #[serde(rename = "productRecommendations")]
    pub product_recommendations: Vec<ProductFrequency>,

    /// Segment payload has no stable shape yet; kept as raw JSON values
    #[serde(rename = "customerSegments")]
    #[serde(default)]
    pub customer_segments: Vec<serde_json::Value>,

    /// Server-side timestamp string; format is not part of the contract
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

/// When a cached response was fetched, shown in the UI status bar.
pub type FetchedAt = DateTime<Utc>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_recommend_all_response() {
        let payload = r#"{
            "page": 0,
            "page_size": 10,
            "records_returned": 1,
            "data": [{
                "customer_id": "1",
                "customer_name": "Jane Doe",
                "account_number": "ACC-100",
                "cluster": 2,
                "recommended_products": [
                    { "name": "Gold Savings", "reason": "High balance" }
                ]
            }]
        }"#;

        let response: RecommendAllResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.page, 0);
        assert_eq!(response.records_returned, 1);
        assert_eq!(response.data[0].account_number, "ACC-100");
        assert_eq!(response.data[0].cluster, 2);
        assert_eq!(response.data[0].recommended_products[0].name, "Gold Savings");
    }

    #[test]
    fn test_serialize_batch_request() {
        let request = BatchRecommendRequest {
            account_numbers: vec!["100".to_string(), "200".to_string()],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"account_numbers":["100","200"]}"#);
    }

    #[test]
    fn test_deserialize_analytics_camel_case() {
        let payload = r#"{
            "totalCustomers": 5000,
            "totalRecommendations": 14200,
            "conversionRate": null,
            "avgProductsPerCustomer": 2.84,
            "clusterDistribution": [
                { "cluster": "Cluster 0", "value": 1200, "percentage": "24%" }
            ],
            "productRecommendations": [
                { "name": "Gold Savings", "value": 900, "description": "Savings tier" }
            ],
            "customerSegments": [],
            "lastUpdated": "2025-06-01T12:00:00Z"
        }"#;

        let analytics: AnalyticsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(analytics.total_customers, 5000);
        assert_eq!(analytics.conversion_rate, None);
        assert_eq!(analytics.cluster_distribution[0].cluster, "Cluster 0");
        assert_eq!(analytics.product_recommendations[0].value, 900);
    }
}
