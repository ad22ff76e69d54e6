// CSV export of a fetched page of recommendations
// Fields are quoted per RFC 4180 by the csv writer, so commas or quotes in
// names cannot corrupt the file

use crate::models::CustomerRecommendation;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed output filename for the listing export
pub const EXPORT_FILENAME: &str = "recommendations.csv";

/// Column order of the export
const CSV_HEADER: [&str; 5] = [
    "Customer ID",
    "Customer Name",
    "Account Number",
    "Cluster",
    "Recommended Products",
];

/// Serialize records to CSV. The export covers the fetched page as returned
/// by the server, before dedup and filtering.
///
/// The Recommended Products field flattens the product list by joining
/// product names with ", ".
pub fn write_csv<W: Write>(writer: W, records: &[CustomerRecommendation]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;

    for record in records {
        let products = record
            .recommended_products
            .iter()
            .map(|product| product.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let cluster = record.cluster.to_string();
        csv_writer.write_record([
            record.customer_id.as_str(),
            record.customer_name.as_str(),
            record.account_number.as_str(),
            cluster.as_str(),
            products.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write `recommendations.csv` into `dir` and return its path.
pub fn export_recommendations(
    dir: &Path,
    records: &[CustomerRecommendation],
) -> Result<PathBuf> {
    let path = dir.join(EXPORT_FILENAME);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, records)?;
    Ok(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecommendedProduct;

    fn create_test_record(
        id: &str,
        name: &str,
        account: &str,
        cluster: u32,
        products: &[&str],
    ) -> CustomerRecommendation {
        CustomerRecommendation {
            customer_id: id.to_string(),
            customer_name: name.to_string(),
            account_number: account.to_string(),
            cluster,
            recommended_products: products
                .iter()
                .map(|name| RecommendedProduct {
                    name: name.to_string(),
                    reason: "Test".to_string(),
                })
                .collect(),
        }
    }

    fn export_to_string(records: &[CustomerRecommendation]) -> String {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, records).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_row_and_column_order() {
        let output = export_to_string(&[]);
        assert_eq!(
            output.lines().next().unwrap(),
            "Customer ID,Customer Name,Account Number,Cluster,Recommended Products"
        );
    }

    #[test]
    fn test_products_joined_with_comma_space() {
        let record = create_test_record("1", "X", "A1", 2, &["P1", "P2"]);
        let output = export_to_string(&[record]);

        let data_line = output.lines().nth(1).unwrap();
        // Joined products contain a comma, so the csv writer must quote them
        assert_eq!(data_line, "1,X,A1,2,\"P1, P2\"");
    }

    #[test]
    fn test_single_product_is_unquoted() {
        let record = create_test_record("1", "X", "A1", 2, &["P1"]);
        let output = export_to_string(&[record]);

        assert_eq!(output.lines().nth(1).unwrap(), "1,X,A1,2,P1");
    }

    #[test]
    fn test_comma_in_customer_name_is_quoted() {
        let record = create_test_record("1", "Doe, Jane", "A1", 0, &["P1"]);
        let output = export_to_string(&[record]);

        assert!(output.contains("\"Doe, Jane\""));
    }

    #[test]
    fn test_quote_in_product_name_is_escaped() {
        let record = create_test_record("1", "X", "A1", 0, &["\"Premium\" Card"]);
        let output = export_to_string(&[record]);

        // RFC 4180: embedded quotes doubled inside a quoted field
        assert!(output.contains("\"\"\"Premium\"\" Card\""));
    }

    #[test]
    fn test_export_writes_fixed_filename() {
        let dir = tempfile::tempdir().unwrap();
        let record = create_test_record("1", "X", "A1", 2, &["P1"]);

        let path = export_recommendations(dir.path(), &[record]).unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILENAME);
        assert!(path.exists());
    }
}
