// Spreadsheet ingestion and template export
// Import: first sheet only, header row must carry an `account_number` column
// Export: one-row template so uploads match the expected shape

use crate::working_set::AccountWorkingSet;
use anyhow::Result;
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Column the importer looks for in the header row
pub const ACCOUNT_COLUMN: &str = "account_number";

/// Filename for the downloadable import template
pub const TEMPLATE_FILENAME: &str = "account_numbers_template.xlsx";

// ============================================================================
// IMPORT ERRORS
// ============================================================================

/// Import failures, all recovered locally: the working set is never touched
/// when any of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportError {
    /// Header row lacks the `account_number` column
    InvalidFormat,

    /// The first sheet has no data rows below the header
    EmptyFile,

    /// Every value was blank or already in the working set
    NoNewAccounts,

    /// The file could not be opened or parsed as a spreadsheet
    UnreadableFile,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::InvalidFormat => {
                write!(f, "Invalid file format. Please use the template provided")
            }
            ImportError::EmptyFile => write!(f, "The file is empty"),
            ImportError::NoNewAccounts => {
                write!(f, "No new account numbers found in the file")
            }
            ImportError::UnreadableFile => {
                write!(f, "Error reading file. Please ensure it's a valid Excel file")
            }
        }
    }
}

impl std::error::Error for ImportError {}

// ============================================================================
// IMPORT
// ============================================================================

/// Read account numbers from the first sheet of a spreadsheet.
///
/// Returns the values that are new relative to `existing`, trimmed, with
/// blank cells and duplicates (against the working set and within the file)
/// dropped. File order is preserved. The caller appends the result to the
/// working set on success; on any error the working set stays as it was.
pub fn import_account_numbers(
    path: &Path,
    existing: &AccountWorkingSet,
) -> Result<Vec<String>, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|_| ImportError::UnreadableFile)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::UnreadableFile)?
        .map_err(|_| ImportError::UnreadableFile)?;

    let mut rows = range.rows();

    // Empty-sheet check comes first: a sheet without data rows is reported
    // as empty even when the header is also wrong.
    let header = match rows.next() {
        Some(row) => row,
        None => return Err(ImportError::EmptyFile),
    };

    let data_rows: Vec<&[Data]> = rows.collect();
    if data_rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let column = header
        .iter()
        .position(|cell| cell_to_string(cell) == ACCOUNT_COLUMN)
        .ok_or(ImportError::InvalidFormat)?;

    let mut new_accounts: Vec<String> = Vec::new();
    for row in data_rows {
        let value = match row.get(column) {
            Some(cell) => cell_to_string(cell),
            None => continue,
        };

        if value.is_empty() || existing.contains(&value) || new_accounts.contains(&value) {
            continue;
        }
        new_accounts.push(value);
    }

    if new_accounts.is_empty() {
        return Err(ImportError::NoNewAccounts);
    }

    Ok(new_accounts)
}

/// Coerce a cell to its display string, trimmed.
///
/// Integral floats print without a decimal part so numeric account columns
/// come out as "100", not "100.0".
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// TEMPLATE EXPORT
// ============================================================================

/// Write the import template: a single sheet with one header row and no data.
///
/// Deterministic; the only failure mode is I/O, which the caller treats as
/// fatal.
pub fn write_template(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Template")?;
    worksheet.write_string(0, 0, ACCOUNT_COLUMN)?;
    workbook.save(path)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn xlsx_tempfile() -> NamedTempFile {
        tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .unwrap()
    }

    /// Build an xlsx fixture with the given header and one string cell per row
    fn write_fixture(header: &str, rows: &[&str]) -> NamedTempFile {
        let file = xlsx_tempfile();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, header).unwrap();
        for (i, value) in rows.iter().enumerate() {
            worksheet.write_string((i + 1) as u32, 0, *value).unwrap();
        }
        workbook.save(file.path()).unwrap();
        file
    }

    #[test]
    fn test_import_new_accounts_in_file_order() {
        let file = write_fixture(ACCOUNT_COLUMN, &["100", "200", "100"]);
        let set = AccountWorkingSet::new();

        let accounts = import_account_numbers(file.path(), &set).unwrap();
        assert_eq!(accounts, vec!["100".to_string(), "200".to_string()]);
    }

    #[test]
    fn test_import_filters_against_working_set() {
        let file = write_fixture(ACCOUNT_COLUMN, &["100", "300"]);
        let mut set = AccountWorkingSet::new();
        set.add("100");

        let accounts = import_account_numbers(file.path(), &set).unwrap();
        assert_eq!(accounts, vec!["300".to_string()]);

        set.append_all(&accounts);
        assert_eq!(set.as_slice(), &["100".to_string(), "300".to_string()]);
    }

    #[test]
    fn test_import_missing_column_is_invalid_format() {
        let file = write_fixture("acct", &["100"]);
        let set = AccountWorkingSet::new();

        let err = import_account_numbers(file.path(), &set).unwrap_err();
        assert_eq!(err, ImportError::InvalidFormat);
    }

    #[test]
    fn test_import_header_only_is_empty_file() {
        let file = write_fixture(ACCOUNT_COLUMN, &[]);
        let set = AccountWorkingSet::new();

        let err = import_account_numbers(file.path(), &set).unwrap_err();
        assert_eq!(err, ImportError::EmptyFile);
    }

    #[test]
    fn test_import_all_duplicates_is_no_new_accounts() {
        let file = write_fixture(ACCOUNT_COLUMN, &["100", "200"]);
        let mut set = AccountWorkingSet::new();
        set.add("100");
        set.add("200");

        let err = import_account_numbers(file.path(), &set).unwrap_err();
        assert_eq!(err, ImportError::NoNewAccounts);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_import_all_blank_is_no_new_accounts() {
        let file = write_fixture(ACCOUNT_COLUMN, &["   ", ""]);
        let set = AccountWorkingSet::new();

        let err = import_account_numbers(file.path(), &set).unwrap_err();
        assert_eq!(err, ImportError::NoNewAccounts);
    }

    #[test]
    fn test_import_trims_whitespace() {
        let file = write_fixture(ACCOUNT_COLUMN, &["  100  "]);
        let set = AccountWorkingSet::new();

        let accounts = import_account_numbers(file.path(), &set).unwrap();
        assert_eq!(accounts, vec!["100".to_string()]);
    }

    #[test]
    fn test_import_coerces_numeric_cells() {
        let file = xlsx_tempfile();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, ACCOUNT_COLUMN).unwrap();
        worksheet.write_number(1, 0, 100.0).unwrap();
        worksheet.write_number(2, 0, 205.5).unwrap();
        workbook.save(file.path()).unwrap();

        let set = AccountWorkingSet::new();
        let accounts = import_account_numbers(file.path(), &set).unwrap();
        assert_eq!(accounts, vec!["100".to_string(), "205.5".to_string()]);
    }

    #[test]
    fn test_import_garbage_is_unreadable() {
        let mut file = xlsx_tempfile();
        file.write_all(b"definitely not a zip archive").unwrap();
        file.flush().unwrap();

        let set = AccountWorkingSet::new();
        let err = import_account_numbers(file.path(), &set).unwrap_err();
        assert_eq!(err, ImportError::UnreadableFile);
    }

    #[test]
    fn test_template_round_trips_through_importer() {
        let file = xlsx_tempfile();
        write_template(file.path()).unwrap();

        // A freshly downloaded template has the right header and no rows
        let set = AccountWorkingSet::new();
        let err = import_account_numbers(file.path(), &set).unwrap_err();
        assert_eq!(err, ImportError::EmptyFile);
    }

    #[test]
    fn test_account_column_in_second_position() {
        let file = xlsx_tempfile();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "customer_name").unwrap();
        worksheet.write_string(0, 1, ACCOUNT_COLUMN).unwrap();
        worksheet.write_string(1, 0, "Jane Doe").unwrap();
        worksheet.write_string(1, 1, "ACC-9").unwrap();
        workbook.save(file.path()).unwrap();

        let set = AccountWorkingSet::new();
        let accounts = import_account_numbers(file.path(), &set).unwrap();
        assert_eq!(accounts, vec!["ACC-9".to_string()]);
    }
}
