//! Pre-flight validation of parsed spreadsheet rows.
//!
//! Pure and synchronous: the same batch always yields the same report, no
//! I/O, no mutation of the input. Findings are data, not errors; nothing
//! here ever throws.
//!
//! Category checking is deliberately separate from [`validate`]: the
//! category list lives on the external API and is injected by the caller
//! ([`category_errors`]), keeping this module testable without a network.
//! The import pipeline runs it as a second phase after the batch gate.
//!
//! Row numbering convention: the header occupies line 1, so a data row's
//! number is its index within the parsed sequence + 2.

use serde::{Deserialize, Serialize};

use crate::csv::{MalformedRow, SpreadsheetRow};
use crate::models::Category;

/// Fields that must be non-empty after trimming.
pub const REQUIRED_FIELDS: [&str; 3] = ["Name", "Description", "Overview"];

/// Fields that, when non-empty, must read "yes" or "no" (case-insensitive).
/// Empty is allowed and decodes to false downstream.
pub const BOOLEAN_FIELDS: [&str; 4] = ["Is Active", "Is Featured", "Is New", "Is Trending"];

/// Fields that, when non-empty, must parse as a finite number.
pub const NUMERIC_FIELDS: [&str; 4] = ["Rating", "Views", "Bookings Count", "Trending Score"];

// =============================================================================
// Report types
// =============================================================================

/// One validation finding, attributable to a row and field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowError {
    /// Spreadsheet row number (header is line 1, data starts at 2).
    pub row: usize,
    pub field: String,
    pub message: String,
}

/// Per-batch validation summary.
///
/// Invariant: `successful + failed == total`, and a row counts as failed
/// iff it has at least one entry in `errors`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

impl ValidationReport {
    /// Whether a given row number already has an error recorded.
    fn row_has_error(&self, row: usize) -> bool {
        self.errors.iter().any(|e| e.row == row)
    }

    /// Record a failure for a row that was previously counted successful.
    ///
    /// Used by the import pipeline for post-gate findings (unknown category,
    /// create-API failure). Adjusts the counters only on the row's first
    /// error so the report invariant holds.
    pub fn mark_failed(&mut self, row: usize, field: impl Into<String>, message: impl Into<String>) {
        let first_for_row = !self.row_has_error(row);
        self.errors.push(RowError {
            row,
            field: field.into(),
            message: message.into(),
        });
        if first_for_row {
            self.failed += 1;
            self.successful = self.successful.saturating_sub(1);
        }
    }

    /// Fold a malformed (wrong-width) line into the report as a failed row.
    ///
    /// Malformed lines never made it into the parsed sequence, so they are
    /// added to `total` here and numbered by their raw file line.
    pub fn record_malformed(&mut self, malformed: &MalformedRow) {
        self.total += 1;
        self.failed += 1;
        self.errors.push(RowError {
            row: malformed.line,
            field: "Row".into(),
            message: format!(
                "Expected {} columns, found {}",
                malformed.expected, malformed.found
            ),
        });
    }
}

// =============================================================================
// Validation rules
// =============================================================================

/// Validate a parsed batch against the field-level rules.
///
/// Every rule violation yields one [`RowError`]; a row may accumulate
/// several. Rows are never mutated and nothing is persisted here.
pub fn validate(rows: &[SpreadsheetRow]) -> ValidationReport {
    let mut report = ValidationReport {
        total: rows.len(),
        ..ValidationReport::default()
    };

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 2;
        let mut row_errors = Vec::new();

        for field in REQUIRED_FIELDS {
            if cell(row, field).trim().is_empty() {
                row_errors.push(RowError {
                    row: row_no,
                    field: field.into(),
                    message: format!("{field} is required"),
                });
            }
        }

        for field in BOOLEAN_FIELDS {
            let value = cell(row, field);
            let trimmed = value.trim();
            if !trimmed.is_empty() && !matches!(trimmed.to_lowercase().as_str(), "yes" | "no") {
                row_errors.push(RowError {
                    row: row_no,
                    field: field.into(),
                    message: format!("{field} must be Yes or No, got '{trimmed}'"),
                });
            }
        }

        for field in NUMERIC_FIELDS {
            let value = cell(row, field);
            let trimmed = value.trim();
            if !trimmed.is_empty() && trimmed.parse::<f64>().map(f64::is_finite) != Ok(true) {
                row_errors.push(RowError {
                    row: row_no,
                    field: field.into(),
                    message: format!("{field} must be a number, got '{trimmed}'"),
                });
            }
        }

        if row_errors.is_empty() {
            report.successful += 1;
        } else {
            report.failed += 1;
            report.errors.extend(row_errors);
        }
    }

    report
}

/// Check each row's Category against an externally fetched category list.
///
/// A non-empty Category must case-insensitively match one of the list's
/// names. Empty categories pass. Row numbering follows the same index + 2
/// convention as [`validate`].
pub fn category_errors(rows: &[SpreadsheetRow], categories: &[Category]) -> Vec<RowError> {
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let value = cell(row, "Category");
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if match_category(categories, trimmed).is_none() {
            errors.push(RowError {
                row: idx + 2,
                field: "Category".into(),
                message: format!("Unknown category '{trimmed}'"),
            });
        }
    }

    errors
}

/// Case-insensitive lookup of a category by name.
pub fn match_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories
        .iter()
        .find(|c| c.name.trim().eq_ignore_ascii_case(name.trim()))
}

fn cell<'a>(row: &'a SpreadsheetRow, field: &str) -> &'a str {
    row.get(field).map(String::as_str).unwrap_or("")
}

// =============================================================================
// Tests
// =============================================================================
