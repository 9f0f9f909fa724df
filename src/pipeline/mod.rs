//! Import/export orchestration.
//!
//! Sequences the leaf components without adding logic of its own:
//!
//! - export: fetch packages → encode each row → serialize under the fixed header
//! - import: parse → validate (batch gate) → category check → per-row decode
//!   and create → aggregated report
//!
//! The two failure policies differ on purpose. Validation gates the whole
//! batch: nothing is persisted while any row is invalid, so a rejection
//! means zero side effects. Once the gate passes, per-row create failures
//! are recorded as field "General" errors and the loop continues; a
//! completed import with `failed > 0` means partial persistence,
//! distinguishable only through the report's `errors`.
//!
//! Rows are processed strictly sequentially: row N's create call completes
//! before row N+1 begins, so the error list follows input order and no two
//! creates race.

use std::collections::HashSet;
use std::path::Path;

use crate::api::events::{publish_error, publish_info, publish_success, publish_warning};
use crate::codec;
use crate::csv;
use crate::error::{ExportResult, ImportResult};
use crate::models::CategoryRef;
use crate::upstream::PackagesApi;
use crate::validation::{self, ValidationReport};

/// Outcome of one import attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// Zero usable lines: header only, empty file, or not CSV at all.
    EmptyFile,
    /// Pre-flight validation failed; nothing was persisted.
    Rejected(ValidationReport),
    /// The create loop ran; the report tells which rows made it.
    Completed(ValidationReport),
}

// =============================================================================
// Export
// =============================================================================

/// Fetch all packages and render them as CSV text.
///
/// Returns [`ExportError::NoData`](crate::error::ExportError::NoData) when
/// there is nothing to export, so callers never produce an empty download.
pub async fn export_csv(api: &PackagesApi) -> ExportResult<String> {
    publish_info("Fetching packages for export...");
    let packages = api.list_packages().await?;
    publish_success(format!("Fetched {} packages", packages.len()));

    let rows: Vec<csv::SpreadsheetRow> = packages.iter().map(codec::encode).collect();
    let text = csv::serialize(&rows, &codec::COLUMNS);

    if text.is_empty() {
        publish_warning("No packages to export");
        return Err(crate::error::ExportError::NoData);
    }
    Ok(text)
}

// =============================================================================
// Import
// =============================================================================

/// Run the full import pipeline over CSV text.
///
/// With `dry_run` set, everything up to and including the category check
/// runs but no create call is issued.
pub async fn import_csv(api: &PackagesApi, text: &str, dry_run: bool) -> ImportResult<ImportOutcome> {
    let sheet = csv::parse(text);
    if sheet.rows.is_empty() && sheet.malformed.is_empty() {
        return Ok(ImportOutcome::EmptyFile);
    }
    publish_info(format!("Parsed {} rows", sheet.rows.len()));

    // Phase 1: pure field rules plus malformed lines. Any failure gates the
    // whole batch before a single create call.
    let mut report = validation::validate(&sheet.rows);
    for malformed in &sheet.malformed {
        report.record_malformed(malformed);
    }
    if report.failed > 0 {
        publish_warning(format!("Validation failed. {} rows have errors.", report.failed));
        return Ok(ImportOutcome::Rejected(report));
    }
    publish_success(format!("All {} rows passed validation", report.total));

    // Phase 2: category existence against the freshly fetched list. Rows
    // failing here are marked failed post-hoc; the earlier gate could not
    // know about categories.
    let categories = api.list_categories().await?;
    let category_errors = validation::category_errors(&sheet.rows, &categories);
    let skipped: HashSet<usize> = category_errors.iter().map(|e| e.row).collect();
    for error in category_errors {
        publish_warning(format!("Row {}: {}", error.row, error.message));
        report.mark_failed(error.row, error.field, error.message);
    }

    if dry_run {
        publish_info("Dry run: skipping create calls");
        return Ok(ImportOutcome::Completed(report));
    }

    // Phase 3: sequential creates. A row's failure is recorded and the loop
    // continues; the batch is at-least-effort, not atomic.
    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_no = idx + 2;
        if skipped.contains(&row_no) {
            continue;
        }

        let mut record = codec::decode(row);
        if let CategoryRef::Plain(name) = &record.category {
            if let Some(category) = validation::match_category(&categories, name) {
                record.category = CategoryRef::Full {
                    id: category.id.clone(),
                    name: category.name.clone(),
                };
            }
        }

        match api.create_package(&record).await {
            Ok(()) => publish_success(format!("Row {}: created '{}'", row_no, record.name)),
            Err(e) => {
                publish_error(format!("Row {}: {}", row_no, e));
                report.mark_failed(row_no, "General", e.to_string());
            }
        }
    }

    publish_info(format!(
        "Import completed. {} successful, {} failed",
        report.successful, report.failed
    ));
    Ok(ImportOutcome::Completed(report))
}

/// Read a CSV file (with encoding auto-detection) and import it.
pub async fn import_file(api: &PackagesApi, path: &Path, dry_run: bool) -> ImportResult<ImportOutcome> {
    let text = csv::read_file(path)?;
    import_csv(api, &text, dry_run).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    const HEADER: &str = "Name,Description,Overview,Category,Is Active,Tags";

    fn categories() -> Vec<Category> {
        vec![Category { id: "1".into(), name: "Trekking".into() }]
    }

    #[test]
    fn test_gate_report_includes_malformed_rows() {
        let text = format!("{HEADER}\nTrip,Desc,Over,Trekking,Yes,snow\nhalf,a,row");
        let sheet = csv::parse(&text);
        let mut report = validation::validate(&sheet.rows);
        for m in &sheet.malformed {
            report.record_malformed(m);
        }
        assert_eq!(report.total, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].field, "Row");
    }

    #[test]
    fn test_two_phase_validation_gap() {
        // A row with an unknown category passes the field-rule gate, then
        // fails the category phase.
        let text = format!("{HEADER}\nTrip,Desc,Over,Nonexistent,Yes,snow");
        let sheet = csv::parse(&text);

        let mut report = validation::validate(&sheet.rows);
        assert_eq!(report.failed, 0);

        for e in validation::category_errors(&sheet.rows, &categories()) {
            report.mark_failed(e.row, e.field, e.message);
        }
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].field, "Category");
        assert_eq!(report.successful + report.failed, report.total);
    }

    #[test]
    fn test_valid_batch_decodes_to_real_types() {
        let text = format!(
            "{HEADER}\nTrip A,Desc,Over,Trekking,Yes,\"snow, trek\"\nTrip B,Desc,Over,,No,"
        );
        let sheet = csv::parse(&text);
        let report = validation::validate(&sheet.rows);
        assert_eq!(report.total, 2);
        assert_eq!(report.successful, 2);
        assert!(report.errors.is_empty());

        let first = codec::decode(&sheet.rows[0]);
        assert!(first.is_active);
        assert_eq!(first.tags, vec!["snow", "trek"]);

        let second = codec::decode(&sheet.rows[1]);
        assert!(!second.is_active);
        assert!(second.tags.is_empty());
    }

    #[tokio::test]
    async fn test_import_empty_file() {
        let api = PackagesApi::new("http://localhost:0");
        let outcome = import_csv(&api, "", false).await.unwrap();
        assert_eq!(outcome, ImportOutcome::EmptyFile);

        let header_only = import_csv(&api, HEADER, false).await.unwrap();
        assert_eq!(header_only, ImportOutcome::EmptyFile);
    }

    #[tokio::test]
    async fn test_import_rejected_without_network() {
        // An invalid batch must be rejected before any upstream call, so a
        // dead base URL is never contacted.
        let api = PackagesApi::new("http://localhost:0");
        let text = format!("{HEADER}\n,Desc,Over,Trekking,Yes,snow");
        match import_csv(&api, &text, false).await.unwrap() {
            ImportOutcome::Rejected(report) => {
                assert_eq!(report.failed, 1);
                assert_eq!(report.errors[0].field, "Name");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
