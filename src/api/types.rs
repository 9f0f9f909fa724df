//! REST API types for the dashboard frontend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::validation::ValidationReport;

/// Body of an import response, both for the 400 validation rejection and
/// the 200 completion. The two are told apart by status code and message;
/// a rejection means zero rows were persisted, a completion with
/// `failed > 0` means partial persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub results: ValidationReport,
}

impl ImportResponse {
    /// 400 body for a batch stopped at the validation gate.
    pub fn rejected(results: ValidationReport) -> Self {
        Self {
            success: false,
            message: format!("Validation failed. {} rows have errors.", results.failed),
            results,
        }
    }

    /// 200 body after the create loop ran.
    pub fn completed(results: ValidationReport) -> Self {
        Self {
            success: results.failed == 0,
            message: format!(
                "Import completed. {} successful, {} failed",
                results.successful, results.failed
            ),
            results,
        }
    }
}

/// Plain `{error}` body for batch-level failures.
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RowError;

    #[test]
    fn test_rejected_message() {
        let report = ValidationReport {
            total: 3,
            successful: 1,
            failed: 2,
            errors: vec![RowError { row: 2, field: "Name".into(), message: "Name is required".into() }],
        };
        let response = ImportResponse::rejected(report);
        assert!(!response.success);
        assert_eq!(response.message, "Validation failed. 2 rows have errors.");
    }

    #[test]
    fn test_completed_success_tracks_failed_count() {
        let clean = ImportResponse::completed(ValidationReport {
            total: 2,
            successful: 2,
            ..ValidationReport::default()
        });
        assert!(clean.success);
        assert_eq!(clean.message, "Import completed. 2 successful, 0 failed");

        let partial = ImportResponse::completed(ValidationReport {
            total: 2,
            successful: 1,
            failed: 1,
            ..ValidationReport::default()
        });
        assert!(!partial.success);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let response = ImportResponse::completed(ValidationReport::default());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["results"]["successful"].is_u64());
        assert!(json["results"]["errors"].is_array());
    }
}
