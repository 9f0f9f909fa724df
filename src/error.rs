//! Error types for the package import/export pipeline.
//!
//! This module defines one error enum per concern:
//!
//! - [`CsvError`] - reading/decoding a CSV file
//! - [`UpstreamError`] - talking to the external package API
//! - [`ExportError`] - export pipeline failures
//! - [`ImportError`] - import pipeline failures
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! error boundaries. Row-level validation findings are never errors: they are
//! collected into a `ValidationReport` and returned as data.

use thiserror::Error;

// =============================================================================
// CSV File Errors
// =============================================================================

/// Errors reading or decoding a CSV file.
///
/// Note that parsing itself never fails: malformed quoting is consumed
/// best-effort and wrong-width rows are collected, not thrown.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the raw bytes into text.
    #[error("Failed to decode file content: {0}")]
    Encoding(String),
}

// =============================================================================
// Upstream API Errors
// =============================================================================

/// Errors from the external package/category REST API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Base URL not configured.
    #[error("PACKLOAD_API_URL environment variable is not set")]
    MissingBaseUrl,

    /// Network or HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `success: false` or an unusable body.
    #[error("API error: {0}")]
    Api(String),

    /// Failed to encode the request payload.
    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors from the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Fetching the package list failed.
    #[error("Failed to fetch packages: {0}")]
    Upstream(#[from] UpstreamError),

    /// Nothing to export; callers must not produce an empty download.
    #[error("No packages to export")]
    NoData,
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors from the import pipeline.
///
/// These are batch-level failures only. Per-row create failures are
/// downgraded to row-level "General" entries in the report and never
/// abort the batch.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Reading/decoding the input file failed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Fetching the category list failed.
    #[error("Failed to fetch categories: {0}")]
    Upstream(#[from] UpstreamError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV file operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for upstream API calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> ImportError
        let csv_err = CsvError::Encoding("bad bytes".into());
        let import_err: ImportError = csv_err.into();
        assert!(import_err.to_string().contains("bad bytes"));

        // UpstreamError -> ExportError
        let upstream_err = UpstreamError::Api("listing failed".into());
        let export_err: ExportError = upstream_err.into();
        assert!(export_err.to_string().contains("listing failed"));
    }

    #[test]
    fn test_no_data_message() {
        assert_eq!(ExportError::NoData.to_string(), "No packages to export");
    }
}
