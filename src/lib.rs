//! # Packload - CSV import/export for travel package administration
//!
//! Packload moves travel packages between the external persistence API and
//! human-editable spreadsheets: exports render every package as one flat CSV
//! row, imports validate an uploaded sheet row by row before anything is
//! persisted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│  Transport  │────▶│  Validator  │────▶│  Row Codec  │
//! │  (uploaded) │     │ (tokenizer) │     │ (batch gate)│     │ (row⇄record)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                                     one create call per row
//!                                                                    ▼
//!                                                          external package API
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use packload::{import_csv, upstream::PackagesApi};
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = PackagesApi::from_env().unwrap();
//!     let outcome = import_csv(&api, csv_text, false).await.unwrap();
//!     println!("{outcome:?}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (PackageRecord, Category, ApiEnvelope)
//! - [`csv`] - Quote-aware CSV tokenizer/serializer and file decoding
//! - [`codec`] - Row ⇄ record mapping and the canonical column set
//! - [`validation`] - Pure row-level validation rules and reports
//! - [`upstream`] - Client for the external package/category API
//! - [`pipeline`] - Import/export orchestration
//! - [`api`] - HTTP server, response types, SSE event stream

// Core modules
pub mod error;
pub mod models;

// CSV transport
pub mod csv;

// Row codec
pub mod codec;

// Validation
pub mod validation;

// External API client
pub mod upstream;

// Orchestration
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, ExportError, ImportError, UpstreamError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ApiEnvelope, Category, CategoryRef, PackageRecord};

// =============================================================================
// Re-exports - CSV transport
// =============================================================================

pub use csv::{
    decode_content, detect_encoding, escape_field, parse, read_file, serialize, split_line,
    MalformedRow, ParsedSheet, SpreadsheetRow,
};

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use codec::{decode, encode, COLUMNS};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    category_errors, match_category, validate, RowError, ValidationReport, BOOLEAN_FIELDS,
    NUMERIC_FIELDS, REQUIRED_FIELDS,
};

// =============================================================================
// Re-exports - Upstream
// =============================================================================

pub use upstream::{payload_fields, PackagesApi};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{export_csv, import_csv, import_file, ImportOutcome};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ImportResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
