//! Domain models for the package import/export pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`PackageRecord`] - A travel package as consumed/produced by the external API
//! - [`CategoryRef`] - A package's category, either a bare name or a full object
//! - [`Category`] - One entry of the externally fetched category list
//! - [`ApiEnvelope`] - The uniform `{success, data, message}` response wrapper

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UpstreamError;

// =============================================================================
// Category Reference
// =============================================================================

/// A package's category as stored upstream.
///
/// The external API is loose here: listings may return the category as a
/// populated `{_id, name}` object or as a bare name/id string. Both shapes
/// deserialize transparently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryRef {
    /// Populated category object.
    Full {
        #[serde(rename = "_id")]
        id: String,
        name: String,
    },
    /// Bare name or id string.
    Plain(String),
}

impl Default for CategoryRef {
    fn default() -> Self {
        CategoryRef::Plain(String::new())
    }
}

impl CategoryRef {
    /// The human-readable name: the object's `name` if populated,
    /// otherwise the raw string.
    pub fn display_name(&self) -> &str {
        match self {
            CategoryRef::Full { name, .. } => name,
            CategoryRef::Plain(value) => value,
        }
    }

    /// True when no category is set.
    pub fn is_empty(&self) -> bool {
        self.display_name().trim().is_empty()
    }
}

// =============================================================================
// Package Record
// =============================================================================

/// A travel package in the structured form the external persistence API
/// consumes and produces.
///
/// The CSV path only ever populates the flat subset (strings, booleans,
/// numbers, tag/label lists). The structural fields at the bottom cannot be
/// expressed in a spreadsheet and are always reset to their empty shape on
/// decode; they are edited later through the form UI. This is a documented
/// limitation of the CSV format, not something the codec tries to work around.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageRecord {
    pub name: String,
    pub description: String,
    pub overview: String,
    pub duration: String,
    /// Prices travel as decimal text, exactly as stored upstream.
    pub original_price: String,
    pub offer_price: String,
    pub advance_payment: String,
    pub city: String,
    pub state: String,
    pub region: String,
    pub category: CategoryRef,
    pub max_participants: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_trending: bool,
    /// ISO date string, empty when unset. No format is enforced.
    pub start_date: String,
    pub end_date: String,
    pub trip_type: String,
    pub season: String,
    pub rating: f64,
    pub views: i64,
    pub bookings_count: i64,
    /// Order-preserving, duplicates allowed.
    pub tags: Vec<String>,
    pub labels: Vec<String>,
    pub standout_reason: String,
    pub trending_score: f64,

    // Structural fields the CSV format cannot express. Always defaulted on
    // CSV decode; populated only through the form UI.
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub itinerary: Vec<Value>,
    pub images: Vec<Value>,
    pub batch_dates: Vec<Value>,
    pub additional_services: Vec<Value>,
    pub faq: Vec<Value>,
    pub what_to_carry: Vec<String>,
    pub trek_info: Value,
    pub how_to_reach: String,
    pub fitness_required: String,
    pub cancellation_policy: String,
    pub pdf: Option<String>,
    pub assigned_guides: Vec<Value>,
    pub more_like_this: Vec<String>,
}

// =============================================================================
// Category
// =============================================================================

/// One entry of the external category list (`GET /categories`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

// =============================================================================
// API Envelope
// =============================================================================

/// The external REST API's uniform response shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, turning `success: false` or a missing `data`
    /// field into an [`UpstreamError::Api`].
    pub fn into_data(self, what: &str) -> Result<T, UpstreamError> {
        if !self.success {
            return Err(UpstreamError::Api(
                self.message
                    .unwrap_or_else(|| format!("{what} request failed")),
            ));
        }
        self.data
            .ok_or_else(|| UpstreamError::Api(format!("{what} response had no data")))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_ref_deserializes_both_shapes() {
        let full: CategoryRef =
            serde_json::from_value(json!({ "_id": "abc123", "name": "Trekking" })).unwrap();
        assert_eq!(full.display_name(), "Trekking");

        let plain: CategoryRef = serde_json::from_value(json!("Trekking")).unwrap();
        assert_eq!(plain, CategoryRef::Plain("Trekking".into()));
    }

    #[test]
    fn test_category_ref_empty() {
        assert!(CategoryRef::default().is_empty());
        assert!(CategoryRef::Plain("  ".into()).is_empty());
        assert!(!CategoryRef::Plain("Beach".into()).is_empty());
    }

    #[test]
    fn test_package_record_defaults_on_partial_json() {
        let record: PackageRecord =
            serde_json::from_value(json!({ "name": "Manali Escape", "isActive": true })).unwrap();
        assert_eq!(record.name, "Manali Escape");
        assert!(record.is_active);
        assert!(!record.is_featured);
        assert_eq!(record.rating, 0.0);
        assert!(record.tags.is_empty());
        assert!(record.itinerary.is_empty());
        assert!(record.trek_info.is_null());
    }

    #[test]
    fn test_envelope_into_data() {
        let ok: ApiEnvelope<Vec<u32>> =
            serde_json::from_value(json!({ "success": true, "data": [1, 2] })).unwrap();
        assert_eq!(ok.into_data("test").unwrap(), vec![1, 2]);

        let failed: ApiEnvelope<Vec<u32>> =
            serde_json::from_value(json!({ "success": false, "message": "boom" })).unwrap();
        let err = failed.into_data("test").unwrap_err();
        assert!(err.to_string().contains("boom"));

        let no_data: ApiEnvelope<Vec<u32>> =
            serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(no_data.into_data("test").is_err());
    }
}
