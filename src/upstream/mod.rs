//! HTTP client for the external package persistence API.
//!
//! Thin reqwest wrapper over the three endpoints the pipeline consumes:
//! package listing, package creation, and the category list. Every response
//! is the uniform `{success, data, message}` envelope; `success: false` is
//! surfaced as [`UpstreamError::Api`]. There is no retry: a single failure
//! surfaces immediately, batch-level for fetches and row-level for creates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use packload::upstream::PackagesApi;
//!
//! let api = PackagesApi::from_env()?;
//! let packages = api.list_packages().await?;
//! ```

use std::env;

use reqwest::multipart::Form;
use serde_json::Value;

use crate::error::{UpstreamError, UpstreamResult};
use crate::models::{ApiEnvelope, Category, PackageRecord};

/// Environment variable naming the external API base URL.
pub const API_URL_VAR: &str = "PACKLOAD_API_URL";

/// Client for the external package/category REST API.
#[derive(Debug, Clone)]
pub struct PackagesApi {
    base_url: String,
    http: reqwest::Client,
}

impl PackagesApi {
    /// Create a client with an explicit base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from the `PACKLOAD_API_URL` environment variable.
    pub fn from_env() -> UpstreamResult<Self> {
        // Pick up .env if present
        let _ = dotenvy::dotenv();

        let base_url = env::var(API_URL_VAR).map_err(|_| UpstreamError::MissingBaseUrl)?;
        Ok(Self::new(base_url))
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all packages.
    pub async fn list_packages(&self) -> UpstreamResult<Vec<PackageRecord>> {
        let envelope: ApiEnvelope<Vec<PackageRecord>> = self
            .http
            .get(format!("{}/packages", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data("package list")
    }

    /// Fetch the category list used to resolve spreadsheet Category cells.
    pub async fn list_categories(&self) -> UpstreamResult<Vec<Category>> {
        let envelope: ApiEnvelope<Vec<Category>> = self
            .http
            .get(format!("{}/categories", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data("category list")
    }

    /// Create one package via the multipart create endpoint.
    pub async fn create_package(&self, record: &PackageRecord) -> UpstreamResult<()> {
        let mut form = Form::new();
        for (key, value) in payload_fields(record)? {
            form = form.text(key, value);
        }

        let envelope: ApiEnvelope<Value> = self
            .http
            .post(format!("{}/packages", self.base_url))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        if envelope.success {
            Ok(())
        } else {
            Err(UpstreamError::Api(
                envelope
                    .message
                    .unwrap_or_else(|| "package create failed".into()),
            ))
        }
    }
}

/// Flatten a record into multipart text fields.
///
/// Scalars go through as plain text (booleans as "true"/"false"), lists and
/// objects as JSON strings, nulls are omitted. The create endpoint accepts
/// the same field names as its JSON body, so the camelCase serde names are
/// reused directly.
pub fn payload_fields(record: &PackageRecord) -> UpstreamResult<Vec<(String, String)>> {
    let value = serde_json::to_value(record)?;
    let object = match value {
        Value::Object(map) => map,
        // PackageRecord always serializes as an object
        _ => return Ok(Vec::new()),
    };

    let mut fields = Vec::with_capacity(object.len());
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => serde_json::to_string(&other)?,
        };
        fields.push((key, text));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRef;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let api = PackagesApi::new("http://localhost:5000/api/");
        assert_eq!(api.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn test_payload_scalars_and_lists() {
        let record = PackageRecord {
            name: "Manali Escape".into(),
            is_active: true,
            rating: 4.5,
            tags: vec!["snow".into(), "trek".into()],
            category: CategoryRef::Full { id: "64fa12".into(), name: "Trekking".into() },
            ..PackageRecord::default()
        };
        let fields = payload_fields(&record).unwrap();
        let get = |k: &str| {
            fields
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("name"), Some("Manali Escape"));
        assert_eq!(get("isActive"), Some("true"));
        assert_eq!(get("rating"), Some("4.5"));
        assert_eq!(get("tags"), Some(r#"["snow","trek"]"#));
        assert_eq!(get("category"), Some(r#"{"_id":"64fa12","name":"Trekking"}"#));
    }

    #[test]
    fn test_payload_omits_nulls() {
        let record = PackageRecord::default();
        let fields = payload_fields(&record).unwrap();
        // pdf is None and trekInfo defaults to null; neither becomes a field
        assert!(fields.iter().all(|(k, _)| k != "pdf" && k != "trekInfo"));
    }
}
