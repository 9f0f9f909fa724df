//! HTTP server for the package import/export API.
//!
//! # API Endpoints
//!
//! | Method | Path                   | Description                              |
//! |--------|------------------------|------------------------------------------|
//! | GET    | `/health`              | Health check                             |
//! | GET    | `/api/packages/export` | Download all packages as CSV             |
//! | POST   | `/api/packages/import` | Upload a CSV (multipart field `csvFile`) |
//! | GET    | `/api/events`          | SSE stream of import progress events     |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::events::EVENTS;
use super::types::{error_response, ImportResponse};
use crate::csv;
use crate::error::{ExportError, ImportError};
use crate::pipeline::{self, ImportOutcome};
use crate::upstream::PackagesApi;

/// Start the HTTP server.
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // Permissive CORS for the dashboard dev server
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/packages/export", get(export_packages))
        .route("/api/packages/import", post(import_packages))
        .route("/api/events", get(sse_events))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Packload server running on http://localhost:{}", port);
    println!("   GET  /api/packages/export - Download packages CSV");
    println!("   POST /api/packages/import - Upload packages CSV");
    println!("   GET  /api/events          - SSE event stream");
    println!("   GET  /health              - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "packload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "export": "GET /api/packages/export",
            "import": "POST /api/packages/import",
            "events": "GET /api/events (SSE)"
        }
    }))
}

/// SSE endpoint streaming import progress events.
async fn sse_events() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = EVENTS.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let json = serde_json::to_string(&event).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// CSV export endpoint.
async fn export_packages() -> Response {
    let api = match PackagesApi::from_env() {
        Ok(api) => api,
        Err(e) => {
            eprintln!("❌ Export error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response("Failed to fetch packages")),
            )
                .into_response();
        }
    };

    match pipeline::export_csv(&api).await {
        Ok(text) => {
            let filename = format!("packages_export_{}.csv", Utc::now().format("%Y-%m-%d"));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                text,
            )
                .into_response()
        }
        Err(ExportError::NoData) => (
            StatusCode::NOT_FOUND,
            Json(error_response("No packages to export")),
        )
            .into_response(),
        Err(e) => {
            eprintln!("❌ Export error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response("Failed to fetch packages")),
            )
                .into_response()
        }
    }
}

/// CSV import endpoint. Expects a multipart form with field `csvFile`.
async fn import_packages(mut multipart: Multipart) -> Response {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("csvFile") {
                    file_name = field.file_name().map(|s| s.to_string());
                    match field.bytes().await {
                        Ok(bytes) => file_data = Some(bytes.to_vec()),
                        Err(e) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(error_response(&format!("Read error: {}", e))),
                            )
                                .into_response()
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(error_response(&format!("Multipart error: {}", e))),
                )
                    .into_response()
            }
        }
    }

    let bytes = match file_data {
        Some(bytes) => bytes,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response("No csvFile field provided")),
            )
                .into_response()
        }
    };

    println!(
        "📄 Import upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    );

    let encoding = csv::detect_encoding(&bytes);
    let text = match csv::decode_content(&bytes, &encoding) {
        Ok(text) => text,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(&e.to_string())),
            )
                .into_response()
        }
    };

    let api = match PackagesApi::from_env() {
        Ok(api) => api,
        Err(e) => {
            eprintln!("❌ Import error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&e.to_string())),
            )
                .into_response();
        }
    };

    match pipeline::import_csv(&api, &text, false).await {
        Ok(ImportOutcome::EmptyFile) => (
            StatusCode::BAD_REQUEST,
            Json(error_response("Invalid CSV format or empty file")),
        )
            .into_response(),
        Ok(ImportOutcome::Rejected(report)) => (
            StatusCode::BAD_REQUEST,
            Json(ImportResponse::rejected(report)),
        )
            .into_response(),
        Ok(ImportOutcome::Completed(report)) => {
            (StatusCode::OK, Json(ImportResponse::completed(report))).into_response()
        }
        Err(ImportError::Upstream(e)) => {
            eprintln!("❌ Import error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response("Failed to fetch categories")),
            )
                .into_response()
        }
        Err(e) => {
            eprintln!("❌ Import error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&e.to_string())),
            )
                .into_response()
        }
    }
}
