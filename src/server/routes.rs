//! HTTP API route handlers.
//!
//! All endpoints speak JSON. Error bodies are `{"error": "..."}`:
//! bad scan parameters are rejected with 400 before any upstream
//! fetch, pipeline failures surface as a generic 500 with the detail
//! kept in the server log.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::engine::scanner::FlipScanner;
use crate::engine::{verifier, ScanError};
use crate::market::PriceSource;
use crate::names::ItemNameService;
use crate::storage::HiddenItemStore;
use crate::types::{FlipCandidate, VerifiedItem, VerifyItem};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub config: Arc<AppConfig>,
    pub source: Arc<dyn PriceSource>,
    pub scanner: FlipScanner,
    pub names: ItemNameService,
    pub hidden: HiddenItemStore,
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid parameters")]
    InvalidParameters,
    #[error("{public}")]
    Internal {
        public: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidParameters => StatusCode::BAD_REQUEST,
            ApiError::Internal { public, source } => {
                error!(error = %source, public, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Scan & verify
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScanParams {
    pub city: Option<String>,
    pub category: Option<String>,
}

/// GET /api/scan-category?city=&category=
pub async fn scan_category(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
) -> Result<Json<Vec<FlipCandidate>>, ApiError> {
    let (Some(city), Some(category)) = (params.city, params.category) else {
        return Err(ApiError::InvalidParameters);
    };

    let scan_id = Uuid::new_v4();
    info!(%scan_id, city = %city, category = %category, "Scan requested");

    match state.scanner.scan(&city, &category).await {
        Ok(flips) => Ok(Json(flips)),
        Err(ScanError::UnknownCity(_) | ScanError::UnknownCategory(_)) => {
            Err(ApiError::InvalidParameters)
        }
        Err(ScanError::Internal(source)) => Err(ApiError::Internal {
            public: "Failed to scan market",
            source,
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub city: String,
    pub items: Vec<VerifyItem>,
}

/// POST /api/verify-items
pub async fn verify_items(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Vec<VerifiedItem>>, ApiError> {
    info!(city = %req.city, items = req.items.len(), "Verify requested");
    verifier::verify_items(
        &*state.source,
        &req.city,
        req.items,
        state.config.market_data.batch_size,
    )
    .await
    .map(Json)
    .map_err(|source| ApiError::Internal {
        public: "Failed to verify items",
        source,
    })
}

// ---------------------------------------------------------------------------
// Item names
// ---------------------------------------------------------------------------

/// GET /api/item-names
pub async fn item_names(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let names = state.names.names().await.map_err(|source| ApiError::Internal {
        public: "Failed to load item database",
        source,
    })?;
    Ok(Json(names.as_ref().clone()))
}

// ---------------------------------------------------------------------------
// Hidden items
// ---------------------------------------------------------------------------

/// GET /api/hidden-items
pub async fn get_hidden(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.hidden.all().await)
}

/// PUT /api/hidden-items/{key}
pub async fn hide_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.hidden.hide(&key).await.map_err(|source| ApiError::Internal {
        public: "Failed to update hidden items",
        source,
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/hidden-items/{key}
pub async fn unhide_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.hidden.unhide(&key).await.map_err(|source| ApiError::Internal {
        public: "Failed to update hidden items",
        source,
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/hidden-items
pub async fn clear_hidden(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.hidden.clear().await.map_err(|source| ApiError::Internal {
        public: "Failed to update hidden items",
        source,
    })?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
