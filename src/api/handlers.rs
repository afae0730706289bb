//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ExcelError;
use crate::excel::{self, XLSX_CONTENT_TYPE};
use crate::types::{ColumnType, ExcelPayload};

use super::server::AppState;

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Excel Creator API Server".to_string(),
        version: state.version.clone(),
        description: "Generates formatted Excel sheets from JSON rows".to_string(),
        endpoints: vec![
            EndpointInfo::new("GET", "/health", "Health check endpoint"),
            EndpointInfo::new("GET", "/version", "Get server version"),
            EndpointInfo::new("POST", "/api/excel", "Create an Excel file from data and config"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub column_types: Vec<String>,
}

/// GET /version - Server version and supported column types
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        column_types: ColumnType::ALL.iter().map(|t| t.name().to_string()).collect(),
    }))
}

/// POST /api/excel - Create an Excel file from the posted data and config
pub async fn create_excel(Json(payload): Json<ExcelPayload>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let file_name = payload.config.download_name();
    info!(request_id = %request_id, payload = %payload, "creating excel");

    // CPU-bound; keep it off the async workers
    let generated = tokio::task::spawn_blocking(move || excel::create_excel(&payload)).await;

    match generated {
        Ok(Ok(bytes)) => {
            info!(request_id = %request_id, file = %file_name, bytes = bytes.len(), "excel created");
            (
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
                    (header::HeaderName::from_static(REQUEST_ID_HEADER), request_id),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(Err(e)) => error_response(&request_id, &e),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "excel generation task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err("Excel generation failed").with_request_id(request_id)),
            )
                .into_response()
        }
    }
}

/// Status code for a failed generation: the caller's fault or ours
pub fn status_for(err: &ExcelError) -> StatusCode {
    if err.is_config_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(request_id: &str, err: &ExcelError) -> Response {
    let status = status_for(err);
    if status.is_client_error() {
        warn!(request_id = %request_id, error = %err, "rejected excel configuration");
    } else {
        error!(request_id = %request_id, error = %err, "excel export failed");
    }
    (
        status,
        Json(ApiResponse::<()>::err(err.to_string()).with_request_id(request_id)),
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if file_name.is_ascii() && fallback == file_name {
        return format!("attachment; filename=\"{}\"", fallback);
    }

    let encoded: String = file_name
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
