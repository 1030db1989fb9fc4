//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod departments;
mod drafts;
mod templates;

pub use departments::*;
pub use drafts::*;
pub use templates::*;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Header identifying the editing client; draft state is kept per client.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError) -> ApiResult<T> {
    Err(err)
}

/// Extract and validate the client ID header. The value names the client's
/// local state file, so only a conservative character set is accepted.
pub fn client_id(headers: &HeaderMap) -> Result<String, AppError> {
    let id = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if id.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing {} header",
            CLIENT_ID_HEADER
        )));
    }
    if id.len() > 64
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(format!(
            "Invalid {} header",
            CLIENT_ID_HEADER
        )));
    }

    Ok(id.to_string())
}
