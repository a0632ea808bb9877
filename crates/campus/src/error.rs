//! Campus server error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    /// Custom domain with no campus behind it
    #[error("No campus is mapped to this hostname")]
    TenantNotFound,
    /// Handler ran without the tenant middleware in front of it
    #[error("Tenant context unavailable")]
    ContextMissing,
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for CampusError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            CampusError::TenantNotFound => (StatusCode::NOT_FOUND, "TENANT_NOT_FOUND"),
            CampusError::ContextMissing => (StatusCode::INTERNAL_SERVER_ERROR, "TENANT_CONTEXT_MISSING"),
            CampusError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for campus handlers
pub type CampusResult<T> = Result<T, CampusError>;
