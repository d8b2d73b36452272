//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use bank_types::{AccountResponse, LedgerStore, MutationError, MutationRequest, Role};

use crate::BalanceService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<S: LedgerStore> {
    pub service: BalanceService<S>,
}

/// Wrapper to implement IntoResponse for MutationError (orphan rule workaround).
pub struct ApiError(pub MutationError);

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            MutationError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            MutationError::Unauthorized(_) => (StatusCode::FORBIDDEN, "access denied".to_string()),
            MutationError::InsufficientFunds { .. } => {
                (StatusCode::FORBIDDEN, "Insufficient funds".to_string())
            }
            // Detail already logged inside the mutation span.
            MutationError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Apply a balance mutation for the role attached by the middleware.
pub async fn apply_mutation<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    body: Result<Json<MutationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|e| {
        tracing::info!(error = %e, "Invalid request body");
        MutationError::Validation("invalid JSON".into())
    })?;

    let account = state.service.apply_mutation(req, role.as_str()).await?;
    Ok(Json(AccountResponse::from(account)))
}
