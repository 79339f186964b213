//! services/api/src/web/assistant.rs
//!
//! The `/ai` endpoint: one question in, one markdown answer out.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    /// Free-text question about the Bible.
    #[schema(value_type = String)]
    pub prompt: Option<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

fn invalid_prompt() -> ApiError {
    ApiError::BadRequest("Invalid or missing prompt.".to_string())
}

#[utoipa::path(
    post,
    path = "/ai",
    request_body = AskRequest,
    responses(
        (status = 200, description = "The assistant's answer", body = AskResponse),
        (status = 400, description = "Invalid or missing prompt.", body = ErrorBody),
        (status = 500, description = "Failed to generate a response.", body = ErrorBody)
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Ok(Json(req)) = body else {
        return Err(invalid_prompt());
    };
    let prompt = match req.prompt {
        Some(Value::String(p)) if !p.trim().is_empty() => p,
        _ => return Err(invalid_prompt()),
    };

    let answer = state.assistant.answer(&prompt).await.map_err(|e| {
        error!("Assistant request failed: {}", e);
        ApiError::Internal("Failed to generate a response.".to_string())
    })?;

    Ok(Json(AskResponse { answer }))
}
