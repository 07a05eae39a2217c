use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RagInferenceRequest {
    pub query_text: String,
}

#[derive(Debug, Serialize)]
pub struct RagInferenceResponse {
    pub response: String,
}

pub async fn rag_inference(
    State(state): State<AppState>,
    Json(request): Json<RagInferenceRequest>,
) -> Result<Json<RagInferenceResponse>, ApiError> {
    let response = state.rag.answer(&request.query_text).await?;
    Ok(Json(RagInferenceResponse { response }))
}
