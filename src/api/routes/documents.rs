use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateDocumentsRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreateDocumentsResponse {
    pub documents_added: usize,
    pub total_documents: usize,
}

pub async fn create_documents(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentsRequest>,
) -> Result<Json<CreateDocumentsResponse>, ApiError> {
    let documents_added = state.rag.ingest(&request.content).await?;
    Ok(Json(CreateDocumentsResponse {
        documents_added,
        total_documents: state.rag.store().len(),
    }))
}
