use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    #[serde(rename = "status message")]
    pub status_message: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status_message: "Server is up.".into(),
    })
}
