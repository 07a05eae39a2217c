pub mod documents;
pub mod health;
pub mod rag;

use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);
    let static_dir = state.config.config.server.static_dir.clone();

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/rag_inference", post(rag::rag_inference))
        .route("/documents", post(documents::create_documents));

    let router = if static_dir.is_dir() {
        router.fallback_service(ServeDir::new(static_dir))
    } else {
        tracing::warn!(path = %static_dir.display(), "static directory missing, chat UI disabled");
        router
    };

    router
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}
