use axum::{routing::get, Router};

use crate::state::AppState;

pub mod docs;
pub mod geocode;
pub mod health;
pub mod weather;

/// Versioned API routes plus the unversioned health and docs endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/docs.json", get(docs::openapi_document))
        .nest("/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(weather::get_weather))
        .route("/geocode", get(geocode::get_geocode))
        .route("/reverse-geocode", get(geocode::get_reverse_geocode))
}
