//! HTTP surface for wxgate
//!
//! axum router exposing `/v1/weather`, `/v1/geocode`, `/v1/reverse-geocode`,
//! `/health` and `/docs.json`, wrapped in tracing, CORS, security-header and
//! rate-limit layers.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::ApiError;
pub use state::AppState;
pub use validation::FieldErrors;

/// How often idle clients are dropped from the rate limiter.
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application with all routes and middleware
pub fn build_app(state: AppState) -> Router {
    let rate_limit =
        axum::middleware::from_fn_with_state(state.clone(), middleware::rate_limit);

    let app = routes::create_router(state).layer(rate_limit);
    middleware::security_headers(app)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` resolves. Client addresses are exposed to the rate limiter.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Weather API listening on http://{}", addr);
    }

    let limiter = state.rate_limiter.clone();
    let pruner = tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            limiter.prune();
            tracing::trace!(clients = limiter.tracked_clients(), "pruned rate limiter");
        }
    });

    let result = axum::serve(
        listener,
        build_app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;
    pruner.abort();
    result?;

    tracing::info!("Weather API stopped");
    Ok(())
}
