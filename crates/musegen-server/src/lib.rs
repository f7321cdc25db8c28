//! HTTP surface: `POST /generate` and `GET /health`.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use handlers::GenerationEnvelope;
pub use state::AppState;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use musegen_core::{ConfigError, ServerConfig};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS for the configured frontend origins.
///
/// Credentials are allowed, so methods and headers mirror the preflight
/// request instead of answering with a wildcard.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| ConfigError::Invalid(format!("allowed origin '{origin}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
        ]))
}

/// Creates the API router.
pub fn create_router(state: AppState, server: &ServerConfig) -> Result<Router, ConfigError> {
    Ok(Router::new()
        .route("/generate", post(handlers::generate))
        .route("/health", get(handlers::health))
        .layer(cors_layer(&server.allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on http://{addr}");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_default_origin() {
        let origins = vec!["http://localhost:5173".to_string()];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let origins = vec!["http://bad\norigin".to_string()];
        match cors_layer(&origins) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("allowed origin")),
            _ => panic!("expected Invalid"),
        }
    }
}
