pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use spotbridge_core::Exchange;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Permissive CORS when `origins` is empty, otherwise an explicit allow-list
/// with credentials enabled.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {o}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Build the Axum application router.
pub fn build_router(exchange: Arc<dyn Exchange>, cors: CorsLayer) -> Router {
    let app_state = Arc::new(state::AppState::new(exchange));

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the API server and run until Ctrl+C.
pub async fn start_server(
    exchange: Arc<dyn Exchange>,
    bind_addr: &str,
    cors_origins: &[String],
) -> anyhow::Result<()> {
    let app = build_router(exchange, cors_layer(cors_origins)?);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("API server listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_origins() {
        assert!(cors_layer(&[]).is_ok());
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_bad_origin() {
        let err = cors_layer(&["http://bad\norigin".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
