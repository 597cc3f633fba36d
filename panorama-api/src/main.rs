//! Panorama API Server Entry Point
//!
//! Bootstraps configuration and starts the Axum HTTP server.

use std::net::SocketAddr;

use axum::Router;
use panorama_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();
    let state = AppState::new(&config, auth_config);

    let app: Router = create_api_router(state);

    let addr = resolve_bind_addr(&config)?;
    tracing::info!(%addr, "Starting Panorama API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.bind_port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
