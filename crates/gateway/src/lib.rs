//! HTTP Gateway Library
//!
//! The JSON API over the report services: sign in, then one namespace per
//! role (`/admin`, `/manager`, `/user`) behind token authentication and a
//! role gate.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use report_service_lib::service::ServiceContainer;
use report_service_lib::Runtime;

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Serve the API on top of an already connected runtime (for combined binary).
pub async fn run_embedded(
    runtime: &Runtime,
    config: GatewayConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let services: Arc<dyn ServiceContainer> = runtime.services.clone();
    let state = AppState::new(services, config).with_database(runtime.database.clone());
    serve(state).await
}

/// Bind the configured address and serve until the process stops.
pub async fn serve(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = state.config.addr().parse()?;
    let app = create_router(state);

    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
