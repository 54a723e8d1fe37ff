// handlers.rs
//! Read-only HTTP view of the lamp. Never mutates device state.

use crate::{docs::ApiDoc, models::DeviceState};
use axum::{Json, Router, extract::State, routing::get};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

pub fn router(snapshots: watch::Receiver<DeviceState>) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/api-doc/openapi.json", get(get_openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(snapshots)
}

pub async fn serve(
    listener: TcpListener,
    snapshots: watch::Receiver<DeviceState>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Status server started");
    }
    axum::serve(listener, router(snapshots)).await
}

/// Latest device state.
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Current lamp state", body = DeviceState))
)]
pub async fn get_status(
    State(snapshots): State<watch::Receiver<DeviceState>>,
) -> Json<DeviceState> {
    Json(snapshots.borrow().clone())
}

async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
