// src/routes/health.rs
//! Liveness endpoint for the airfleet ingestion service.
//!
//! `GET /health` answers from memory so orchestrators can probe the process
//! without holding a database connection. Exported to the gateway (`mod.rs`)
//! as a subrouter, following EMBP.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handle `GET /health`. Never touches the store.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Subrouter with the `/health` route, generic over the gateway state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
