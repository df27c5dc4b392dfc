// src/routes/push.rs
//! Sensor push endpoint.
//!
//! `POST /airfleet/push` takes the double-encoded reading envelope, runs it
//! through validation and the insert planner, and writes one row. The reply
//! is always plain text: `OK`, or the reason the reading was refused.

use axum::{body::Bytes, extract::State, routing::post, Router};
use tracing::{debug, error, info, warn};

use crate::error::PushError;
use crate::store::{Gateway, SharedGateway};
use crate::{registry, validate, Config, InsertPlan, RawReading};

// ---

pub fn router() -> Router<(SharedGateway, Config)> {
    // ---
    Router::new().route("/airfleet/push", post(handler))
}

async fn handler(
    State((gateway, config)): State<(SharedGateway, Config)>,
    body: Bytes,
) -> String {
    // ---
    debug!("POST /airfleet/push - {} bytes", body.len());

    match ingest(gateway.as_ref(), &config, &body).await {
        Ok(rows) => {
            info!("Stored reading ({} row)", rows);
            "OK".to_string()
        }
        Err(e @ PushError::Store(_)) => {
            error!("Failed to store reading: {:?}", e);
            e.to_string()
        }
        Err(e) => {
            warn!("Rejected reading: {}", e);
            e.to_string()
        }
    }
}

/// Envelope → validation → plan → store, stopping at the first failure.
async fn ingest(gateway: &dyn Gateway, config: &Config, body: &[u8]) -> Result<u64, PushError> {
    // ---
    let raw = RawReading::from_envelope(body)?;
    debug!("Decoded reading with {} keys", raw.len());

    let validated = validate(&raw, registry::entries(), config.field_policy)?;
    debug!(
        "Validated fields: {}",
        validated.names().collect::<Vec<_>>().join(",")
    );

    let plan = InsertPlan::build(validated, &config.table)?;
    debug!("Insert plan with {} columns", plan.len());
    Ok(gateway.execute(&plan).await?)
}
