// src/routes/levels.rs
//! Rolling 24-hour pollutant averages for the dashboard.
//!
//! `GET /airfleet/levels` requires the `API-KEY` header. The key is checked
//! before any store access.

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::LevelsError;
use crate::store::{FieldAverage, SharedGateway};
use crate::{registry, Config};

// ---

/// Width of the averaging window, counted back from now.
const WINDOW_HOURS: i64 = 24;

/// One-decimal averages, keyed in dashboard order.
#[derive(Debug, Default, Serialize, PartialEq)]
struct LevelsResponse {
    co2: Option<String>,
    pm1: Option<String>,
    pm25: Option<String>,
    pm4: Option<String>,
    pm10: Option<String>,
}

impl LevelsResponse {
    fn from_averages(averages: &[FieldAverage]) -> Self {
        // ---
        let mut levels = LevelsResponse::default();
        for FieldAverage { field, average } in averages {
            let slot = match *field {
                "co2" => &mut levels.co2,
                "pm1" => &mut levels.pm1,
                "pm25" => &mut levels.pm25,
                "pm4" => &mut levels.pm4,
                "pm10" => &mut levels.pm10,
                _ => continue,
            };
            *slot = average.map(format_level);
        }
        levels
    }
}

/// Fixed-point, one decimal, no grouping: `500` → `"500.0"`.
///
/// Ties round away from zero (`12.25` → `"12.3"`); `{:.1}` alone would
/// round them to even.
fn format_level(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

fn window_start(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::hours(WINDOW_HOURS)
}

fn authorized(headers: &HeaderMap, api_token: &str) -> bool {
    // ---
    headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| !key.is_empty() && key == api_token)
}

pub fn router() -> Router<(SharedGateway, Config)> {
    // ---
    Router::new().route("/airfleet/levels", get(handler))
}

async fn handler(
    headers: HeaderMap,
    State((gateway, config)): State<(SharedGateway, Config)>,
) -> Result<Json<LevelsResponse>, LevelsError> {
    // ---
    if !authorized(&headers, &config.api_token) {
        warn!("GET /airfleet/levels - rejected API key");
        return Err(LevelsError::Forbidden);
    }

    let since = window_start(Utc::now().naive_utc());
    debug!("GET /airfleet/levels - averaging since {}", since);

    let averages = gateway
        .query_averages(&config.table, since, registry::averaged())
        .await
        .map_err(|e| {
            error!("Failed to query levels: {:?}", e);
            LevelsError::from(e)
        })?
        .ok_or_else(|| {
            warn!("No readings since {}", since);
            LevelsError::NoData
        })?;

    let levels = LevelsResponse::from_averages(&averages);
    info!("Levels: {:?}", levels);
    Ok(Json(levels))
}
