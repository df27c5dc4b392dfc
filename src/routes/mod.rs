//! HTTP routes gateway (EMBP): merges the per-endpoint subrouters and
//! attaches the shared state.

use axum::Router;

use crate::store::SharedGateway;
use crate::Config;

mod health;
mod levels;
mod push;

// ---

pub fn router(gateway: SharedGateway, config: Config) -> Router {
    // ---
    Router::new()
        .merge(push::router())
        .merge(levels::router())
        .merge(health::router())
        .with_state((gateway, config))
}
