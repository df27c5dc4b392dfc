//! Persistence gateway used by the request handlers.
//!
//! Handlers only see the [`Gateway`] trait; the PostgreSQL pool, connection
//! handling and error classification live behind it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::InsertPlan;

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgGateway;

// ---

/// Shared handle stored in the router state.
pub type SharedGateway = Arc<dyn Gateway>;

/// Mean of one column over the queried window; `None` when the column held
/// no values in that window.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAverage {
    pub field: &'static str,
    pub average: Option<f64>,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Execute one planned insert, returning the number of rows written.
    async fn execute(&self, plan: &InsertPlan) -> Result<u64, StoreError>;

    /// Average `fields` over rows of `table` stamped at or after `since`.
    ///
    /// Returns `None` when no row falls inside the window.
    async fn query_averages(
        &self,
        table: &str,
        since: NaiveDateTime,
        fields: &[&'static str],
    ) -> Result<Option<Vec<FieldAverage>>, StoreError>;
}
