//! In-memory gateway for handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::{FieldAverage, Gateway};
use crate::error::StoreError;
use crate::models::FieldValue;
use crate::InsertPlan;

// ---

pub type Row = Vec<(&'static str, FieldValue)>;

/// Keeps inserted rows in a vector and counts every call made against it.
#[derive(Default)]
pub struct MemoryGateway {
    rows: Mutex<Vec<Row>>,
    executes: AtomicUsize,
    queries: AtomicUsize,
    fail_connect: bool,
}

impl MemoryGateway {
    /// A gateway whose every call fails as if the database were unreachable.
    pub fn unreachable() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, row: Row) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows.lock().unwrap().clone()
    }

    pub fn executes(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check_connect(&self) -> Result<(), StoreError> {
        if self.fail_connect {
            return Err(StoreError::Connect(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn numeric(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Decimal(v) => Some(*v),
        FieldValue::Integer(v) => Some(f64::from(*v)),
        FieldValue::Text(_) => None,
    }
}

fn stamped_since(row: &Row, since: NaiveDateTime) -> bool {
    row.iter().any(|(column, value)| match value {
        FieldValue::Text(t) if *column == "time" => {
            NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S")
                .map(|stamp| stamp >= since)
                .unwrap_or(false)
        }
        _ => false,
    })
}

#[async_trait]
impl Gateway for MemoryGateway {
    // ---
    async fn execute(&self, plan: &InsertPlan) -> Result<u64, StoreError> {
        // ---
        self.executes.fetch_add(1, Ordering::SeqCst);
        self.check_connect()?;

        let row = plan
            .columns
            .iter()
            .copied()
            .zip(plan.args.iter().cloned())
            .collect();
        self.insert(row);
        Ok(1)
    }

    async fn query_averages(
        &self,
        _table: &str,
        since: NaiveDateTime,
        fields: &[&'static str],
    ) -> Result<Option<Vec<FieldAverage>>, StoreError> {
        // ---
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check_connect()?;

        let rows = self.rows.lock().unwrap();
        let window: Vec<&Row> = rows.iter().filter(|r| stamped_since(r, since)).collect();
        if window.is_empty() {
            return Ok(None);
        }

        let averages = fields
            .iter()
            .map(|&field| {
                let values: Vec<f64> = window
                    .iter()
                    .flat_map(|row| row.iter())
                    .filter(|(column, _)| *column == field)
                    .filter_map(|(_, value)| numeric(value))
                    .collect();
                let average = (!values.is_empty())
                    .then(|| values.iter().sum::<f64>() / values.len() as f64);
                FieldAverage { field, average }
            })
            .collect();

        Ok(Some(averages))
    }
}
