//! PostgreSQL implementation of the persistence gateway.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{FieldAverage, Gateway};
use crate::error::StoreError;
use crate::models::{FieldValue, StorageType};
use crate::{registry, InsertPlan};

// ---

pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Select list averaging each field as `float8`, plus the row count that
/// tells an empty window apart from one holding zeros.
fn averages_sql(table: &str, fields: &[&str]) -> String {
    // ---
    let averages: Vec<String> = fields
        .iter()
        .map(|f| format!("AVG({f})::float8 AS {f}"))
        .collect();

    format!(
        "SELECT COUNT(*) AS samples, {} FROM {} WHERE time >= $1",
        averages.join(", "),
        table
    )
}

#[async_trait]
impl Gateway for PgGateway {
    // ---
    async fn execute(&self, plan: &InsertPlan) -> Result<u64, StoreError> {
        // ---
        let mut conn = self.pool.acquire().await.map_err(StoreError::Connect)?;

        let sql = plan.sql();
        debug!("Executing: {}", sql);

        let mut query = sqlx::query(&sql);
        for (column, (tag, arg)) in plan.columns.iter().zip(plan.type_tags.iter().zip(&plan.args)) {
            query = match (tag, arg) {
                (StorageType::Decimal, FieldValue::Decimal(v)) => query.bind(*v),
                (StorageType::Integer, FieldValue::Integer(v)) => query.bind(*v),
                (StorageType::Text, FieldValue::Text(s)) => query.bind(s.as_str()),
                _ => {
                    let reason = format!("{column}: {arg:?} does not match tag {tag:?}");
                    return Err(StoreError::Bind(sqlx::Error::Encode(reason.into())));
                }
            };
        }

        let result = query
            .execute(&mut *conn)
            .await
            .map_err(StoreError::classify)?;

        Ok(result.rows_affected())
    }

    async fn query_averages(
        &self,
        table: &str,
        since: NaiveDateTime,
        fields: &[&'static str],
    ) -> Result<Option<Vec<FieldAverage>>, StoreError> {
        // ---
        // Column names are spliced into the statement text
        let fields: Vec<&'static str> = fields
            .iter()
            .copied()
            .filter(|f| registry::lookup(f).is_some())
            .collect();

        let mut conn = self.pool.acquire().await.map_err(StoreError::Connect)?;

        let sql = averages_sql(table, &fields);
        debug!("Executing: {} [since {}]", sql, since);

        let row = sqlx::query(&sql)
            .bind(since)
            .fetch_one(&mut *conn)
            .await
            .map_err(StoreError::classify)?;

        let samples: i64 = row.try_get("samples").map_err(StoreError::Exec)?;
        if samples == 0 {
            return Ok(None);
        }

        let averages = fields
            .iter()
            .map(|&field| {
                let average: Option<f64> = row.try_get(field).map_err(StoreError::Exec)?;
                Ok(FieldAverage { field, average })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Some(averages))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_averages_sql() {
        // ---
        let sql = averages_sql("airfleet_log", &["co2", "pm1"]);
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS samples, AVG(co2)::float8 AS co2, AVG(pm1)::float8 AS pm1 \
             FROM airfleet_log WHERE time >= $1"
        );
    }
}
