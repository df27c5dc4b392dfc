//! Shapes a validated reading into a single parameterized insert.
//!
//! The statement carries one column and one placeholder per validated field,
//! so a reading with six fields becomes a six-column insert and the store
//! fills the remaining columns with their defaults.

use crate::error::PushError;
use crate::models::{FieldValue, StorageType, ValidatedReading};

// ---

/// Column list, placeholders and type-tagged arguments for one insert.
///
/// `columns`, `placeholders`, `type_tags` and `args` always have the same,
/// non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub table: String,
    pub columns: Vec<&'static str>,
    pub placeholders: Vec<String>,
    pub type_tags: Vec<StorageType>,
    pub args: Vec<FieldValue>,
}

impl InsertPlan {
    // ---
    /// Build the plan for `validated`, in the order given.
    ///
    /// `table` must come from validated configuration; column names come
    /// from the field registry only.
    pub fn build(validated: ValidatedReading, table: &str) -> Result<Self, PushError> {
        // ---
        if validated.is_empty() {
            return Err(PushError::NoData);
        }

        let len = validated.fields.len();
        let mut plan = InsertPlan {
            table: table.to_string(),
            columns: Vec::with_capacity(len),
            placeholders: Vec::with_capacity(len),
            type_tags: Vec::with_capacity(len),
            args: Vec::with_capacity(len),
        };

        for (index, (spec, value)) in validated.fields.into_iter().enumerate() {
            debug_assert_eq!(value.storage_type(), spec.storage);
            plan.columns.push(spec.name);
            plan.placeholders.push(format!("${}::{}", index + 1, spec.sql_type));
            plan.type_tags.push(spec.storage);
            plan.args.push(value);
        }

        Ok(plan)
    }

    /// Render `INSERT INTO <table> (<columns>) VALUES (<placeholders>)`.
    pub fn sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            self.placeholders.join(", ")
        )
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}
