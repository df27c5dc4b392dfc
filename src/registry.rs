//! The closed set of reading fields the push endpoint accepts.
//!
//! Registry order is the canonical column order of every generated insert
//! statement and of the bootstrap table definition.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FieldSpec, StorageType};

// ---

const DECIMAL: &str = r"^[0-9.]+$";
const INTEGER: &str = r"^[0-9]+$";
const TIMESTAMP: &str = r"^20[0-9]{2}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$";

/// Pollutant fields averaged by the levels endpoint, in response order.
const AVERAGED: [&str; 5] = ["co2", "pm1", "pm25", "pm4", "pm10"];

static REGISTRY: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        decimal("pm1"),
        decimal("pm25"),
        decimal("pm4"),
        decimal("pm10"),
        decimal("temp"),
        decimal("humi"),
        integer("voc"),
        integer("co2"),
        decimal("lat"),
        decimal("lng"),
        FieldSpec {
            name: "time",
            pattern: compile(TIMESTAMP),
            storage: StorageType::Text,
            sql_type: "timestamp",
            required: true,
        },
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("registry patterns are valid regular expressions")
}

fn decimal(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        pattern: compile(DECIMAL),
        storage: StorageType::Decimal,
        sql_type: "double precision",
        required: true,
    }
}

/// VOC and CO2 read zero or nothing while the gas sensor warms up.
fn integer(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        pattern: compile(INTEGER),
        storage: StorageType::Integer,
        sql_type: "integer",
        required: false,
    }
}

/// All recognized fields, in canonical order.
pub fn entries() -> &'static [FieldSpec] {
    &REGISTRY
}

pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    entries().iter().find(|spec| spec.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    entries().iter().map(|spec| spec.name)
}

/// Fields reported by the levels endpoint.
pub fn averaged() -> &'static [&'static str] {
    &AVERAGED
}
