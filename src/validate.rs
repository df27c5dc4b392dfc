//! Field validation for pushed readings.
//!
//! Walks the registry once, matching each present value against its
//! field's pattern and coercing it into the field's storage type.

use std::str::FromStr;

use crate::error::PushError;
use crate::models::{FieldSpec, FieldValue, RawReading, StorageType, ValidatedReading};

// ---

/// Treatment of fields missing from a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Absent or empty fields are dropped from the row.
    #[default]
    Tolerant,

    /// A missing required field rejects the whole reading.
    Strict,
}

impl FromStr for FieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tolerant" => Ok(FieldPolicy::Tolerant),
            "strict" => Ok(FieldPolicy::Strict),
            other => Err(format!("unknown field policy '{}'", other)),
        }
    }
}

/// Validate `raw` against `registry`, keeping registry order.
pub fn validate(
    raw: &RawReading,
    registry: &'static [FieldSpec],
    policy: FieldPolicy,
) -> Result<ValidatedReading, PushError> {
    // ---
    let mut fields = Vec::with_capacity(registry.len());

    for spec in registry {
        let value = match raw.get(spec.name) {
            Some(v) if !v.is_empty() => v,
            _ => {
                if policy == FieldPolicy::Strict && spec.required {
                    return Err(PushError::MissingField(spec.name));
                }
                continue;
            }
        };

        if !spec.pattern.is_match(value) {
            return Err(PushError::InvalidField(spec.name));
        }

        fields.push((spec, coerce(spec, value)?));
    }

    if fields.is_empty() {
        return Err(PushError::NoData);
    }

    Ok(ValidatedReading { fields })
}

/// The patterns admit values such as `1.2.3` or 20-digit integers, so the
/// parse can still fail after a match. Decimals that overflow to infinity
/// are rejected too.
fn coerce(spec: &FieldSpec, value: &str) -> Result<FieldValue, PushError> {
    // ---
    let coerced = match spec.storage {
        StorageType::Decimal => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FieldValue::Decimal),
        StorageType::Integer => value.parse::<i32>().ok().map(FieldValue::Integer),
        StorageType::Text => Some(FieldValue::Text(value.to_string())),
    };

    coerced.ok_or(PushError::InvalidField(spec.name))
}
