//! Error types for the push and levels endpoints.
//!
//! The `Display` text of each request error is the exact body written back
//! to the client, so sensors and dashboards can tell failures apart without
//! a structured error document.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// ---

/// Which layer of the double-encoded push body failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeLayer {
    Outer,
    Inner,
}

impl fmt::Display for EnvelopeLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeLayer::Outer => f.write_str("Unable to parse JSON"),
            EnvelopeLayer::Inner => f.write_str("Unable to parse data"),
        }
    }
}

/// Store failures, classified by the stage at which the statement failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connect failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("prepare failed: {0}")]
    Prepare(#[source] sqlx::Error),

    #[error("bind failed: {0}")]
    Bind(#[source] sqlx::Error),

    #[error("execute failed: {0}")]
    Exec(#[source] sqlx::Error),
}

impl StoreError {
    /// Numeric stage code reported to push clients as `DB error <code>`.
    pub fn code(&self) -> u8 {
        match self {
            StoreError::Connect(_) => 1,
            StoreError::Prepare(_) => 2,
            StoreError::Bind(_) => 3,
            StoreError::Exec(_) => 4,
        }
    }

    /// Split a sqlx error into the stage that produced it.
    ///
    /// Pool and transport errors mean no connection was obtained; SQL-state
    /// class `42` (syntax error or undefined object) is reported by the
    /// server while preparing; encode failures happen while binding.
    pub fn classify(err: sqlx::Error) -> Self {
        // ---
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => StoreError::Connect(err),
            sqlx::Error::Encode(_) => StoreError::Bind(err),
            sqlx::Error::Database(db) if db.code().is_some_and(|c| c.starts_with("42")) => {
                StoreError::Prepare(err)
            }
            _ => StoreError::Exec(err),
        }
    }
}

/// Terminal failure of a push request.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("{0}")]
    Envelope(EnvelopeLayer),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid data in field: {0}")]
    InvalidField(&'static str),

    #[error("No data")]
    NoData,

    #[error("DB error {}", StoreError::code(.0))]
    Store(#[from] StoreError),
}

/// Terminal failure of a levels request.
#[derive(Error, Debug)]
pub enum LevelsError {
    #[error("Forbidden")]
    Forbidden,

    #[error("DB error {}", levels_code(.0))]
    Store(#[from] StoreError),

    #[error("DB error 3")]
    NoData,
}

/// The levels query has no separate bind step, so anything past connecting
/// is reported as a query failure.
fn levels_code(err: &StoreError) -> u8 {
    match err {
        StoreError::Connect(_) => 1,
        _ => 2,
    }
}

impl IntoResponse for LevelsError {
    fn into_response(self) -> Response {
        // ---
        let status = match self {
            LevelsError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::OK,
        };
        (status, self.to_string()).into_response()
    }
}
