//! Business logic behind the HTTP handlers
//!
//! Each table gets a submit operation (validate, append one row) and a
//! cached list; `dashboard` derives the summary figures from the current
//! snapshots.

pub mod dashboard;
pub mod tables;

use thiserror::Error;

use crate::error::StoreError;

/// Errors surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
