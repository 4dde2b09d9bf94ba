//! Crate-level error type.

use std::io;

use crate::schema::EvolutionConfigError;

/// Errors surfaced by a terrain evolution run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] EvolutionConfigError),
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
