//! Domain-level errors

use thiserror::Error;

use crate::domain::{Id, Level};

/// Domain errors represent lookups and data that do not fit the model.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{level} not found: {id}")]
    NotFound { level: Level, id: Id },

    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    #[error("invalid dataset: {message}")]
    InvalidDataset {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl DomainError {
    pub fn not_found(level: Level, id: Id) -> Self {
        Self::NotFound { level, id }
    }
}
