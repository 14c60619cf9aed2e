//! Error types for grid configuration and boundary conversions
//!
//! Validation failures inside the grid are never errors: they are reported as
//! `ValidationError` data. `GridError` only covers inputs rejected at the edge
//! of the crate (bad column schemas, unreadable config, unknown record keys).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("column at position {0} has an empty id")]
    EmptyColumnId(usize),

    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    #[error("dropdown column '{0}' declares no options")]
    MissingOptions(String),

    #[error("invalid pattern for column '{column}': {source}")]
    InvalidPattern {
        column: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown field '{0}' (not declared by the column schema)")]
    UnknownField(String),

    #[error("minRows must be at least 1")]
    ZeroMinRows,

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
