//! Error types for GrOntoPI core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrontopiError {
    #[error("Schema source not found: {0}")]
    SchemaNotFound(String),

    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream query endpoint failure: {0}")]
    Upstream(String),

    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    #[error("Invalid language tag: {0}")]
    InvalidLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GrontopiError {
    /// True when the failure came from the remote endpoint rather than from
    /// the request itself.
    pub fn is_upstream(&self) -> bool {
        matches!(self, GrontopiError::Upstream(_))
    }
}

impl From<reqwest::Error> for GrontopiError {
    fn from(err: reqwest::Error) -> Self {
        GrontopiError::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GrontopiError>;
