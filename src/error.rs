use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Missing column in record: {column}")]
    MissingColumn { column: String },

    #[error("Feature shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    pub fn artifact_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_artifact(msg: impl Into<String>) -> Self {
        Self::InvalidArtifact(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn chart(msg: impl ToString) -> Self {
        Self::Chart(msg.to_string())
    }

    /// True for failures caused by the caller's input rather than the model.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
