//! Error types for the Anvil build core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("no build configuration provided")]
    ConfigMissing,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
