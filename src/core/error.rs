use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Invalid guard config: {0}")]
    InvalidConfig(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Tag parse error: {0}")]
    TagParse(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GuardError>;
