use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Transport setup error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
