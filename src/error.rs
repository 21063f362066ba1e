use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResamplerError {
    #[error("Invalid filter geometry: {0}")]
    InvalidFilterGeometry(String),

    #[error("Unsupported window type: {0}")]
    UnsupportedWindowType(String),

    #[error("Numeric instability: {0}")]
    NumericInstability(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filter serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResamplerError>;
