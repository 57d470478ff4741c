//! Error types for Floodwatch services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FloodError>;

#[derive(Error, Debug)]
pub enum FloodError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<std::io::Error> for FloodError {
    fn from(err: std::io::Error) -> Self {
        FloodError::Network(err.to_string())
    }
}
