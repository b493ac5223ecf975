use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlacklineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlacklineError {
    /// Short, stable error code suitable for logs and exit diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            SlacklineError::Config(_) => "CONFIG_ERROR",
            SlacklineError::Serialization(_) => "SERIALIZATION_ERROR",
            SlacklineError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SlacklineError>;
