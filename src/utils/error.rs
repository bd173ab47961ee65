use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenGinError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid payload: {message}")]
    InvalidPayloadError { message: String },

    #[error("OpenGIN API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Decode error: {message}")]
    DecodeError { message: String },
}

impl OpenGinError {
    pub fn decode(message: impl Into<String>) -> Self {
        OpenGinError::DecodeError {
            message: message.into(),
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        OpenGinError::InvalidPayloadError {
            message: message.into(),
        }
    }

    /// True for errors caused by local configuration rather than the remote service.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            OpenGinError::ConfigError { .. }
                | OpenGinError::MissingConfigError { .. }
                | OpenGinError::InvalidConfigValueError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, OpenGinError>;
