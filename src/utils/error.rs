use config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Malformed amount in field '{field}': {value:?}")]
    MalformedAmountError { field: &'static str, value: String },
    #[error("Address error: {0}")]
    AddressError(String),
    #[error("Unknown coin: {0}")]
    UnknownCoin(u32),
}

impl AppError {
    pub fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        AppError::MalformedAmountError {
            field,
            value: value.into(),
        }
    }

    /// Errors scoped to a single record. The rest of the page is still usable.
    pub fn is_record_level(&self) -> bool {
        matches!(self, AppError::MalformedAmountError { .. })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::DecodeError(e.to_string())
    }
}

pub type AtlasResult<T> = Result<T, AppError>;
