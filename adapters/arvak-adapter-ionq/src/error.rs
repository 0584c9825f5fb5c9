//! Error types for the IonQ adapter.

use thiserror::Error;

/// Result type for IonQ operations.
pub type IonqResult<T> = Result<T, IonqError>;

/// Errors that can occur when interacting with IonQ.
#[derive(Debug, Error)]
pub enum IonqError {
    /// HTTP request failed after a connection was made.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No API key passed, in the environment, or in the config file.
    #[error("No IonQ API key provided or found in config file (set IONQ_API_KEY)")]
    MissingApiKey,

    /// The endpoint could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// API returned a non-JSON error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// API returned JSON that does not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// API reported a job status outside the known vocabulary.
    #[error("Unrecognized job status: {0}")]
    UnknownStatus(String),

    /// A debug-mode job id that does not encode a qubit count.
    #[error("Invalid debug job id: {0}")]
    InvalidDebugJobId(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<IonqError> for arvak_hal::HalError {
    fn from(e: IonqError) -> Self {
        use arvak_hal::HalError;

        match e {
            IonqError::MissingApiKey => HalError::AuthenticationFailed(e.to_string()),
            IonqError::ApiError {
                status: 401 | 403, ..
            } => HalError::AuthenticationFailed(e.to_string()),
            IonqError::Connection(msg) => HalError::Connection(msg),
            IonqError::Http(ref err) if err.is_connect() || err.is_timeout() => {
                HalError::Connection(e.to_string())
            }
            IonqError::Json(_)
            | IonqError::MalformedResponse(_)
            | IonqError::UnknownStatus(_)
            | IonqError::InvalidDebugJobId(_) => HalError::Protocol(e.to_string()),
            IonqError::Config(msg) => HalError::Configuration(msg),
            _ => HalError::Backend(e.to_string()),
        }
    }
}
