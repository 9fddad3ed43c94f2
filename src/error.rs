use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Workflow validation failed: {0}")]
    Validation(String),
    #[error("Invalid connection endpoint: {0}")]
    InvalidConnectionEndpoint(String),
    #[error("Failed to load workflow: {0}")]
    LoadFailure(String),
    #[error("Failed to save workflow: {0}")]
    SaveFailure(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for EditorError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            EditorError::Decode(error.to_string())
        } else if error.is_timeout() {
            EditorError::Request("request timed out".to_string())
        } else if error.is_connect() {
            EditorError::Request("connection failed".to_string())
        } else {
            EditorError::Request(error.to_string())
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
