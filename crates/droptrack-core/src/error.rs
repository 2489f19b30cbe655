use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Reassembly buffer overflow: {buffered} bytes buffered, limit {limit}")]
    BufferOverflow { buffered: usize, limit: usize },

    #[error("Handler for {prefix} failed: {message}")]
    HandlerFault { prefix: String, message: String },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("Log line parse error: {0}")]
    LogParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
