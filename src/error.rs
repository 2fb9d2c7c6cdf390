use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the store and its collaborators. Store operations
/// return these unchanged; nothing is retried internally.
#[derive(Debug, Error)]
pub enum AppError {
    /// The server answered with a non-success status.
    #[error("{message} ({status})")]
    Network { message: String, status: u16 },

    /// The requested resource does not exist (404).
    #[error("{message} (404)")]
    NotFound { message: String },

    #[error("Request took too long! Timeout after {} seconds.", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    /// The request never produced a response (connection refused, DNS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A submission field could not be parsed.
    #[error("Wrong format in {field}: \"{line}\". Ingredients must look like quantity,unit,description.")]
    Format { field: String, line: String },

    #[error("no recipe is loaded")]
    NoActiveRecipe,

    #[error("servings must be a positive number, got {0}")]
    InvalidServings(u32),

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors that came back from the server, including `NotFound`.
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network { .. } | AppError::NotFound { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Network { status, .. } => Some(*status),
            AppError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}
