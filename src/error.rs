//! Unified error handling for the complaint intake application.

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or unusable startup configuration. Fatal: the server must
    /// not bind when this is raised.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetched sheet data does not match the expected tabular shape.
    /// Aborts the whole load, never a single row.
    #[error("Store format error at row {row}, column '{column}': {message}")]
    StoreFormat {
        row: usize,
        column: String,
        message: String,
    },

    /// User input rejected before it reaches the store.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Incoming form data could not be read. Recoverable: the user
    /// corrects and resubmits.
    #[error("Malformed form data: {0}")]
    Form(String),

    /// Remote store or attachment API failure. `transient` marks
    /// quota/rate-limit class failures that should also clear the cache.
    #[error("Remote call failed: {message}")]
    Remote { message: String, transient: bool },

    /// HTTP transport failure talking to a remote API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A display computation (chart construction) failed. Isolated to the
    /// view that raised it.
    #[error("Render error: {0}")]
    Render(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejection reasons for a drafted submission.
///
/// The location check always runs first: the variant a user sees tells them
/// the next thing to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No point has been picked on the map yet.
    #[error("Pick the complaint location on the map first")]
    MissingLocation,

    /// Author, content or a required category field is blank.
    #[error("Author, complaint content and category are all required")]
    MissingFields,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a malformed-form-data error.
    pub fn form(message: impl Into<String>) -> Self {
        Self::Form(message.into())
    }

    /// Create a non-transient remote error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            transient: false,
        }
    }

    /// Create a transient (quota / rate-limit) remote error.
    pub fn remote_transient(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            transient: true,
        }
    }

    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Whether the cached record set should be discarded before this error
    /// is surfaced, so the next interaction starts from a clean fetch.
    pub fn clears_cache(&self) -> bool {
        matches!(self, AppError::Remote { transient: true, .. })
    }
}
