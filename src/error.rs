use std::fmt;

/// Error type for directory API operations
#[derive(Debug)]
pub enum OrgError {
    /// HTTP request failed (connect, timeout, TLS, body read)
    Http(reqwest::Error),
    /// Backend returned a non-success envelope
    Api { code: i64, message: String },
    /// Credentials missing or token issuance rejected
    Auth(String),
    /// Caller supplied an unusable argument (e.g. empty identifier)
    Validation(String),
    /// Request was interrupted by the operator
    Cancelled,
    /// Pagination did not terminate within the page limit
    PageLimit { pages: usize },
    /// JSON parsing error
    Json(String),
    /// Configuration error
    Config(String),
    /// Filesystem error while writing reports or the session file
    Io(String),
}

impl OrgError {
    /// Whether a failed call may be attempted again.
    ///
    /// Transport and API failures share one retry budget; credential and
    /// argument problems will fail the same way every time. A listing that
    /// hit the page limit would only hit it again.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            OrgError::Auth(_)
                | OrgError::Validation(_)
                | OrgError::Config(_)
                | OrgError::Io(_)
                | OrgError::PageLimit { .. }
        )
    }
}

impl fmt::Display for OrgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgError::Http(e) => write!(f, "HTTP request failed: {}", e),
            OrgError::Api { code, message } => {
                write!(f, "API error (code {}): {}", code, message)
            }
            OrgError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            OrgError::Validation(msg) => write!(f, "{}", msg),
            OrgError::Cancelled => write!(f, "Request cancelled"),
            OrgError::PageLimit { pages } => {
                write!(f, "Pagination did not finish after {} pages", pages)
            }
            OrgError::Json(msg) => write!(f, "JSON error: {}", msg),
            OrgError::Config(msg) => write!(f, "Configuration error: {}", msg),
            OrgError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OrgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrgError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OrgError {
    fn from(err: reqwest::Error) -> Self {
        OrgError::Http(err)
    }
}

impl From<serde_json::Error> for OrgError {
    fn from(err: serde_json::Error) -> Self {
        OrgError::Json(err.to_string())
    }
}

impl From<std::io::Error> for OrgError {
    fn from(err: std::io::Error) -> Self {
        OrgError::Io(err.to_string())
    }
}

impl From<std::env::VarError> for OrgError {
    fn from(err: std::env::VarError) -> Self {
        OrgError::Config(err.to_string())
    }
}

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, OrgError>;
