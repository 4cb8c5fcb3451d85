use thiserror::Error;

/// Errors raised while talking to the portal API or the local store.
///
/// Controllers absorb most of these into localized fallback messages; they
/// only reach the binary when a command has nothing sensible to fall back to.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx answer without a JSON error message.
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    /// The server answered with `success: false`.
    #[error("{0}")]
    Api(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PortalError {
    /// Server-side failure with the message the API returned, or a generic one.
    pub fn api(error: Option<String>) -> Self {
        PortalError::Api(error.unwrap_or_else(|| "Unknown error".to_string()))
    }

    /// Text the server sent back, if this failure came from the API itself.
    /// Bare HTTP failures carry none, so error pages never reach the user.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PortalError::Api(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
