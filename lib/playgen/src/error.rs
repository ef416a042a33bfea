use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaygenError>;

#[derive(Debug, Error)]
pub enum PlaygenError {
    #[error("catalog API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("playlist not found: {0}")]
    NotFound(String),

    #[error("invalid added-at timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("batch of {len} exceeds the catalog limit of {limit}")]
    BatchTooLarge { limit: usize, len: usize },

    #[error("catalog client is not configured")]
    NotConfigured,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("client handoff closed before a client was delivered")]
    HandoffClosed,
}

impl PlaygenError {
    /// True for failures reported by (or on the way to) the catalog service.
    pub fn is_catalog(&self) -> bool {
        matches!(
            self,
            PlaygenError::Api { .. }
                | PlaygenError::Http(_)
                | PlaygenError::Url(_)
                | PlaygenError::BatchTooLarge { .. }
        )
    }
}
