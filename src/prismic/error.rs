//! Content API errors

use thiserror::Error;

/// Errors raised while talking to the content API
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("No {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Repository has no master ref")]
    NoMasterRef,

    #[error("Invalid API endpoint {0:?}")]
    Endpoint(String),
}

impl CmsError {
    /// Whether the error means the document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }
}
