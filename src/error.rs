use thiserror::Error;

/// Reasons a single file import can fail
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Only plaintext (.txt) and JSON (.json) files are allowed.")]
    UnsupportedExtension,

    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("This import structure is not currently allowed.")]
    InvalidStructure,

    #[error("No session token is available to authenticate the request")]
    MissingToken,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request rejected with HTTP {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl ImportError {
    /// Whether the failure happened while submitting, rather than while reading the file
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ImportError::MissingToken | ImportError::Request(_) | ImportError::Rejected { .. }
        )
    }
}
