use market::FetchError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scanner returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response from scanner: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("cannot read request parameters: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header {0}")]
    InvalidHeader(String),
}

impl From<ScannerError> for FetchError {
    /// Rejected credentials and malformed request setup will not heal by
    /// retrying; everything else is worth another poll.
    fn from(e: ScannerError) -> Self {
        let fatal = match &e {
            ScannerError::Status { status, .. } => {
                matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            }
            ScannerError::Http(err) => err.is_builder(),
            ScannerError::InvalidHeader(_) | ScannerError::Io(_) => true,
            ScannerError::InvalidResponse(_) => false,
        };

        if fatal {
            FetchError::Fatal(e.to_string())
        } else {
            FetchError::Transient(e.to_string())
        }
    }
}
