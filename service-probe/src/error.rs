use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection refused: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("{0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Nothing is listening at the target; the service is simply not started.
    pub fn is_connect(&self) -> bool {
        matches!(self, ProbeError::Connect(_))
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Connect(err)
        } else {
            ProbeError::Request(err)
        }
    }
}
