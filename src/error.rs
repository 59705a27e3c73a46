use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashqError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to create request: {0}")]
    Request(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No dashboards returned")]
    NoDashboards,

    #[error("Invalid dashboard id {0:?}: not usable as a file name")]
    InvalidId(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashqError>;
