use thiserror::Error;

/// Failures talking to the classification backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Reasons an uploaded file is refused before it is forwarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("the uploaded file is empty")]
    Empty,

    #[error("the uploaded file is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("the uploaded file is not a recognized image format")]
    UnrecognizedFormat,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;
