use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can go wrong talking to the playlist server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid JSON from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("attempted to enqueue empty url")]
    EmptyUrl,

    #[error("invalid server url {0:?} (expected http:// or https://)")]
    InvalidBaseUrl(String),
}

/// JSON body the server attaches to failed API calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}
