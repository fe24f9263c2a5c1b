// Error types for provider operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::api::DominosClient`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// A request body could not be serialized.
    #[error("could not encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The body was not the JSON shape we expected.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// `get_menu` was called before a store context supplied a menu version.
    #[error("menu version unavailable, fetch the store context first")]
    MenuVersionUnavailable,

    #[error("store index {index} out of range for {len} stores")]
    StoreIndexOutOfRange { index: usize, len: usize },

    #[error("basket item index {index} out of range for {len} items")]
    BasketItemIndexOutOfRange { index: usize, len: usize },

    #[error("size index {index} out of range for {len} sizes")]
    SizeIndexOutOfRange { index: usize, len: usize },

    /// No basket has been fetched yet.
    #[error("no basket loaded")]
    NoBasket,

    /// `add_item` only knows how to build Pizza and Side requests.
    #[error("unsupported item category: {0}")]
    UnsupportedCategory(String),
}

impl ClientError {
    /// Whether waiting and calling again may succeed. The context and basket
    /// endpoints fail transiently under rate limiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Decode(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
