// Error types module

use thiserror::Error;

use crate::constants::{ERROR_BODY, NOT_FOUND_BODY};
use crate::image_optimizer::ImageError;
use crate::storage::StorageError;

/// Failure while serving one image request
///
/// Only two outcomes reach the client: 404 for a missing object (or a path
/// outside the routing prefix) and 500 for everything else.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Request path is not under the routing prefix, or names no object
    #[error("No object for path: {path}")]
    RouteMiss { path: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Image(#[from] ImageError),

    /// Resize parameters were given but no object key follows them
    #[error("No object key after resize parameters: {path}")]
    MissingKey { path: String },

    /// Percent-decoding produced invalid UTF-8
    #[error("Invalid object key encoding: {0}")]
    KeyDecode(String),

    /// The blocking transform task panicked or was cancelled
    #[error("Transform task failed: {0}")]
    Task(String),
}

impl HandlerError {
    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        if self.is_not_found() {
            404
        } else {
            500
        }
    }

    /// Body sent to the client; never includes internal detail
    pub fn public_message(&self) -> &'static str {
        if self.is_not_found() {
            NOT_FOUND_BODY
        } else {
            ERROR_BODY
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            HandlerError::RouteMiss { .. } => true,
            HandlerError::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<tokio::task::JoinError> for HandlerError {
    fn from(err: tokio::task::JoinError) -> Self {
        HandlerError::Task(err.to_string())
    }
}
