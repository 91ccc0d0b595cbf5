//! # Error Kinds
//!
//! Every user action either succeeds or fails with one of four kinds. Input
//! validation and network failures are kept apart so the caller can tell
//! "fix what you typed" from "try again later".

use thiserror::Error;

/// Errors raised by the calculator and the NOAA client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UkcError {
    /// HTTP request failed, returned a non-success status, or the API
    /// reported an error in its payload.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The service answered but carried no usable payload.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// No station matched the search term or identifier.
    #[error("station not found: {0}")]
    StationNotFound(String),

    /// A user entry was non-numeric, non-finite or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for UkcError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => UkcError::NetworkFailure(format!("HTTP {}", status.as_u16())),
            None => UkcError::NetworkFailure(err.to_string()),
        }
    }
}

impl UkcError {
    /// Shorthand for building an `InvalidInput` error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        UkcError::InvalidInput(msg.into())
    }
}
