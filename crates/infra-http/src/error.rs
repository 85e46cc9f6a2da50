//! reqwest -> FetchError conversion

use pivate_core::port::FetchError;
use std::time::Duration;

/// Classify a reqwest failure
///
/// A free function because neither type is local to this crate.
/// `timeout` is the client timeout reported when reqwest gives up waiting.
pub fn transport_error(e: reqwest::Error, timeout: Duration) -> FetchError {
    if let Some(status) = e.status() {
        return FetchError::HttpStatus(status.as_u16());
    }
    if e.is_decode() {
        return FetchError::Malformed(e.to_string());
    }
    if e.is_timeout() {
        return FetchError::Timeout(timeout);
    }
    if e.is_connect() {
        return FetchError::Transport(format!("connection failed: {e}"));
    }
    FetchError::Transport(e.to_string())
}
