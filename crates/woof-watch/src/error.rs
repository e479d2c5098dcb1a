//! Watch error types.

use std::time::Duration;

use thiserror::Error;

/// Errors returned when talking to watch actors.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("no watch registered for endpoint {0:?}")]
    NotFound(String),

    #[error("watch {endpoint:?} did not answer within {after:?}")]
    Timeout { endpoint: String, after: Duration },

    #[error("watch {0:?} is no longer running")]
    Closed(String),

    #[error("status persistence failed: {0}")]
    Persist(#[from] woof_core::CoreError),
}

pub type WatchResult<T> = Result<T, WatchError>;
