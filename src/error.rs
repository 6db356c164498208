//! Typed failures for the submit/observe/extract pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::engine::types::{ExecutionStatus, Phase};

#[derive(Debug, Error)]
pub enum Error {
    /// Network or authentication failure talking to the engine. Retryable
    /// during polling, fatal at submission time.
    #[error("transport error: {0}")]
    Transport(String),

    /// The engine refused the submission (bad template, bad namespace).
    /// Never retried.
    #[error("engine rejected the submission ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The execution vanished from the engine.
    #[error("execution {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    /// `max_wait` elapsed before a terminal phase. Carries the last observed
    /// status so callers can report partial progress.
    #[error("no terminal phase after {waited:?} (last observed: {})", .last.phase)]
    Timeout {
        waited: Duration,
        last: ExecutionStatus,
    },

    /// Output extraction attempted on a non-terminal status. Usage error.
    #[error("cannot extract outputs while execution is {0}")]
    InvalidState(Phase),

    /// Structurally invalid request, caught before any network call.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl Error {
    /// Transport failures are the only class the poller retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
