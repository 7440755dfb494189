//! Per-task failure definitions
//!
//! Every failure is isolated to the task that produced it; the controller
//! decides between requeueing and abandoning by looking at its kind.

use std::fmt;
use thiserror::Error;

/// How the controller reacts to a failed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Requeue with backoff while the retry budget lasts
    Retryable,

    /// Skip the task and log it
    Permanent,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retryable => write!(f, "retryable"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Errors raised while processing a single frontier task
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The site answered with an anti-automation page
    #[error("Block signal detected at {url}")]
    Blocked { url: String },

    /// The fetch exceeded the per-request timeout
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// The site answered with a non-200 status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Connection, TLS, proxy or body read failure
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl TaskError {
    /// Classifies the failure
    ///
    /// Gone postings (404, 410) will not come back; everything else may be a
    /// transient block or network hiccup.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::HttpStatus {
                status: 404 | 410, ..
            } => FailureKind::Permanent,
            _ => FailureKind::Retryable,
        }
    }
}
