// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only fatal conditions live here. Errors raised by the script or command
//! itself never become a `HostError`; they travel through the output channel
//! as `PipelineItem::ErrorRecord` instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    /// Malformed/unknown option or an incompatible mode + flag combination.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An interrupt was observed while an invocation was running.
    #[error("the operation was canceled")]
    Canceled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HostError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        HostError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
