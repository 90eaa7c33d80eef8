//! Error types for building and delivering invitations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, rendering or delivering an invitation.
#[derive(Error, Debug)]
pub enum InviteError {
    #[error("Could not parse date/time: {0}")]
    Parse(String),

    #[error("Invalid event: {}", .0.join(" "))]
    InvalidEvent(Vec<String>),

    #[error("Cannot send invitation, headers already sent")]
    HeadersAlreadySent,

    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for property '{name}': {reason}")]
    InvalidProperty { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InviteError {
    /// Validation messages carried by an `InvalidEvent` error.
    pub fn validation_errors(&self) -> &[String] {
        match self {
            InviteError::InvalidEvent(errors) => errors,
            _ => &[],
        }
    }
}

/// Result type alias for invite operations.
pub type InviteResult<T> = Result<T, InviteError>;
