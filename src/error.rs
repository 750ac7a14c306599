//! Error types for inspection operations.

use thiserror::Error;

/// Errors that can occur while inspecting an index file.
///
/// None of these escape the public stats entry points: every failure is
/// resolved locally into an all-zero [`GraphStats`](crate::GraphStats) or an
/// early "could not open" report line.
#[derive(Debug, Error)]
pub enum InspectError {
    /// I/O error (file missing, unreadable, short read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Format error (header fields violate the layout geometry, or the
    /// metadata block does not match the expected layout)
    #[error("format error: {0}")]
    Format(String),

    /// Known layout variant the inspector does not support
    #[error("unsupported layout: {0}")]
    Unsupported(String),
}

/// Result type for inspection operations.
pub type InspectResult<T> = Result<T, InspectError>;
