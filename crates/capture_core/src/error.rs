//! Error types for the capture simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for simulation construction.
///
/// A running simulation performs no IO and has no recoverable failures;
/// the only rejected input is a configuration that would produce a
/// degenerate board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// Grid dimensions cannot hold a match.
    #[error("Invalid grid dimensions {width}x{height}: {reason}")]
    InvalidGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Why the dimensions were rejected.
        reason: &'static str,
    },
}
