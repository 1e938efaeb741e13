//! Error type for the solver driver.
//!
//! Every failure the driver can hit maps to a single diagnostic line; the
//! binary prints the message and exits normally, no stack traces.

use std::fmt;

/// Reasons a solve cannot start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// Board width or height below 2.
    InvalidBoardSize,
    /// Pieces file unreadable or held no pieces.
    LoadFailed,
    /// More pieces than the widest occupancy mask can track.
    TooManyPieces,
    /// More edge colors than the widest edge class can encode.
    TooManyEdges,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SolveError::InvalidBoardSize => "invalid board size!",
            SolveError::LoadFailed => "failed to load pieces!",
            SolveError::TooManyPieces => "too many pieces!",
            SolveError::TooManyEdges => "too many edges!",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SolveError {}
