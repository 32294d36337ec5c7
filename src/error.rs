//! Errors raised while building and serializing mazes

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors of maze generation and PBM serialization
#[derive(Error, Debug)]
pub enum MazeError {
    #[error("Maze {axis} should not be a negative number (got {value})")]
    NegativeDimension { axis: &'static str, value: i64 },

    #[error("Maze {axis} of {value} exceeds the supported maximum of {max}")]
    DimensionTooLarge {
        axis: &'static str,
        value: i64,
        max: usize,
    },

    /// Memory could not be reserved.
    ///
    /// Only static context is carried, so reporting this never allocates.
    #[error("Failed to allocate memory to store {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("Failed to write the PBM output: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed PBM input: {0}")]
    Format(String),
}

impl MazeError {
    /// Whether this is a negative or oversized dimension
    pub fn is_dimension(&self) -> bool {
        matches!(
            self,
            MazeError::NegativeDimension { .. } | MazeError::DimensionTooLarge { .. }
        )
    }
}

/// Shorthand used across the crate
pub type Result<T> = std::result::Result<T, MazeError>;
