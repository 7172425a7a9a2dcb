use thiserror::Error;

/// Failures while building the reduction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReductionError {
    #[error("path length must be non-negative, got {0}")]
    NegativeLength(i64),

    #[error("path length {0} does not fit the target platform")]
    LengthTooLarge(i64),
}

/// A satisfying assignment that breaks the shape the reduction enforces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no (node, height) pair holds at position {pos}")]
    NoConfiguration { pos: usize },

    #[error("{count} (node, height) pairs hold at position {pos}")]
    AmbiguousConfiguration { pos: usize, count: usize },

    #[error("stack cell {height} at position {pos} does not hold exactly one symbol")]
    IllDefinedCell { pos: usize, height: usize },

    #[error("stack height jumps from {from} to {to} after position {pos}")]
    HeightJump { pos: usize, from: usize, to: usize },
}

#[derive(Error, Debug)]
pub enum SolveError {
    #[error(transparent)]
    Reduction(#[from] ReductionError),

    #[error("malformed model: {0}")]
    Decode(#[from] DecodeError),

    #[error("solver returned unknown: {0}")]
    Unknown(String),
}
