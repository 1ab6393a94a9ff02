//! Recoverable errors. Broken invariants inside the hierarchy (an
//! overflowing priority queue, removing from an empty one) are bugs
//! and panic instead.

// others
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlabsError {
    /// Buckets need room for at least two children.
    #[error("bunching factor must be at least 2, got {0}")]
    InvalidBunchingFactor(i32),

    #[error("bounding threshold must not be negative, got {0}")]
    NegativeThreshold(i32),

    /// A parameter was given, but with a different type than expected.
    #[error("parameter \"{name}\" must be of type {expected}")]
    WrongParameterType {
        name: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, SlabsError>;
