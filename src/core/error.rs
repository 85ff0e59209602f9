//! Error types for replimap
//!
//! Defines the fault taxonomy used throughout the library. Only
//! invalid-argument faults surface as errors; recoverable "no result"
//! outcomes are `Option`s and unusable preconditions are logged and
//! absorbed at the call site.

use thiserror::Error;

/// Errors raised when constructing or reshaping a region
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// Region constructed without a reference name
    #[error("reference name must not be empty")]
    EmptyReferenceName,

    /// Region constructed on a reference of non-positive length
    #[error("reference length must be positive, got {0}")]
    NonPositiveLength(i64),

    /// Strand value outside {+1, -1}
    #[error("{0} is not a valid strand, expected +1 or -1")]
    InvalidStrand(i8),

    /// Attached sequence does not cover the region it is attached to
    #[error("attached sequence is {actual} bp but the region spans {expected} bp")]
    SequenceLengthMismatch { expected: i64, actual: usize },

    /// Resize attempted on a region carrying a literal sequence
    #[error("a region with an attached sequence cannot be resized")]
    AttachedSequence,
}

/// Errors raised by the projection protocol
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// The caller asked to project onto a coordinate system that does not exist
    #[error("unknown target coordinate system: {0}")]
    UnknownCoordinateSystem(String),
}

/// Result type alias for region operations
pub type RegionResult<T> = std::result::Result<T, RegionError>;

/// Result type alias for projection operations
pub type ProjectResult<T> = std::result::Result<T, ProjectError>;
