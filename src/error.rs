use thiserror::Error;

/// Errors surfaced by the public entry points of this crate.
///
/// Numerical difficulty inside the pairwise intersector (cross-product vs.
/// parametric sign mismatches) is never surfaced here — it is absorbed by
/// the bounded epsilon-widening loop described in the module docs of
/// [`crate::pair`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// An epsilon-accepting entry point was called with a non-positive
    /// tolerance.
    #[error("epsilon must be positive, got {epsilon}")]
    InvalidEpsilon { epsilon: f64 },

    /// A segment in the sweep input had coincident endpoints.
    #[error("segment {index} is empty (start == end)")]
    EmptySegment { index: usize },

    /// A crossing or line index passed to `split` fell outside the valid
    /// range.
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The sweep engine's internal search structure was found to be
    /// inconsistent at some point during the sweep. This should not happen
    /// for any finite, valid input; it is retained as a defensive fatal
    /// error rather than a panic so that callers can recover.
    #[error("sweep search structure corrupted: {0}")]
    SearchStructureCorrupted(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
