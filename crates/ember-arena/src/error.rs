//! Arena and array error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while the arena hands out storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Segment budget is exhausted; no more segments can be opened.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Total bytes held across all segments.
        capacity: usize,
    },
    /// The global allocator refused memory for a new segment.
    AllocationFailed {
        /// Size of the segment in bytes.
        bytes: usize,
        /// Alignment of the segment in bytes.
        align: usize,
    },
    /// The arena configuration violates a documented constraint.
    InvalidConfig {
        /// Human-readable description of the violation.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::AllocationFailed { bytes, align } => {
                write!(
                    f,
                    "segment allocation of {bytes} bytes (align {align}) failed"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}

/// Errors raised by [`GrowableArray`](crate::GrowableArray).
///
/// Out-of-range access and allocation failure are fatal on the panicking
/// API (`arr[i]`, `reserve`, `push`); the `at`/`try_reserve` family
/// returns them instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// Indexed access at or beyond the logical length.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The array length at the time of access.
        len: usize,
    },
    /// The requested capacity cannot be expressed as an allocation size.
    CapacityOverflow {
        /// Requested capacity in elements.
        requested: usize,
    },
    /// The global heap allocator returned null for a heap-mode buffer.
    /// Arena segment failures arrive as [`ArrayError::Arena`].
    AllocationFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
        /// Alignment of the failed request in bytes.
        align: usize,
    },
    /// The backing arena could not supply storage.
    Arena(ArenaError),
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for array of length {len}")
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} elements")
            }
            Self::AllocationFailed { bytes, align } => {
                write!(
                    f,
                    "heap allocation of {bytes} bytes (align {align}) failed"
                )
            }
            Self::Arena(e) => write!(f, "arena allocation failed: {e}"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for ArrayError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
