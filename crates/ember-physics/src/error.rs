//! Physics error types.

use std::error::Error;
use std::fmt;

use crate::body::BodyId;

/// Errors raised while building or querying a physics world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A `BodyId` that does not name a body in the solver.
    UnknownBody {
        /// The unrecognised body.
        body: BodyId,
    },
    /// Body parameters are out of range (e.g. non-positive mass).
    InvalidBody {
        /// Human-readable description of the violation.
        reason: String,
    },
    /// Constraint parameters are out of range or reference the same body twice.
    InvalidConstraint {
        /// Human-readable description of the violation.
        reason: String,
    },
    /// The solver configuration violates a documented constraint.
    InvalidConfig {
        /// Human-readable description of the violation.
        reason: String,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBody { body } => write!(f, "unknown body: {body}"),
            Self::InvalidBody { reason } => write!(f, "invalid body: {reason}"),
            Self::InvalidConstraint { reason } => write!(f, "invalid constraint: {reason}"),
            Self::InvalidConfig { reason } => write!(f, "invalid solver config: {reason}"),
        }
    }
}

impl Error for PhysicsError {}
