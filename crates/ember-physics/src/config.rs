//! Solver configuration parameters.

use crate::error::PhysicsError;

/// Configuration for the constraint solver.
///
/// Validated by [`ConstraintSolver::new`](crate::ConstraintSolver::new).
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Velocity iterations per step. Each iteration visits every constraint
    /// once. Must be at least 1.
    pub iterations: u32,

    /// Fraction of the positional error fed back into the velocity bias
    /// each step. Must lie in `[0, 1]`.
    pub baumgarte_scalar: f32,

    /// Step length in seconds. Must be finite and positive.
    pub timestep: f32,
}

impl SolverConfig {
    /// Default velocity iteration count.
    pub const DEFAULT_ITERATIONS: u32 = 10;

    /// Default baumgarte feedback factor.
    pub const DEFAULT_BAUMGARTE_SCALAR: f32 = 0.1;

    /// Default step length: 60 Hz.
    pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

    /// Create a config with the given timestep and default tuning.
    pub fn new(timestep: f32) -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            baumgarte_scalar: Self::DEFAULT_BAUMGARTE_SCALAR,
            timestep,
        }
    }

    /// Check the documented constraints on every field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.iterations == 0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "iterations must be >= 1 (got 0)".into(),
            });
        }
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(PhysicsError::InvalidConfig {
                reason: format!(
                    "timestep must be finite and > 0 (got {})",
                    self.timestep
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.baumgarte_scalar) {
            return Err(PhysicsError::InvalidConfig {
                reason: format!(
                    "baumgarte_scalar must be in [0, 1] (got {})",
                    self.baumgarte_scalar
                ),
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMESTEP)
    }
}
