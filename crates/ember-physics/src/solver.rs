//! Iterative impulse solver.
//!
//! Each [`step`](ConstraintSolver::step) runs `iterations` passes over the
//! constraint list, applying one impulse per constraint per pass, then
//! integrates every body over the configured timestep. Bodies and
//! constraints live in [`GrowableArray`]s, optionally backed by an
//! [`Arena`] so a whole scene can be torn down with one arena reset.

use std::fmt;

use ember_arena::{Arena, GrowableArray};
use glam::Vec3;

use crate::body::{BodyId, RigidBody};
use crate::config::SolverConfig;
use crate::constraint::Constraint;
use crate::error::PhysicsError;
use crate::spring::SpringConstraint;

/// Owns the bodies and constraints of one simulation.
pub struct ConstraintSolver<'a> {
    bodies: GrowableArray<'a, RigidBody>,
    constraints: GrowableArray<'a, Box<dyn Constraint>>,
    config: SolverConfig,
}

impl<'a> ConstraintSolver<'a> {
    /// Create a heap-backed solver.
    ///
    /// Returns `Err(PhysicsError::InvalidConfig)` if `config` fails validation.
    pub fn new(config: SolverConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            bodies: GrowableArray::new(),
            constraints: GrowableArray::new(),
            config,
        })
    }

    /// Create a solver whose body and constraint storage comes from `arena`.
    pub fn new_in(config: SolverConfig, arena: &'a Arena) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            bodies: GrowableArray::new_in(arena),
            constraints: GrowableArray::new_in(arena),
            config,
        })
    }

    /// Add a body and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if the solver already holds `u32::MAX + 1` bodies.
    #[track_caller]
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let count = self.bodies.len();
        let Some(id) = BodyId::from_index(count) else {
            panic!("body count exceeds the BodyId range ({count} bodies)");
        };
        self.bodies.push(body);
        id
    }

    /// Borrow a body.
    pub fn body(&self, id: BodyId) -> Result<&RigidBody, PhysicsError> {
        self.bodies
            .at(id.index())
            .map_err(|_| PhysicsError::UnknownBody { body: id })
    }

    /// Mutably borrow a body.
    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .at_mut(id.index())
            .map_err(|_| PhysicsError::UnknownBody { body: id })
    }

    /// All bodies, indexed by [`BodyId::index`].
    pub fn bodies(&self) -> &[RigidBody] {
        self.bodies.as_slice()
    }

    /// Number of bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Register a constraint.
    ///
    /// Every body it reports must already exist.
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> Result<(), PhysicsError> {
        let ids = constraint.bodies();
        for &id in &ids {
            if id.index() >= self.bodies.len() {
                return Err(PhysicsError::UnknownBody { body: id });
            }
        }
        if all_static(self.bodies.as_slice(), &ids) {
            log::warn!("constraint between static bodies {ids:?} will have no effect");
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Connect the centres of `a` and `b` with a spring at its current length.
    pub fn add_spring(
        &mut self,
        a: BodyId,
        b: BodyId,
        spring_constant: f32,
        damping: f32,
    ) -> Result<(), PhysicsError> {
        let spring = SpringConstraint::new(self.bodies(), a, b, spring_constant, damping)?;
        self.add_constraint(Box::new(spring))
    }

    /// Connect world-space anchor points on `a` and `b` with a spring at its
    /// current length.
    #[allow(clippy::too_many_arguments)]
    pub fn add_spring_with_anchors(
        &mut self,
        a: BodyId,
        b: BodyId,
        global_on_a: Vec3,
        global_on_b: Vec3,
        spring_constant: f32,
        damping: f32,
    ) -> Result<(), PhysicsError> {
        let spring = SpringConstraint::with_anchors(
            self.bodies(),
            a,
            b,
            global_on_a,
            global_on_b,
            spring_constant,
            damping,
        )?;
        self.add_constraint(Box::new(spring))
    }

    /// Number of registered constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Run the velocity iterations without moving any body.
    pub fn solve_velocities(&mut self) {
        let bodies = self.bodies.as_mut_slice();
        for _ in 0..self.config.iterations {
            for constraint in self.constraints.iter() {
                constraint.apply_impulse(bodies, &self.config);
            }
        }
    }

    /// Advance every body by one timestep using its current velocities.
    pub fn integrate(&mut self) {
        let dt = self.config.timestep;
        for body in self.bodies.iter_mut() {
            body.integrate(dt);
        }
    }

    /// Solve velocities, then integrate.
    pub fn step(&mut self) {
        self.solve_velocities();
        self.integrate();
        log::trace!(
            "solver step: {} bodies, {} constraints, {} iterations",
            self.bodies.len(),
            self.constraints.len(),
            self.config.iterations,
        );
    }

    /// World-space segments of every constraint that can be drawn.
    ///
    /// The result shares the solver's arena, if any.
    pub fn debug_segments(&self) -> GrowableArray<'a, (Vec3, Vec3)> {
        let mut out = match self.bodies.arena() {
            Some(arena) => GrowableArray::new_in(arena),
            None => GrowableArray::new(),
        };
        let bodies = self.bodies.as_slice();
        out.extend(self.constraints.iter().filter_map(|c| c.debug_segment(bodies)));
        out
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

/// Whether `ids` names at least one body and every named body is static.
fn all_static(bodies: &[RigidBody], ids: &[BodyId]) -> bool {
    !ids.is_empty() && ids.iter().all(|id| bodies[id.index()].is_static())
}

impl fmt::Debug for ConstraintSolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSolver")
            .field("bodies", &self.bodies.len())
            .field("constraints", &self.constraints.len())
            .field("arena_backed", &self.bodies.is_arena_backed())
            .field("config", &self.config)
            .finish()
    }
}
