//! Rigid bodies and impulse-based constraints for the Ember engine.
//!
//! A [`ConstraintSolver`] owns a list of [`RigidBody`]s and a list of
//! [`Constraint`]s, both stored in [`ember_arena::GrowableArray`]s. Each
//! step applies every constraint's impulse `iterations` times, then
//! integrates the bodies.
//!
//! ```
//! use ember_physics::{ConstraintSolver, RigidBody, SolverConfig};
//! use glam::Vec3;
//!
//! let mut solver = ConstraintSolver::new(SolverConfig::default()).unwrap();
//! let anchor = solver.add_body(RigidBody::fixed(Vec3::ZERO));
//! let bob = solver.add_body(RigidBody::sphere(Vec3::X, 1.0, 0.1).unwrap());
//! solver.add_spring(anchor, bob, 0.5, 0.0).unwrap();
//!
//! solver.body_mut(bob).unwrap().position.x = 2.0;
//! solver.step();
//! assert!(solver.body(bob).unwrap().linear_velocity.x < 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod config;
pub mod constraint;
pub mod error;
pub mod solver;
pub mod spring;

pub use body::{BodyId, RigidBody};
pub use config::SolverConfig;
pub use constraint::Constraint;
pub use error::PhysicsError;
pub use solver::ConstraintSolver;
pub use spring::SpringConstraint;
