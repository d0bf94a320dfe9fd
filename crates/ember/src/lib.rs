//! Ember: arena-aware containers and impulse physics for real-time engines.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Ember sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use ember::prelude::*;
//!
//! let mut arena = Arena::default();
//! {
//!     let mut solver = ConstraintSolver::new_in(SolverConfig::default(), &arena).unwrap();
//!     let anchor = solver.add_body(RigidBody::fixed(Vec3::ZERO));
//!     let bob = solver.add_body(RigidBody::sphere(Vec3::NEG_Y, 1.0, 0.1).unwrap());
//!     solver.add_spring(anchor, bob, 0.5, 0.0).unwrap();
//!     solver.step();
//!
//!     let segments = solver.debug_segments();
//!     assert_eq!(segments.len(), 1);
//! }
//! // Every body, constraint and debug segment is reclaimed at once.
//! arena.reset();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `ember-arena` | Bump arena and arena-aware `GrowableArray` |
//! | [`physics`] | `ember-physics` | Rigid bodies, constraints, solver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Bump arena and growable array (`ember-arena`).
pub use ember_arena as arena;

/// Rigid bodies, spring constraints and the iterative solver (`ember-physics`).
pub use ember_physics as physics;

pub use ember_arena::growable_array;

/// Common imports for typical Ember usage.
pub mod prelude {
    // Containers
    pub use ember_arena::{Arena, ArenaConfig, GrowableArray};

    // Physics
    pub use ember_physics::{
        BodyId, Constraint, ConstraintSolver, RigidBody, SolverConfig, SpringConstraint,
    };

    // Errors
    pub use ember_arena::{ArenaError, ArrayError};
    pub use ember_physics::PhysicsError;

    // Math
    pub use glam::{Quat, Vec3};
}
