//! Benchmark workloads for the Ember engine.
//!
//! - [`scatter_positions`]: deterministic pseudo-random body placement
//! - [`spring_grid`]: a `side x side` lattice of spheres joined by springs

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ember_physics::{BodyId, ConstraintSolver, PhysicsError, RigidBody};
use glam::Vec3;

/// `n` positions inside the cube `[-extent, extent]^3`, fully determined by
/// `seed`.
pub fn scatter_positions(n: usize, extent: f32, seed: u64) -> Vec<Vec3> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // Top 24 bits as a fraction in [0, 1).
        ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
    };
    (0..n)
        .map(|_| Vec3::new(next(), next(), next()) * extent)
        .collect()
}

/// Fill `solver` with a `side x side` grid of unit spheres one unit apart,
/// each joined to its right and lower neighbour by a spring.
///
/// Returns the body IDs in row-major order.
pub fn spring_grid(
    solver: &mut ConstraintSolver<'_>,
    side: usize,
) -> Result<Vec<BodyId>, PhysicsError> {
    let mut ids = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let body = RigidBody::sphere(Vec3::new(col as f32, -(row as f32), 0.0), 1.0, 0.25)?;
            ids.push(solver.add_body(body));
        }
    }
    for row in 0..side {
        for col in 0..side {
            let here = ids[row * side + col];
            if col + 1 < side {
                solver.add_spring(here, ids[row * side + col + 1], 0.5, 0.05)?;
            }
            if row + 1 < side {
                solver.add_spring(here, ids[(row + 1) * side + col], 0.5, 0.05)?;
            }
        }
    }
    Ok(ids)
}
