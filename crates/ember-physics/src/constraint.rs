//! The constraint abstraction driven by the solver.

use glam::Vec3;
use smallvec::SmallVec;

use crate::body::{BodyId, RigidBody};
use crate::config::SolverConfig;

/// A velocity-level constraint between bodies.
///
/// The solver calls [`apply_impulse`](Constraint::apply_impulse) once per
/// constraint per iteration. Implementations read and write only the bodies
/// they report from [`bodies`](Constraint::bodies).
pub trait Constraint {
    /// Bodies this constraint acts on. Checked against the solver's body
    /// list when the constraint is added.
    fn bodies(&self) -> SmallVec<[BodyId; 2]>;

    /// Apply one corrective impulse for the current velocities.
    fn apply_impulse(&self, bodies: &mut [RigidBody], config: &SolverConfig);

    /// World-space line segment for debug drawing, if the constraint has one.
    fn debug_segment(&self, _bodies: &[RigidBody]) -> Option<(Vec3, Vec3)> {
        None
    }
}

/// Mutable access to two distinct bodies of the same slice.
///
/// Returns `None` if `a == b` or either index is out of range.
pub(crate) fn pair_mut(
    bodies: &mut [RigidBody],
    a: BodyId,
    b: BodyId,
) -> Option<(&mut RigidBody, &mut RigidBody)> {
    let (ia, ib) = (a.index(), b.index());
    if ia == ib || ia >= bodies.len() || ib >= bodies.len() {
        return None;
    }
    if ia < ib {
        let (head, tail) = bodies.split_at_mut(ib);
        Some((&mut head[ia], &mut tail[0]))
    } else {
        let (head, tail) = bodies.split_at_mut(ia);
        Some((&mut tail[0], &mut head[ib]))
    }
}
