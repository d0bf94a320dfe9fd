//! Test fixtures shared across Ember crates.
//!
//! Provides a drop-counting element type ([`DropCounter`] / [`Counted`]),
//! small arenas that exhaust quickly, and canned physics scenes.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;
use std::rc::Rc;

use ember_arena::{Arena, ArenaConfig};
use ember_physics::{BodyId, ConstraintSolver, RigidBody, SolverConfig};
use glam::Vec3;

/// Shared live/dropped tally for [`Counted`] values.
#[derive(Clone, Debug, Default)]
pub struct DropCounter {
    created: Rc<Cell<usize>>,
    dropped: Rc<Cell<usize>>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a value whose construction and destruction are tallied here.
    pub fn make(&self, value: i32) -> Counted {
        self.created.set(self.created.get() + 1);
        Counted {
            value,
            counter: self.clone(),
        }
    }

    /// Values constructed (including clones) and not yet dropped.
    pub fn live(&self) -> usize {
        self.created.get() - self.dropped.get()
    }

    pub fn dropped(&self) -> usize {
        self.dropped.get()
    }
}

/// A value that reports its drops to a [`DropCounter`].
#[derive(Debug)]
pub struct Counted {
    pub value: i32,
    counter: DropCounter,
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        self.counter.make(self.value)
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.counter.dropped.set(self.counter.dropped.get() + 1);
    }
}

/// Arena with the smallest legal segments, for exercising overflow.
pub fn small_arena() -> Arena {
    arena_with(ArenaConfig::MIN_SEGMENT_BYTES, 8)
}

pub fn arena_with(segment_bytes: usize, max_segments: u16) -> Arena {
    let config = ArenaConfig::new(segment_bytes).with_max_segments(max_segments);
    match Arena::new(config) {
        Ok(arena) => arena,
        Err(e) => panic!("test arena config rejected: {e}"),
    }
}

pub fn sphere_at(position: Vec3) -> RigidBody {
    match RigidBody::sphere(position, 1.0, 0.25) {
        Ok(body) => body,
        Err(e) => panic!("fixture sphere rejected: {e}"),
    }
}

/// Two unit-mass spheres one unit apart on the x axis, joined by a spring.
pub fn two_sphere_world<'a>(
    solver: &mut ConstraintSolver<'a>,
    spring_constant: f32,
    damping: f32,
) -> (BodyId, BodyId) {
    let a = solver.add_body(sphere_at(Vec3::ZERO));
    let b = solver.add_body(sphere_at(Vec3::X));
    if let Err(e) = solver.add_spring(a, b, spring_constant, damping) {
        panic!("fixture spring rejected: {e}");
    }
    (a, b)
}

/// A fixed anchor at the origin with `links` spheres hanging below it,
/// each joined to the previous by a spring.
pub fn hanging_chain<'a>(solver: &mut ConstraintSolver<'a>, links: usize) -> Vec<BodyId> {
    let mut ids = vec![solver.add_body(RigidBody::fixed(Vec3::ZERO))];
    for i in 1..=links {
        let id = solver.add_body(sphere_at(Vec3::new(0.0, -(i as f32), 0.0)));
        let prev = ids[ids.len() - 1];
        if let Err(e) = solver.add_spring(prev, id, 0.5, 0.05) {
            panic!("fixture spring rejected: {e}");
        }
        ids.push(id);
    }
    ids
}

/// Default solver config, heap-backed.
pub fn heap_solver() -> ConstraintSolver<'static> {
    match ConstraintSolver::new(SolverConfig::default()) {
        Ok(solver) => solver,
        Err(e) => panic!("default solver config rejected: {e}"),
    }
}
