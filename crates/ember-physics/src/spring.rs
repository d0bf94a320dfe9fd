//! Spring constraint with baumgarte stabilisation.
//!
//! The spring keeps two anchor points at their rest distance. Each
//! iteration computes the relative velocity of the anchors along the spring
//! axis, adds a positional bias `-(β / dt) · (|ab| - rest)`, scales by the
//! spring constant, subtracts a damping term proportional to the relative
//! speed, and divides by the effective constraint mass:
//!
//! ```text
//! m_eff = 1/m_a + 1/m_b + n · ((I_a⁻¹ (r_a × n)) × r_a + (I_b⁻¹ (r_b × n)) × r_b)
//! j     = (-(n · (v_a - v_b) + bias) · k - d · |v_a - v_b|) / m_eff
//! ```
//!
//! The impulse `j · n` is applied positively to body A and negatively to
//! body B, both linearly and about each anchor.

use glam::Vec3;
use smallvec::{smallvec, SmallVec};

use crate::body::{BodyId, RigidBody};
use crate::config::SolverConfig;
use crate::constraint::{pair_mut, Constraint};
use crate::error::PhysicsError;

/// Below this anchor separation the spring axis is undefined and the
/// constraint is skipped for the iteration.
const MIN_AXIS_LENGTH: f32 = 1e-6;

/// A damped spring between anchor points on two bodies.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringConstraint {
    body_a: BodyId,
    body_b: BodyId,
    /// Anchor on A in A's local frame.
    local_on_a: Vec3,
    /// Anchor on B in B's local frame.
    local_on_b: Vec3,
    rest_length: f32,
    spring_constant: f32,
    damping: f32,
}

impl SpringConstraint {
    /// Spring between the centres of mass of `a` and `b`.
    ///
    /// The rest length is the current distance between the centres.
    pub fn new(
        bodies: &[RigidBody],
        a: BodyId,
        b: BodyId,
        spring_constant: f32,
        damping: f32,
    ) -> Result<Self, PhysicsError> {
        let (pa, pb) = (lookup(bodies, a)?.position, lookup(bodies, b)?.position);
        Self::with_anchors(bodies, a, b, pa, pb, spring_constant, damping)
    }

    /// Spring between world-space anchor points `global_on_a` (attached to
    /// `a`) and `global_on_b` (attached to `b`).
    ///
    /// Anchors are stored in each body's local frame so they follow the
    /// bodies as they rotate. The rest length is the current distance
    /// between the anchors.
    pub fn with_anchors(
        bodies: &[RigidBody],
        a: BodyId,
        b: BodyId,
        global_on_a: Vec3,
        global_on_b: Vec3,
        spring_constant: f32,
        damping: f32,
    ) -> Result<Self, PhysicsError> {
        if a == b {
            return Err(PhysicsError::InvalidConstraint {
                reason: format!("spring connects body {a} to itself"),
            });
        }
        if !spring_constant.is_finite() || spring_constant < 0.0 {
            return Err(PhysicsError::InvalidConstraint {
                reason: format!("spring constant must be finite and >= 0 (got {spring_constant})"),
            });
        }
        if !damping.is_finite() || damping < 0.0 {
            return Err(PhysicsError::InvalidConstraint {
                reason: format!("damping must be finite and >= 0 (got {damping})"),
            });
        }
        let body_on_a = lookup(bodies, a)?;
        let body_on_b = lookup(bodies, b)?;
        Ok(Self {
            body_a: a,
            body_b: b,
            local_on_a: body_on_a.to_local(global_on_a),
            local_on_b: body_on_b.to_local(global_on_b),
            rest_length: (global_on_b - global_on_a).length(),
            spring_constant,
            damping,
        })
    }

    /// Distance the spring relaxes to.
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Stiffness `k`.
    ///
    /// `k` scales the whole velocity correction of each iteration, so values
    /// above 1 over-correct and values above 2 diverge.
    pub fn spring_constant(&self) -> f32 {
        self.spring_constant
    }

    /// Damping factor `d`.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Current world-space anchor positions, or `None` if a body is missing.
    pub fn anchors(&self, bodies: &[RigidBody]) -> Option<(Vec3, Vec3)> {
        let a = bodies.get(self.body_a.index())?;
        let b = bodies.get(self.body_b.index())?;
        Some((a.to_world(self.local_on_a), b.to_world(self.local_on_b)))
    }
}

impl Constraint for SpringConstraint {
    fn bodies(&self) -> SmallVec<[BodyId; 2]> {
        smallvec![self.body_a, self.body_b]
    }

    fn apply_impulse(&self, bodies: &mut [RigidBody], config: &SolverConfig) {
        let Some((a, b)) = pair_mut(bodies, self.body_a, self.body_b) else {
            return;
        };
        if a.inverse_mass() + b.inverse_mass() == 0.0 {
            return;
        }

        let r1 = a.orientation * self.local_on_a;
        let r2 = b.orientation * self.local_on_b;
        let ab = (r2 + b.position) - (r1 + a.position);
        let length = ab.length();
        if length < MIN_AXIS_LENGTH {
            return;
        }
        let axis = ab / length;

        let v0 = a.point_velocity(r1);
        let v1 = b.point_velocity(r2);
        let relative = v0 - v1;

        let inertia_a = a.world_inverse_inertia();
        let inertia_b = b.world_inverse_inertia();
        let constraint_mass = a.inverse_mass()
            + b.inverse_mass()
            + axis.dot(
                (inertia_a * r1.cross(axis)).cross(r1) + (inertia_b * r2.cross(axis)).cross(r2),
            );

        let bias = -(config.baumgarte_scalar / config.timestep) * (length - self.rest_length);

        let jn = ((-(relative.dot(axis) + bias) * self.spring_constant)
            - self.damping * relative.length())
            / constraint_mass;
        let impulse = axis * jn;

        a.linear_velocity += impulse * a.inverse_mass();
        b.linear_velocity -= impulse * b.inverse_mass();
        a.angular_velocity += inertia_a * r1.cross(impulse);
        b.angular_velocity -= inertia_b * r2.cross(impulse);
    }

    fn debug_segment(&self, bodies: &[RigidBody]) -> Option<(Vec3, Vec3)> {
        self.anchors(bodies)
    }
}

fn lookup(bodies: &[RigidBody], id: BodyId) -> Result<&RigidBody, PhysicsError> {
    bodies
        .get(id.index())
        .ok_or(PhysicsError::UnknownBody { body: id })
}
