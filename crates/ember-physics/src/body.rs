//! Rigid bodies and body handles.

use std::fmt;

use glam::{Mat3, Quat, Vec3};

use crate::error::PhysicsError;

/// Identifies a body within a [`ConstraintSolver`](crate::ConstraintSolver).
///
/// Bodies are assigned sequential IDs as they are added; `BodyId(n)` is the
/// n-th body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Position of this body in the solver's body list.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The ID for list position `index`, or `None` if it does not fit in
    /// a `u32`.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BodyId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A rigid body: kinematic state plus inverse mass properties.
///
/// Static bodies have zero inverse mass and zero inverse inertia; impulses
/// leave them untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBody {
    /// Centre of mass in world space.
    pub position: Vec3,
    /// Rotation from body space to world space. Kept normalised.
    pub orientation: Quat,
    /// Linear velocity in world space.
    pub linear_velocity: Vec3,
    /// Angular velocity in world space (axis * radians per second).
    pub angular_velocity: Vec3,
    inverse_mass: f32,
    /// Inverse inertia tensor in body space.
    inverse_inertia: Mat3,
}

impl RigidBody {
    /// A dynamic solid sphere of the given mass and radius.
    ///
    /// Returns `Err(PhysicsError::InvalidBody)` unless both are finite and
    /// positive.
    pub fn sphere(position: Vec3, mass: f32, radius: f32) -> Result<Self, PhysicsError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(PhysicsError::InvalidBody {
                reason: format!("mass must be finite and > 0 (got {mass})"),
            });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PhysicsError::InvalidBody {
                reason: format!("radius must be finite and > 0 (got {radius})"),
            });
        }
        // Solid sphere: I = 2/5 m r^2 about every axis.
        let inertia = 0.4 * mass * radius * radius;
        Ok(Self {
            position,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inverse_mass: 1.0 / mass,
            inverse_inertia: Mat3::from_diagonal(Vec3::splat(1.0 / inertia)),
        })
    }

    /// An immovable body (infinite mass).
    pub fn fixed(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inverse_mass: 0.0,
            inverse_inertia: Mat3::ZERO,
        }
    }

    /// Set the orientation (normalised on the way in).
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Set the initial linear velocity.
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the initial angular velocity.
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// `1 / mass`, zero for static bodies.
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Whether impulses leave this body untouched.
    pub fn is_static(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Inverse inertia tensor rotated into world space: `R I⁻¹ Rᵀ`.
    pub fn world_inverse_inertia(&self) -> Mat3 {
        let rotation = Mat3::from_quat(self.orientation);
        rotation * self.inverse_inertia * rotation.transpose()
    }

    /// Convert a world-space point into this body's local frame.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.orientation.conjugate() * (world - self.position)
    }

    /// Convert a local-frame point into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.orientation * local + self.position
    }

    /// Velocity of the material point at world-space offset `r` from the
    /// centre of mass.
    pub fn point_velocity(&self, r: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(r)
    }

    /// Advance position and orientation by `dt` using the current velocities
    /// (semi-implicit Euler). Static bodies do not move.
    pub fn integrate(&mut self, dt: f32) {
        if self.is_static() {
            return;
        }
        self.position += self.linear_velocity * dt;
        let w = self.angular_velocity;
        let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * self.orientation;
        self.orientation = (self.orientation + spin * (0.5 * dt)).normalize();
    }
}
