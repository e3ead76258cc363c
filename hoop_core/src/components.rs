use crate::physics::BodyHandle;
use glam::{Quat, Vec3};

/// Retired balls are despawned rather than kept in a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallState {
    /// Waiting at its spawn point for a shot
    Pending,
    /// Launched and in flight
    Live,
    /// Confirmed basket; stays in the scene until it falls away
    Scored,
}

/// Ball component - one basketball
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub state: BallState,
    pub radius: f32,
    pub entered_rim: bool,      // Was inside the rim column above the rim
    pub miss_registered: bool,  // Miss already reported
}

impl Ball {
    pub fn new(radius: f32) -> Self {
        Self {
            state: BallState::Pending,
            radius,
            entered_rim: false,
            miss_registered: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == BallState::Pending
    }

    pub fn is_launched(&self) -> bool {
        matches!(self.state, BallState::Live | BallState::Scored)
    }
}

/// Render transform, copied from the physics body every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Link from an entity to its rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody(pub BodyHandle);
