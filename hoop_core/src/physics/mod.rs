//! Rigid-body world used by the shootout: spheres and oriented boxes,
//! distance constraints for the net, sweep-and-prune broadphase and a
//! position-based solver run for a fixed number of iterations per step.

pub mod body;
pub mod broadphase;
pub mod constraint;
pub mod shape;
pub mod world;

pub use body::{BodyHandle, BodyKind, CollisionGroups, Material, RigidBody};
pub use broadphase::SweepAndPrune;
pub use constraint::DistanceConstraint;
pub use shape::{Aabb, Shape};
pub use world::{Contact, PhysicsWorld};
