use crate::physics::{BodyHandle, CollisionGroups, PhysicsWorld, RigidBody};
use crate::{Config, Params};
use glam::{Quat, Vec3};

/// Static rim ring and backboard. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct HoopAssembly {
    rim_center: Vec3,
    rim_radius: f32,
    rim_segments: Vec<BodyHandle>,
    backboard: BodyHandle,
}

/// Pose of rim box `index` out of `count`, tangent to the ring
pub fn rim_segment_pose(center: Vec3, radius: f32, index: usize, count: usize) -> (Vec3, Quat) {
    let angle = index as f32 / count as f32 * std::f32::consts::TAU;
    let position = center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
    (position, Quat::from_rotation_y(-angle))
}

impl HoopAssembly {
    pub fn build(physics: &mut PhysicsWorld, config: &Config) -> Self {
        let rim_center = config.hoop_position;
        let rim_radius = config.rim_radius;
        let half = Vec3::from_array(Params::RIM_SEGMENT_HALF_EXTENTS);

        let rim_segments = (0..config.rim_segments)
            .map(|i| {
                let (position, rotation) =
                    rim_segment_pose(rim_center, rim_radius, i, config.rim_segments);
                physics.add_body(
                    RigidBody::cuboid(position, rotation, half)
                        .with_groups(CollisionGroups::scenery()),
                )
            })
            .collect();

        let board_center = rim_center
            + Vec3::new(0.0, Params::BACKBOARD_RISE, -Params::BACKBOARD_SETBACK);
        let board_half = Vec3::from_array(Params::BACKBOARD_SIZE) * 0.5;
        let backboard = physics.add_body(
            RigidBody::cuboid(board_center, Quat::IDENTITY, board_half)
                .with_groups(CollisionGroups::scenery()),
        );

        log::debug!(
            "hoop built at {:?}, rim radius {}, {} rim segments",
            rim_center,
            rim_radius,
            config.rim_segments
        );

        Self {
            rim_center,
            rim_radius,
            rim_segments,
            backboard,
        }
    }

    pub fn rim_center(&self) -> Vec3 {
        self.rim_center
    }

    pub fn rim_radius(&self) -> f32 {
        self.rim_radius
    }

    pub fn rim_segments(&self) -> &[BodyHandle] {
        &self.rim_segments
    }

    pub fn backboard(&self) -> BodyHandle {
        self.backboard
    }

    /// Distance from `point` to the rim centre in the horizontal plane
    pub fn horizontal_distance(&self, point: Vec3) -> f32 {
        let dx = point.x - self.rim_center.x;
        let dz = point.z - self.rim_center.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Radius of the vertical column a basket must drop through
    pub fn column_radius(&self) -> f32 {
        self.rim_radius * Params::COLUMN_FACTOR
    }
}
