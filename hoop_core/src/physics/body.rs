use super::shape::{Aabb, Shape};
use glam::{Quat, Vec3};

/// Stable reference to a body; stale handles simply resolve to nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves
    Static,
    /// Collides but ignores gravity and solver pushes (the pending ball)
    Kinematic,
    /// Moved by gravity, constraints and contacts
    Dynamic,
}

/// Contact surface family, used to pick friction and restitution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Hard,
    Net,
}

/// Group membership and the groups a body accepts contacts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionGroups {
    pub membership: u32,
    pub filter: u32,
}

impl CollisionGroups {
    pub const BALL: u32 = 1;
    pub const NET: u32 = 1 << 1;
    pub const SCENERY: u32 = 1 << 2;

    pub const fn new(membership: u32, filter: u32) -> Self {
        Self { membership, filter }
    }

    pub const fn ball() -> Self {
        Self::new(Self::BALL, Self::BALL | Self::NET | Self::SCENERY)
    }

    pub const fn net() -> Self {
        Self::new(Self::NET, Self::BALL)
    }

    pub const fn scenery() -> Self {
        Self::new(Self::SCENERY, Self::BALL)
    }

    pub fn interacts_with(&self, other: &CollisionGroups) -> bool {
        self.membership & other.filter != 0 && other.membership & self.filter != 0
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::new(u32::MAX, u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub shape: Shape,
    pub kind: BodyKind,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub groups: CollisionGroups,
    pub material: Material,
    pub(crate) prev_position: Vec3,
    pub(crate) pre_velocity: Vec3,
}

impl RigidBody {
    /// A sphere; zero mass makes it static
    pub fn sphere(position: Vec3, radius: f32, mass: f32) -> Self {
        let kind = if mass > 0.0 {
            BodyKind::Dynamic
        } else {
            BodyKind::Static
        };
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            shape: Shape::Sphere { radius },
            kind,
            mass,
            linear_damping: 0.01,
            angular_damping: crate::Params::ANGULAR_DAMPING,
            groups: CollisionGroups::default(),
            material: Material::Hard,
            prev_position: position,
            pre_velocity: Vec3::ZERO,
        }
    }

    /// A static oriented box
    pub fn cuboid(position: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            rotation,
            shape: Shape::Cuboid { half_extents },
            ..Self::sphere(position, 0.0, 0.0)
        }
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_damping(mut self, linear_damping: f32) -> Self {
        self.linear_damping = linear_damping;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Zero for anything the solver must not move
    pub fn inv_mass(&self) -> f32 {
        if self.is_dynamic() && self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position, self.rotation)
    }
}
