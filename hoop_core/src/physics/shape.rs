use glam::{Quat, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// Collision geometry, expressed in the owning body's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl Shape {
    pub fn aabb(&self, position: Vec3, rotation: Quat) -> Aabb {
        match *self {
            Shape::Sphere { radius } => {
                Aabb::from_center_half_extents(position, Vec3::splat(radius))
            }
            Shape::Cuboid { half_extents } => {
                // Extent of a rotated box along each world axis
                let m = glam::Mat3::from_quat(rotation);
                let world_half = Vec3::new(
                    m.row(0).abs().dot(half_extents),
                    m.row(1).abs().dot(half_extents),
                    m.row(2).abs().dot(half_extents),
                );
                Aabb::from_center_half_extents(position, world_half)
            }
        }
    }
}

/// Penetration between two shapes. `normal` points from the second shape
/// towards the first, so moving the first along it separates them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub normal: Vec3,
    pub depth: f32,
}

pub fn sphere_sphere(pa: Vec3, ra: f32, pb: Vec3, rb: f32) -> Option<Penetration> {
    let delta = pa - pb;
    let dist_sq = delta.length_squared();
    let reach = ra + rb;
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };
    Some(Penetration {
        normal,
        depth: reach - dist,
    })
}

/// Sphere against an oriented box
pub fn sphere_cuboid(
    center: Vec3,
    radius: f32,
    box_pos: Vec3,
    box_rot: Quat,
    half_extents: Vec3,
) -> Option<Penetration> {
    let local = box_rot.inverse() * (center - box_pos);
    let closest = local.clamp(-half_extents, half_extents);
    let delta = local - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 1e-12 {
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Penetration {
            normal: box_rot * (delta / dist),
            depth: radius - dist,
        });
    }

    // Centre inside the box: leave through the nearest face
    let to_face = half_extents - local.abs();
    let (axis, gap) = if to_face.x <= to_face.y && to_face.x <= to_face.z {
        (Vec3::X * local.x.signum(), to_face.x)
    } else if to_face.y <= to_face.z {
        (Vec3::Y * local.y.signum(), to_face.y)
    } else {
        (Vec3::Z * local.z.signum(), to_face.z)
    };
    Some(Penetration {
        normal: box_rot * axis,
        depth: gap + radius,
    })
}

/// Narrowphase dispatch; box-box pairs never occur in this scene
pub fn penetration(
    shape_a: &Shape,
    pos_a: Vec3,
    rot_a: Quat,
    shape_b: &Shape,
    pos_b: Vec3,
    rot_b: Quat,
) -> Option<Penetration> {
    match (*shape_a, *shape_b) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(pos_a, ra, pos_b, rb)
        }
        (Shape::Sphere { radius }, Shape::Cuboid { half_extents }) => {
            sphere_cuboid(pos_a, radius, pos_b, rot_b, half_extents)
        }
        (Shape::Cuboid { half_extents }, Shape::Sphere { radius }) => {
            sphere_cuboid(pos_b, radius, pos_a, rot_a, half_extents).map(|p| Penetration {
                normal: -p.normal,
                depth: p.depth,
            })
        }
        (Shape::Cuboid { .. }, Shape::Cuboid { .. }) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap_and_contains() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center_half_extents(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE);
        let c = Aabb::from_center_half_extents(Vec3::new(3.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(Vec3::splat(0.9)));
        assert!(!a.contains(Vec3::new(0.0, 1.1, 0.0)));
    }

    #[test]
    fn test_rotated_cuboid_aabb_grows() {
        let shape = Shape::Cuboid {
            half_extents: Vec3::new(1.0, 0.1, 0.1),
        };
        let flat = shape.aabb(Vec3::ZERO, Quat::IDENTITY);
        let turned = shape.aabb(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((flat.max.x - 1.0).abs() < 1e-5);
        assert!((turned.max.z - 1.0).abs() < 1e-5, "Long axis now points along z");
        assert!(turned.max.x < 0.2);
    }

    #[test]
    fn test_sphere_sphere_penetration() {
        let hit = sphere_sphere(Vec3::new(0.8, 0.0, 0.0), 0.5, Vec3::ZERO, 0.5)
            .expect("Spheres overlap");
        assert!((hit.depth - 0.2).abs() < 1e-5);
        assert!((hit.normal - Vec3::X).length() < 1e-5, "Normal points at first sphere");
        assert!(sphere_sphere(Vec3::new(2.0, 0.0, 0.0), 0.5, Vec3::ZERO, 0.5).is_none());
    }

    #[test]
    fn test_sphere_resting_on_box_face() {
        let hit = sphere_cuboid(
            Vec3::new(0.0, 0.45, 0.0),
            0.5,
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(1.0, 0.04, 1.0),
        )
        .expect("Sphere dips into the box");
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
        assert!((hit.depth - 0.09).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_centre_inside_box_exits_nearest_face() {
        let hit = sphere_cuboid(
            Vec3::new(0.0, 0.0, 0.05),
            0.1,
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(1.0, 1.0, 0.08),
        )
        .expect("Centre inside");
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!((hit.depth - 0.13).abs() < 1e-5);
    }

    #[test]
    fn test_dispatch_flips_normal_for_box_first() {
        let sphere = Shape::Sphere { radius: 0.5 };
        let cuboid = Shape::Cuboid {
            half_extents: Vec3::splat(0.5),
        };
        let p = Vec3::new(0.0, 0.9, 0.0);
        let hit = penetration(&cuboid, Vec3::ZERO, Quat::IDENTITY, &sphere, p, Quat::IDENTITY)
            .expect("Overlap");
        assert!((hit.normal + Vec3::Y).length() < 1e-5);
        assert!(penetration(&cuboid, Vec3::ZERO, Quat::IDENTITY, &cuboid, p, Quat::IDENTITY).is_none());
    }
}
