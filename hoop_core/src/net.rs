use crate::physics::{
    BodyHandle, CollisionGroups, DistanceConstraint, Material, PhysicsWorld, RigidBody,
};
use crate::{Config, Params};
use glam::Vec3;

/// Cloth-like net hanging from the rim, rendered as line segments
#[derive(Debug, Clone)]
pub struct NetSimulation {
    rows: usize,
    cols: usize,
    particles: Vec<BodyHandle>, // row-major
    vertices: Vec<[f32; 3]>,    // two per segment
}

impl NetSimulation {
    pub fn build(
        physics: &mut PhysicsWorld,
        rim_center: Vec3,
        rim_radius: f32,
        config: &Config,
    ) -> Self {
        let rows = config.net_rows;
        let cols = config.net_cols;
        let top_radius = rim_radius * Params::NET_TOP_SCALE;

        let mut particles = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let radius = top_radius - row as f32 * Params::NET_TAPER;
            let y = rim_center.y - row as f32 * Params::NET_ROW_SPACING;
            for col in 0..cols {
                let angle = col as f32 / cols as f32 * std::f32::consts::TAU;
                let position = Vec3::new(
                    rim_center.x + angle.cos() * radius,
                    y,
                    rim_center.z + angle.sin() * radius,
                );
                // Top row hangs from the rim
                let mass = if row == 0 {
                    0.0
                } else {
                    Params::NET_PARTICLE_MASS
                };
                particles.push(
                    physics.add_body(
                        RigidBody::sphere(position, Params::NET_PARTICLE_RADIUS, mass)
                            .with_damping(Params::NET_LINEAR_DAMPING)
                            .with_groups(CollisionGroups::net())
                            .with_material(Material::Net),
                    ),
                );
            }
        }

        let mut net = Self {
            rows,
            cols,
            particles,
            vertices: Vec::new(),
        };

        for (a, b) in net.links() {
            let (Some(pa), Some(pb)) = (physics.body(a), physics.body(b)) else {
                continue;
            };
            let rest = pa.position.distance(pb.position);
            physics.add_distance_constraint(
                DistanceConstraint::new(a, b, rest).with_compliance(config.net_compliance),
            );
        }

        net.update(physics);
        log::debug!("net built with {} particles", net.particles.len());
        net
    }

    /// Right neighbour (wrapping) for every particle, lower neighbour for
    /// every particle above the last row
    fn links(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut links = Vec::with_capacity(self.segment_count());
        for row in 0..self.rows {
            for col in 0..self.cols {
                let here = self.particles[row * self.cols + col];
                let right = self.particles[row * self.cols + (col + 1) % self.cols];
                links.push((here, right));
                if row + 1 < self.rows {
                    links.push((here, self.particles[(row + 1) * self.cols + col]));
                }
            }
        }
        links
    }

    /// Copy particle positions into the line vertex buffer
    pub fn update(&mut self, physics: &PhysicsWorld) {
        self.vertices.clear();
        for (a, b) in self.links() {
            if let (Some(pa), Some(pb)) = (physics.body(a), physics.body(b)) {
                self.vertices.push(pa.position.to_array());
                self.vertices.push(pb.position.to_array());
            }
        }
    }

    pub fn segment_count(&self) -> usize {
        if self.rows == 0 {
            return 0;
        }
        self.rows * self.cols + (self.rows - 1) * self.cols
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn particle(&self, row: usize, col: usize) -> Option<BodyHandle> {
        if row < self.rows && col < self.cols {
            self.particles.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    pub fn particles(&self) -> &[BodyHandle] {
        &self.particles
    }
}
