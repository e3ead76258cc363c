use super::body::{BodyHandle, BodyKind, Material, RigidBody};
use super::broadphase::SweepAndPrune;
use super::constraint::DistanceConstraint;
use super::shape::{penetration, Aabb};
use crate::Params;
use glam::{Quat, Vec3};

/// Contact found at the start of a solver pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BodyHandle,
    pub b: BodyHandle,
    /// Points from `b` towards `a`
    pub normal: Vec3,
    pub depth: f32,
}

#[derive(Debug, Clone, Copy)]
struct ContactMaterial {
    friction: f32,
    restitution: f32,
}

fn contact_material(a: Material, b: Material) -> ContactMaterial {
    match (a, b) {
        (Material::Hard, Material::Hard) => ContactMaterial {
            friction: Params::HARD_FRICTION,
            restitution: Params::HARD_RESTITUTION,
        },
        _ => ContactMaterial {
            friction: Params::NET_FRICTION,
            restitution: Params::NET_RESTITUTION,
        },
    }
}

/// Inverse masses as seen by one contact. A ball is never pushed by the
/// net: net contacts only move the net particle.
fn contact_inv_masses(a: &RigidBody, b: &RigidBody) -> (f32, f32) {
    let (mut wa, mut wb) = (a.inv_mass(), b.inv_mass());
    if a.material == Material::Net && b.material != Material::Net {
        wb = 0.0;
    }
    if b.material == Material::Net && a.material != Material::Net {
        wa = 0.0;
    }
    (wa, wb)
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// Position-based rigid-body world with a fixed iteration count
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    pub gravity: Vec3,
    pub iterations: usize,
    slots: Vec<Slot>,
    free: Vec<u32>,
    constraints: Vec<DistanceConstraint>,
    broadphase: SweepAndPrune,
    contacts: Vec<Contact>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.0, -Params::GRAVITY, 0.0),
            Params::SOLVER_ITERATIONS,
        )
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3, iterations: usize) -> Self {
        Self {
            gravity,
            iterations: iterations.max(1),
            slots: Vec::new(),
            free: Vec::new(),
            constraints: Vec::new(),
            broadphase: SweepAndPrune::new(),
            contacts: Vec::new(),
        }
    }

    pub fn add_body(&mut self, mut body: RigidBody) -> BodyHandle {
        body.prev_position = body.position;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyHandle {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Remove a body together with every constraint that references it
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.constraints.retain(|c| !c.involves(handle));
        Some(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    /// Switch a body between static, kinematic and dynamic
    pub fn set_kind(&mut self, handle: BodyHandle, kind: BodyKind) -> bool {
        match self.body_mut(handle) {
            Some(body) => {
                body.kind = kind;
                body.prev_position = body.position;
                true
            }
            None => false,
        }
    }

    pub fn add_distance_constraint(&mut self, constraint: DistanceConstraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[DistanceConstraint] {
        &self.constraints
    }

    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    /// Contacts detected during the last step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.constraints.clear();
        self.contacts.clear();
        self.broadphase = SweepAndPrune::new();
    }

    /// Advance the world by one fixed step
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        self.integrate(dt);

        let pairs = self.candidate_pairs();
        for c in &mut self.constraints {
            c.lambda = 0.0;
        }
        self.contacts.clear();

        for iteration in 0..self.iterations {
            self.solve_distance_constraints(dt);
            self.solve_contacts(&pairs, iteration == 0);
        }

        self.update_velocities(dt);
        self.solve_velocities(dt);
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            body.prev_position = body.position;
            if !body.is_dynamic() {
                continue;
            }
            body.pre_velocity = body.velocity;
            body.velocity += gravity * dt;
            body.velocity *= (1.0 - body.linear_damping).powf(dt);
            body.angular_velocity *= (1.0 - body.angular_damping).powf(dt);
            body.position += body.velocity * dt;
            body.rotation =
                (Quat::from_scaled_axis(body.angular_velocity * dt) * body.rotation).normalize();
        }
    }

    fn candidate_pairs(&mut self) -> Vec<(usize, usize)> {
        let aabbs: Vec<Option<Aabb>> = self
            .slots
            .iter()
            .map(|s| s.body.as_ref().map(|b| b.aabb().expanded(0.01)))
            .collect();

        let slots = &self.slots;
        self.broadphase
            .find_pairs(&aabbs)
            .into_iter()
            .filter(|&(i, j)| match (&slots[i].body, &slots[j].body) {
                (Some(a), Some(b)) => {
                    (a.is_dynamic() || b.is_dynamic()) && a.groups.interacts_with(&b.groups)
                }
                _ => false,
            })
            .collect()
    }

    fn handle_of(&self, index: usize) -> BodyHandle {
        BodyHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    fn solve_distance_constraints(&mut self, dt: f32) {
        let dt_sq = dt * dt;
        for i in 0..self.constraints.len() {
            let c = self.constraints[i];
            let (Some(a), Some(b)) = (self.body(c.a).copied(), self.body(c.b).copied()) else {
                continue;
            };
            let (wa, wb) = (a.inv_mass(), b.inv_mass());
            let alpha = c.compliance / dt_sq;
            let w_sum = wa + wb + alpha;
            if w_sum <= 1e-9 {
                continue;
            }

            let delta = a.position - b.position;
            let length = delta.length();
            if length <= 1e-6 {
                continue;
            }
            let normal = delta / length;
            let error = length - c.rest_length;
            let d_lambda = (-error - alpha * c.lambda) / w_sum;
            self.constraints[i].lambda += d_lambda;

            let correction = normal * d_lambda;
            if let Some(body) = self.body_mut(c.a) {
                body.position += correction * wa;
            }
            if let Some(body) = self.body_mut(c.b) {
                body.position -= correction * wb;
            }
        }
    }

    fn solve_contacts(&mut self, pairs: &[(usize, usize)], record: bool) {
        for &(i, j) in pairs {
            let (Some(a), Some(b)) = (self.slots[i].body, self.slots[j].body) else {
                continue;
            };
            let Some(hit) = penetration(
                &a.shape, a.position, a.rotation, &b.shape, b.position, b.rotation,
            ) else {
                continue;
            };

            if record {
                let contact = Contact {
                    a: self.handle_of(i),
                    b: self.handle_of(j),
                    normal: hit.normal,
                    depth: hit.depth,
                };
                self.contacts.push(contact);
            }

            let (wa, wb) = contact_inv_masses(&a, &b);
            let w_sum = wa + wb;
            if w_sum <= 0.0 {
                continue;
            }
            let correction = hit.normal * (hit.depth / w_sum);
            if let Some(body) = self.slots[i].body.as_mut() {
                body.position += correction * wa;
            }
            if let Some(body) = self.slots[j].body.as_mut() {
                body.position -= correction * wb;
            }
        }
    }

    fn update_velocities(&mut self, dt: f32) {
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if body.is_dynamic() {
                body.velocity = (body.position - body.prev_position) / dt;
            }
        }
    }

    /// Restitution and friction, applied after positions are settled
    fn solve_velocities(&mut self, dt: f32) {
        let rest_threshold = 2.0 * self.gravity.length() * dt;

        for i in 0..self.contacts.len() {
            let contact = self.contacts[i];
            let (Some(a), Some(b)) = (self.body(contact.a).copied(), self.body(contact.b).copied())
            else {
                continue;
            };
            let (wa, wb) = contact_inv_masses(&a, &b);
            let w_sum = wa + wb;
            if w_sum <= 0.0 {
                continue;
            }

            let material = contact_material(a.material, b.material);
            let n = contact.normal;
            let v_rel = a.velocity - b.velocity;
            let vn = v_rel.dot(n);
            let vn_pre = (a.pre_velocity - b.pre_velocity).dot(n);

            let mut dv = Vec3::ZERO;

            let vt = v_rel - n * vn;
            let vt_len = vt.length();
            if vt_len > 1e-6 {
                let limit = material.friction * contact.depth / dt;
                dv -= vt / vt_len * limit.min(vt_len);
            }

            if vn_pre < 0.0 {
                let restitution = if -vn_pre > rest_threshold {
                    material.restitution
                } else {
                    0.0
                };
                dv += n * (-vn + (-restitution * vn_pre).max(0.0));
            }

            if let Some(body) = self.body_mut(contact.a) {
                body.velocity += dv * (wa / w_sum);
            }
            if let Some(body) = self.body_mut(contact.b) {
                body.velocity -= dv * (wb / w_sum);
            }
        }
    }
}
