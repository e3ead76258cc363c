//! Camera choreography
//!
//! Glides the camera behind each new ball, facing the hoop, and owns the
//! orbit controls the player can use between shots.

use crate::Params;
use glam::{Mat4, Vec2, Vec3};

/// Pointer ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3, // unit length
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn hits_sphere(&self, center: Vec3, radius: f32) -> bool {
        let t = (center - self.origin).dot(self.direction).max(0.0);
        let closest = self.origin + self.direction * t;
        closest.distance_squared(center) <= radius * radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Retarget {
    position: Vec3,
    target: Vec3,
}

#[derive(Debug, Clone)]
pub struct CameraDirector {
    position: Vec3,
    target: Vec3, // look-at / orbit centre
    retarget: Option<Retarget>,
    orbit_enabled: bool,
    aspect: f32,
}

impl Default for CameraDirector {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 14.0, 20.0), Vec3::new(0.0, 8.0, 5.0))
    }
}

impl CameraDirector {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            retarget: None,
            orbit_enabled: true,
            aspect: 16.0 / 9.0,
        }
    }

    /// Where the camera should settle for a ball at `ball`
    pub fn framing_for(ball: Vec3, hoop: Vec3) -> (Vec3, Vec3) {
        let away = Vec3::new(ball.x - hoop.x, 0.0, ball.z - hoop.z).normalize_or_zero();
        let away = if away == Vec3::ZERO { Vec3::Z } else { away };
        let mut position = ball + away * Params::CAMERA_DISTANCE;
        position.y = ball.y + Params::CAMERA_HEIGHT;
        let target = hoop - Vec3::new(0.0, Params::ORBIT_TARGET_DROP, 0.0);
        (position, target)
    }

    /// Start gliding behind a freshly spawned ball
    pub fn retarget(&mut self, ball: Vec3, hoop: Vec3) {
        let (position, target) = Self::framing_for(ball, hoop);
        self.retarget = Some(Retarget { position, target });
    }

    /// Advance the glide by one frame
    pub fn update(&mut self) {
        let Some(goal) = self.retarget else { return };
        self.position = self.position.lerp(goal.position, Params::CAMERA_LERP);
        self.target = self.target.lerp(goal.target, Params::CAMERA_LERP);
        if self.position.distance(goal.position) < Params::CAMERA_SNAP {
            self.retarget = None;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.retarget.is_some()
    }

    /// User orbit input. Ignored while aiming; cancels any glide in progress.
    pub fn orbit(&mut self, yaw: f32, pitch: f32, zoom: f32) -> bool {
        if !self.orbit_enabled {
            return false;
        }
        self.retarget = None;

        let offset = self.position - self.target;
        let radius = (offset.length() * zoom.max(0.01))
            .clamp(Params::ORBIT_MIN_DISTANCE, Params::ORBIT_MAX_DISTANCE);
        let azimuth = offset.x.atan2(offset.z) + yaw;
        let polar = (offset.y / offset.length().max(1e-6)).clamp(-1.0, 1.0).acos() + pitch;
        let polar = polar.clamp(0.01, Params::ORBIT_MAX_POLAR);

        self.position = self.target
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );
        true
    }

    pub fn set_orbit_enabled(&mut self, enabled: bool) {
        self.orbit_enabled = enabled;
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Forward flattened onto the ground plane
    pub fn flat_forward(&self) -> Vec3 {
        let f = self.forward();
        let flat = Vec3::new(f.x, 0.0, f.z).normalize_or_zero();
        if flat == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            flat
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(Params::CAMERA_FOV_Y, self.aspect, 0.1, 1000.0)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World ray under a pointer given in normalized device coordinates
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray::new(self.position, far - near)
    }
}
