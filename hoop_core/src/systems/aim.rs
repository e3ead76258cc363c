use super::camera::{CameraDirector, Ray};
use crate::{Config, GameRng, HoopAssembly, Params};
use glam::{Vec2, Vec3};
use hecs::Entity;
use rand::Rng;

/// A drag that started on the pending ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimGesture {
    pub ball: Entity,
    pub ball_position: Vec3,
    pub start: Vec2,   // screen pixels, y down
    pub current: Vec2,
}

impl AimGesture {
    /// Sideways pull, positive when dragged left
    pub fn dx(&self) -> f32 {
        self.start.x - self.current.x
    }

    /// Downward pull in pixels
    pub fn dy(&self) -> f32 {
        self.current.y - self.start.y
    }

    pub fn is_shot(&self) -> bool {
        self.dy() > 0.0
    }
}

/// Ready-to-apply launch for the pending ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchCommand {
    pub ball: Entity,
    pub velocity: Vec3,
    pub spin: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTone {
    /// Early part of the arc, fades gold to orange
    Travel,
    /// Passing the hoop without going through it
    OffTarget,
    /// Passing through the hoop
    OnTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPreview {
    pub points: Vec<Vec3>,
    pub colors: Vec<[f32; 3]>,
    pub tones: Vec<PreviewTone>,
    /// The arc dropped through the rim somewhere
    pub near_hoop: bool,
}

impl TrajectoryPreview {
    /// Colour of the hoop indicator ring
    pub fn hoop_indicator(&self) -> u32 {
        if self.near_hoop {
            0x00ff88
        } else {
            0xff3311
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AimPreview {
    pub aim_line: [Vec3; 2],
    pub trajectory: Option<TrajectoryPreview>,
}

/// Map a drag onto a launch velocity.
///
/// `cam_dir` is the camera forward flattened to the ground plane and
/// `cam_right` is `cam_dir x up`.
pub fn launch_velocity(dx: f32, dy: f32, cam_dir: Vec3, cam_right: Vec3) -> Vec3 {
    let forward = Params::FORWARD_BASE + dy * Params::FORWARD_GAIN;
    let up = Params::UP_BASE + dy * Params::UP_GAIN;
    let side = dx * Params::SIDE_GAIN;
    let horizontal = cam_dir * forward + cam_right * side;
    Vec3::new(horizontal.x, up, horizontal.z)
}

/// Random backspin with a little sidespin
pub fn backspin(rng: &mut GameRng) -> Vec3 {
    Vec3::new(
        -rng.0.gen_range(0.0..=Params::SPIN_X_MAX),
        0.0,
        rng.0.gen_range(-Params::SPIN_Z_MAX..=Params::SPIN_Z_MAX),
    )
}

/// Aim line from the ball, following the drag on screen
pub fn aim_line(ball: Vec3, start: Vec2, current: Vec2) -> [Vec3; 2] {
    let drag = current - start;
    [
        ball,
        Vec3::new(
            ball.x + drag.x * Params::AIM_LINE_SCALE,
            ball.y - drag.y * Params::AIM_LINE_SCALE,
            ball.z,
        ),
    ]
}

fn tone_color(tone: PreviewTone, t: f32) -> [f32; 3] {
    match tone {
        PreviewTone::OnTarget => [0.1, 1.0, 0.5],
        PreviewTone::OffTarget => [1.0, 0.2, 0.1],
        PreviewTone::Travel => [1.0, (0.9 - t * 0.55).max(0.35), (0.35 - t * 0.35).max(0.0)],
    }
}

/// Sample the ballistic arc of a launch, ignoring drag and collisions
pub fn predict_trajectory(
    start: Vec3,
    velocity: Vec3,
    hoop: Vec3,
    rim_radius: f32,
    gravity: f32,
) -> TrajectoryPreview {
    let mut preview = TrajectoryPreview {
        points: Vec::with_capacity(Params::PREVIEW_STEPS),
        colors: Vec::with_capacity(Params::PREVIEW_STEPS),
        tones: Vec::with_capacity(Params::PREVIEW_STEPS),
        near_hoop: false,
    };
    let mut p = start;
    let mut v = velocity;

    // Each sample is one integration step past the launch point
    let last = (Params::PREVIEW_STEPS - 1).max(1) as f32;
    for i in 0..Params::PREVIEW_STEPS {
        v.y -= gravity * Params::PREVIEW_DT;
        p += v * Params::PREVIEW_DT;
        if p.y < Params::PREVIEW_FLOOR {
            break;
        }

        let t = i as f32 / last;
        let d = Vec2::new(p.x - hoop.x, p.z - hoop.z).length();
        let height = (p.y - hoop.y).abs();

        if d < rim_radius * Params::PREVIEW_NEAR_RADIUS && height < Params::PREVIEW_NEAR_HEIGHT {
            preview.near_hoop = true;
        }
        let at_hoop =
            d < rim_radius * Params::PREVIEW_AT_RADIUS && height < Params::PREVIEW_AT_HEIGHT;
        let tone = match (at_hoop, preview.near_hoop) {
            (true, true) => PreviewTone::OnTarget,
            (true, false) => PreviewTone::OffTarget,
            _ => PreviewTone::Travel,
        };

        preview.points.push(p);
        preview.tones.push(tone);
        preview.colors.push(tone_color(tone, t));
    }
    preview
}

/// Turns drags on the pending ball into shots
#[derive(Debug, Clone, Default)]
pub struct AimController {
    gesture: Option<AimGesture>,
    preview: Option<AimPreview>,
}

impl AimController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin aiming if the pointer ray hits the pending ball's enlarged hitbox
    pub fn pointer_down(
        &mut self,
        ray: &Ray,
        screen: Vec2,
        pending: Option<(Entity, Vec3)>,
        config: &Config,
        camera: &mut CameraDirector,
    ) -> bool {
        let Some((ball, ball_position)) = pending else {
            return false;
        };
        if self.gesture.is_some() || !ray.hits_sphere(ball_position, config.hitbox_radius()) {
            return false;
        }

        camera.set_orbit_enabled(false);
        self.gesture = Some(AimGesture {
            ball,
            ball_position,
            start: screen,
            current: screen,
        });
        self.preview = Some(AimPreview {
            aim_line: [ball_position, ball_position],
            trajectory: None,
        });
        true
    }

    /// Update the drag and rebuild the preview
    pub fn pointer_move(
        &mut self,
        screen: Vec2,
        camera: &CameraDirector,
        hoop: &HoopAssembly,
        config: &Config,
    ) -> Option<&AimPreview> {
        let gesture = self.gesture.as_mut()?;
        gesture.current = screen;
        let gesture = *gesture;

        let trajectory = gesture.is_shot().then(|| {
            let cam_dir = camera.flat_forward();
            let velocity = launch_velocity(gesture.dx(), gesture.dy(), cam_dir, cam_dir.cross(Vec3::Y));
            predict_trajectory(
                gesture.ball_position,
                velocity,
                hoop.rim_center(),
                hoop.rim_radius(),
                config.gravity,
            )
        });

        self.preview = Some(AimPreview {
            aim_line: aim_line(gesture.ball_position, gesture.start, gesture.current),
            trajectory,
        });
        self.preview.as_ref()
    }

    /// Finish the drag. A downward pull becomes a shot; anything else cancels.
    pub fn pointer_up(
        &mut self,
        screen: Vec2,
        camera: &mut CameraDirector,
        rng: &mut GameRng,
    ) -> Option<LaunchCommand> {
        let mut gesture = self.gesture.take()?;
        gesture.current = screen;
        self.preview = None;
        camera.set_orbit_enabled(true);

        if !gesture.is_shot() {
            log::debug!("aim cancelled, dy = {}", gesture.dy());
            return None;
        }

        let cam_dir = camera.flat_forward();
        Some(LaunchCommand {
            ball: gesture.ball,
            velocity: launch_velocity(gesture.dx(), gesture.dy(), cam_dir, cam_dir.cross(Vec3::Y)),
            spin: backspin(rng),
        })
    }

    /// Drop any gesture in progress
    pub fn cancel(&mut self, camera: &mut CameraDirector) {
        if self.gesture.take().is_some() {
            camera.set_orbit_enabled(true);
        }
        self.preview = None;
    }

    pub fn is_aiming(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&AimGesture> {
        self.gesture.as_ref()
    }

    pub fn preview(&self) -> Option<&AimPreview> {
        self.preview.as_ref()
    }
}
