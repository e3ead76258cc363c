use crate::physics::PhysicsWorld;
use crate::systems::aim::{AimController, AimPreview};
use crate::systems::camera::CameraDirector;
use crate::systems::lifecycle::{clear_balls, launch_ball, pending_ball, spawn_ball};
use crate::{
    step, Ball, BallState, Config, Events, GameError, GameEvent, GameRng, HoopAssembly,
    NetSimulation, Time, TimerKind, Timers, Transform,
};
use glam::{Quat, Vec2, Vec3};
use hecs::{Entity, World};

/// Render-side view of one ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub rotation: Quat,
    pub state: BallState,
}

/// Owns the whole scene: physics, hoop, net, balls, camera and aim
pub struct HoopGame {
    pub world: World,
    pub physics: PhysicsWorld,
    pub time: Time,
    pub config: Config,
    pub hoop: HoopAssembly,
    pub net: NetSimulation,
    pub camera: CameraDirector,
    pub aim: AimController,
    pub events: Events,
    pub timers: Timers,
    pub rng: GameRng,
    active: bool,
}

impl HoopGame {
    pub fn new(config: Config, seed: u64) -> Self {
        let mut physics = PhysicsWorld::new(config.gravity_vector(), config.solver_iterations);
        let hoop = HoopAssembly::build(&mut physics, &config);
        let net = NetSimulation::build(&mut physics, hoop.rim_center(), hoop.rim_radius(), &config);

        let mut game = Self {
            world: World::new(),
            physics,
            time: Time::default(),
            config,
            hoop,
            net,
            camera: CameraDirector::default(),
            aim: AimController::new(),
            events: Events::new(),
            timers: Timers::new(),
            rng: GameRng::new(seed),
            active: true,
        };
        game.spawn_pending();
        game
    }

    fn spawn_pending(&mut self) {
        match spawn_ball(
            &mut self.world,
            &mut self.physics,
            &mut self.rng,
            &self.config,
            &mut self.events,
        ) {
            Ok(ball) => {
                if let Ok(transform) = self.world.get::<&Transform>(ball) {
                    self.camera.retarget(transform.position, self.hoop.rim_center());
                }
            }
            Err(e) => log::debug!("spawn skipped: {}", e),
        }
    }

    /// One rendered frame: exactly one fixed physics step, then timers
    /// advanced by the real `elapsed` seconds.
    pub fn frame(&mut self, elapsed: f32) {
        step(
            &mut self.world,
            &mut self.physics,
            &mut self.time,
            &self.hoop,
            &mut self.net,
            &mut self.camera,
            &self.config,
            &mut self.events,
            &mut self.timers,
        );

        for fired in self.timers.advance(elapsed.max(0.0)) {
            match fired {
                TimerKind::SpawnBall => {
                    if self.active {
                        self.spawn_pending();
                    }
                }
                TimerKind::NotifyScore(ball) => self.events.push(GameEvent::Score { ball }),
            }
        }
    }

    /// Pointer pressed at `ndc` (for picking) / `screen` (pixels)
    pub fn pointer_down(&mut self, ndc: Vec2, screen: Vec2) -> bool {
        let ray = self.camera.screen_ray(ndc);
        let pending = pending_ball(&self.world);
        self.aim
            .pointer_down(&ray, screen, pending, &self.config, &mut self.camera)
    }

    pub fn pointer_move(&mut self, screen: Vec2) -> Option<&AimPreview> {
        self.aim
            .pointer_move(screen, &self.camera, &self.hoop, &self.config)
    }

    /// Release the drag; returns the launched ball, if any
    pub fn pointer_up(&mut self, screen: Vec2) -> Option<Entity> {
        let command = self.aim.pointer_up(screen, &mut self.camera, &mut self.rng)?;
        match self.launch(command.velocity, command.spin) {
            Ok(ball) => Some(ball),
            Err(e) => {
                log::warn!("launch failed: {}", e);
                None
            }
        }
    }

    /// Launch the pending ball and queue the next one
    pub fn launch(&mut self, velocity: Vec3, spin: Vec3) -> Result<Entity, GameError> {
        let ball = launch_ball(
            &mut self.world,
            &mut self.physics,
            velocity,
            spin,
            &mut self.events,
        )?;
        self.timers.schedule(self.config.spawn_delay, TimerKind::SpawnBall);
        Ok(ball)
    }

    /// Allow or stop new balls from spawning (round clock)
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fresh scene for a new round: no balls, no timers, one pending ball
    pub fn reset(&mut self) {
        clear_balls(&mut self.world, &mut self.physics);
        self.timers.clear();
        self.events.clear();
        self.aim.cancel(&mut self.camera);
        self.active = true;
        self.spawn_pending();
        log::info!("scene reset");
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn pending_ball(&self) -> Option<(Entity, Vec3)> {
        pending_ball(&self.world)
    }

    pub fn balls(&self) -> Vec<BallSnapshot> {
        self.world
            .query::<(&Ball, &Transform)>()
            .iter()
            .map(|(entity, (ball, transform))| BallSnapshot {
                entity,
                position: transform.position,
                rotation: transform.rotation,
                state: ball.state,
            })
            .collect()
    }
}
