pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod hoop;
pub mod leaderboard;
pub mod net;
pub mod params;
pub mod physics;
pub mod resources;
pub mod session;
pub mod systems;

pub use components::*;
pub use config::Config;
pub use error::{GameError, SessionError, StoreError};
pub use game::{BallSnapshot, HoopGame};
pub use hoop::HoopAssembly;
pub use net::NetSimulation;
pub use params::*;
pub use resources::*;

use hecs::World;
use physics::PhysicsWorld;
use systems::*;

/// Run one fixed step of the shootout simulation
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    physics: &mut PhysicsWorld,
    time: &mut Time,
    hoop: &HoopAssembly,
    net: &mut NetSimulation,
    camera: &mut CameraDirector,
    config: &Config,
    events: &mut Events,
    timers: &mut Timers,
) {
    // 1. Integrate bodies and resolve contacts / net links
    physics.step(time.dt);

    // 2. Copy ball poses into transforms
    sync_balls(world, physics);

    // 3. Baskets and misses
    check_goals(world, hoop, config, events, timers);

    // 4. Drop balls that fell out of the scene
    retire_fallen_balls(world, physics, config, events);

    // 5. Refresh the net line buffer
    net.update(physics);

    // 6. Camera glide towards the current ball
    camera.update();

    time.advance();
}
