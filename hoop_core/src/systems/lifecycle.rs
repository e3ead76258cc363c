use crate::physics::{BodyKind, CollisionGroups, PhysicsWorld, RigidBody};
use crate::{
    Ball, BallState, Config, Events, GameError, GameEvent, GameRng, Params, PhysicsBody, Transform,
};
use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;

/// The ball currently waiting for a shot, if any
pub fn pending_ball(world: &World) -> Option<(Entity, Vec3)> {
    world
        .query::<(&Ball, &Transform)>()
        .iter()
        .find(|(_e, (ball, _))| ball.is_pending())
        .map(|(e, (_, transform))| (e, transform.position))
}

/// Uniform spawn point in front of the hoop
pub fn spawn_position(rng: &mut GameRng) -> Vec3 {
    Vec3::new(
        rng.0.gen_range(-Params::SPAWN_X_RANGE..=Params::SPAWN_X_RANGE),
        rng.0.gen_range(Params::SPAWN_Y_MIN..=Params::SPAWN_Y_MAX),
        rng.0.gen_range(Params::SPAWN_Z_MIN..=Params::SPAWN_Z_MAX),
    )
}

/// Create the next pending ball. Only one may wait at a time.
pub fn spawn_ball(
    world: &mut World,
    physics: &mut PhysicsWorld,
    rng: &mut GameRng,
    config: &Config,
    events: &mut Events,
) -> Result<Entity, GameError> {
    if pending_ball(world).is_some() {
        return Err(GameError::PendingBallExists);
    }

    let position = spawn_position(rng);
    let body = physics.add_body(
        RigidBody::sphere(position, config.ball_radius, config.ball_mass)
            .with_kind(BodyKind::Kinematic)
            .with_damping(config.ball_linear_damping)
            .with_groups(CollisionGroups::ball()),
    );
    let ball = world.spawn((
        Ball::new(config.ball_radius),
        Transform::at(position),
        PhysicsBody(body),
    ));

    log::debug!("ball spawned at {:?}", position);
    events.push(GameEvent::BallSpawned { ball, position });
    Ok(ball)
}

/// Hand the pending ball to the simulation with the given velocity and spin
pub fn launch_ball(
    world: &mut World,
    physics: &mut PhysicsWorld,
    velocity: Vec3,
    spin: Vec3,
    events: &mut Events,
) -> Result<Entity, GameError> {
    let (ball, _) = pending_ball(world).ok_or(GameError::NoPendingBall)?;
    let handle = world
        .get::<&PhysicsBody>(ball)
        .map(|b| b.0)
        .map_err(|_| GameError::MissingBody)?;

    let body = physics.body_mut(handle).ok_or(GameError::MissingBody)?;
    body.velocity = velocity;
    body.angular_velocity = spin;
    physics.set_kind(handle, BodyKind::Dynamic);

    if let Ok(mut state) = world.get::<&mut Ball>(ball) {
        state.state = BallState::Live;
    }

    log::debug!("ball launched with velocity {:?}", velocity);
    events.push(GameEvent::BallLaunched { ball, velocity });
    Ok(ball)
}

/// Copy body poses into render transforms
pub fn sync_balls(world: &mut World, physics: &PhysicsWorld) {
    for (_entity, (transform, body)) in world.query_mut::<(&mut Transform, &PhysicsBody)>() {
        if let Some(rb) = physics.body(body.0) {
            transform.position = rb.position;
            transform.rotation = rb.rotation;
        }
    }
}

/// Remove launched balls that fell past the floor threshold
pub fn retire_fallen_balls(
    world: &mut World,
    physics: &mut PhysicsWorld,
    config: &Config,
    events: &mut Events,
) -> usize {
    let fallen: Vec<(Entity, PhysicsBody)> = world
        .query::<(&Ball, &Transform, &PhysicsBody)>()
        .iter()
        .filter(|(_e, (ball, transform, _))| {
            ball.is_launched() && transform.position.y < config.retire_y
        })
        .map(|(e, (_, _, body))| (e, *body))
        .collect();

    for (entity, body) in &fallen {
        physics.remove_body(body.0);
        let _ = world.despawn(*entity);
        log::debug!("ball {:?} retired", entity);
        events.push(GameEvent::BallRetired { ball: *entity });
    }
    fallen.len()
}

/// Remove every ball, pending or not
pub fn clear_balls(world: &mut World, physics: &mut PhysicsWorld) {
    let balls: Vec<(Entity, PhysicsBody)> = world
        .query::<(&Ball, &PhysicsBody)>()
        .iter()
        .map(|(e, (_, body))| (e, *body))
        .collect();
    for (entity, body) in balls {
        physics.remove_body(body.0);
        let _ = world.despawn(entity);
    }
}
