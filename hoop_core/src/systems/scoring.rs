use crate::{
    Ball, BallState, Config, Events, GameEvent, HoopAssembly, Params, TimerKind, Timers,
    Transform,
};
use hecs::World;

/// What the detector decided about one ball this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalCheck {
    Nothing,
    Basket,
    Miss,
}

/// Pure per-ball rule: updates the ball's flags and reports a transition
pub fn evaluate_ball(
    ball: &mut Ball,
    y: f32,
    horizontal_distance: f32,
    rim_y: f32,
    column_radius: f32,
    miss_y: f32,
) -> GoalCheck {
    if ball.state != BallState::Live {
        return GoalCheck::Nothing;
    }

    let in_column = horizontal_distance < column_radius;
    if in_column && y > rim_y {
        ball.entered_rim = true;
    }

    if in_column && ball.entered_rim && y < rim_y && y > rim_y - Params::SCORE_BAND {
        ball.state = BallState::Scored;
        return GoalCheck::Basket;
    }

    if !ball.entered_rim && !ball.miss_registered && y < miss_y {
        ball.miss_registered = true;
        return GoalCheck::Miss;
    }

    GoalCheck::Nothing
}

/// Detect baskets and misses for every launched ball
pub fn check_goals(
    world: &mut World,
    hoop: &HoopAssembly,
    config: &Config,
    events: &mut Events,
    timers: &mut Timers,
) {
    let rim_y = hoop.rim_center().y;
    let column_radius = hoop.column_radius();

    for (entity, (ball, transform)) in world.query_mut::<(&mut Ball, &Transform)>() {
        let y = transform.position.y;
        let d = hoop.horizontal_distance(transform.position);

        match evaluate_ball(ball, y, d, rim_y, column_radius, config.miss_y) {
            GoalCheck::Basket => {
                log::info!("basket by ball {:?}", entity);
                events.push(GameEvent::Swish {
                    ball: entity,
                    rim: hoop.rim_center(),
                });
                timers.schedule(config.score_notify_delay, TimerKind::NotifyScore(entity));
            }
            GoalCheck::Miss => {
                log::info!("miss by ball {:?}", entity);
                events.push(GameEvent::Miss { ball: entity });
            }
            GoalCheck::Nothing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsWorld;
    use glam::Vec3;

    fn setup_world() -> (World, HoopAssembly, Config, Events, Timers) {
        let config = Config::new();
        let mut physics = PhysicsWorld::default();
        let hoop = HoopAssembly::build(&mut physics, &config);
        (World::new(), hoop, config, Events::new(), Timers::new())
    }

    fn live_ball(world: &mut World, position: Vec3) -> hecs::Entity {
        let mut ball = Ball::new(0.5);
        ball.state = BallState::Live;
        world.spawn((ball, Transform::at(position)))
    }

    fn move_ball(world: &mut World, entity: hecs::Entity, position: Vec3) {
        world.get::<&mut Transform>(entity).expect("Transform").position = position;
    }

    #[test]
    fn test_ball_dropping_through_rim_scores_once() {
        let (mut world, hoop, config, mut events, mut timers) = setup_world();
        let ball = live_ball(&mut world, Vec3::new(0.1, 12.4, 5.0));

        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert!(world.get::<&Ball>(ball).expect("Ball").entered_rim, "Above the rim inside column");
        assert!(events.is_empty());

        move_ball(&mut world, ball, Vec3::new(0.1, 11.7, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert_eq!(world.get::<&Ball>(ball).expect("Ball").state, BallState::Scored);
        assert_eq!(events.drain(), vec![GameEvent::Swish { ball, rim: hoop.rim_center() }]);
        assert!(timers.is_scheduled(TimerKind::NotifyScore(ball)));

        // Still in the band next frame: no second basket
        move_ball(&mut world, ball, Vec3::new(0.1, 11.5, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert!(events.is_empty(), "Scored exactly once");
        assert_eq!(timers.len(), 1);

        // And a made basket never turns into a miss
        move_ball(&mut world, ball, Vec3::new(0.1, -3.0, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert!(events.is_empty());
    }

    #[test]
    fn test_score_notification_is_delayed() {
        let (mut world, hoop, config, mut events, mut timers) = setup_world();
        let ball = live_ball(&mut world, Vec3::new(0.0, 12.2, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        move_ball(&mut world, ball, Vec3::new(0.0, 11.9, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);

        assert!(timers.advance(0.9).is_empty(), "Not before one second");
        assert_eq!(timers.advance(0.2), vec![TimerKind::NotifyScore(ball)]);
    }

    #[test]
    fn test_ball_passing_under_rim_is_a_miss() {
        let (mut world, hoop, config, mut events, mut timers) = setup_world();
        // Rises into the column from below: never entered from above
        let ball = live_ball(&mut world, Vec3::new(0.0, 11.5, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert!(events.is_empty(), "Below the rim without entering is not a basket");

        move_ball(&mut world, ball, Vec3::new(0.0, -0.6, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert_eq!(events.drain(), vec![GameEvent::Miss { ball }]);

        move_ball(&mut world, ball, Vec3::new(0.0, -5.0, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert!(events.is_empty(), "Miss registered exactly once");
    }

    #[test]
    fn test_outside_column_never_scores() {
        let (mut world, hoop, config, mut events, mut timers) = setup_world();
        let ball = live_ball(&mut world, Vec3::new(0.7, 12.5, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        move_ball(&mut world, ball, Vec3::new(0.7, 11.8, 5.0));
        check_goals(&mut world, &hoop, &config, &mut events, &mut timers);
        assert!(events.is_empty(), "0.7 from centre is outside the 0.675 column");
        assert!(!world.get::<&Ball>(ball).expect("Ball").entered_rim);
    }

    #[test]
    fn test_entered_then_bounced_out_is_not_a_miss() {
        let mut ball = Ball::new(0.5);
        ball.state = BallState::Live;
        evaluate_ball(&mut ball, 12.5, 0.2, 12.0, 0.675, -0.5);
        // Rims out and falls away outside the column
        let result = evaluate_ball(&mut ball, -1.0, 3.0, 12.0, 0.675, -0.5);
        assert_eq!(result, GoalCheck::Nothing);
        assert!(!ball.miss_registered);
    }

    #[test]
    fn test_pending_ball_is_ignored() {
        let mut ball = Ball::new(0.5);
        assert_eq!(evaluate_ball(&mut ball, -1.0, 0.0, 12.0, 0.675, -0.5), GoalCheck::Nothing);
        assert!(!ball.miss_registered);
    }
}
