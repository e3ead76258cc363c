use glam::Vec3;
use hecs::Entity;

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,  // Fixed physics step
    pub now: f32, // Total simulated time
}

impl Time {
    pub fn new(dt: f32, now: f32) -> Self {
        Self { dt, now }
    }

    pub fn advance(&mut self) {
        self.now += self.dt;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: crate::Params::FIXED_DT,
            now: 0.0,
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Something the presentation layer or the session cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    BallSpawned { ball: Entity, position: Vec3 },
    BallLaunched { ball: Entity, velocity: Vec3 },
    /// Immediate celebration cue, fired the instant a basket is confirmed
    Swish { ball: Entity, rim: Vec3 },
    /// Delayed score notification for the session
    Score { ball: Entity },
    Miss { ball: Entity },
    BallRetired { ball: Entity },
}

/// Events that occurred since the host last drained them
#[derive(Debug, Clone, Default)]
pub struct Events {
    queue: Vec<GameEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Work deferred by a one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    SpawnBall,
    NotifyScore(Entity),
}

/// One-shot timers driven by frame time rather than wall-clock callbacks,
/// so a reset can cancel all of them at once.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    pending: Vec<(f32, TimerKind)>, // (seconds remaining, work)
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: f32, kind: TimerKind) {
        self.pending.push((delay.max(0.0), kind));
    }

    /// Count down and return the timers that expired, in scheduling order
    pub fn advance(&mut self, dt: f32) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        self.pending.retain_mut(|(remaining, kind)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                fired.push(*kind);
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|(_, k)| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_after_delay() {
        let mut timers = Timers::new();
        timers.schedule(1.5, TimerKind::SpawnBall);

        assert!(timers.advance(1.0).is_empty(), "Should not fire early");
        assert!(timers.is_scheduled(TimerKind::SpawnBall));
        assert_eq!(timers.advance(0.5), vec![TimerKind::SpawnBall]);
        assert!(timers.is_empty(), "Fired timers are removed");
    }

    #[test]
    fn test_timers_fire_in_schedule_order() {
        let mut world = hecs::World::new();
        let ball = world.spawn((1u8,));
        let mut timers = Timers::new();
        timers.schedule(0.2, TimerKind::NotifyScore(ball));
        timers.schedule(0.1, TimerKind::SpawnBall);

        let fired = timers.advance(1.0);
        assert_eq!(fired, vec![TimerKind::NotifyScore(ball), TimerKind::SpawnBall]);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut timers = Timers::new();
        timers.schedule(0.1, TimerKind::SpawnBall);
        timers.clear();
        assert!(timers.advance(1.0).is_empty(), "Cleared timers never fire");
    }

    #[test]
    fn test_events_drain() {
        let mut world = hecs::World::new();
        let ball = world.spawn((1u8,));
        let mut events = Events::new();
        events.push(GameEvent::Miss { ball });
        assert_eq!(events.iter().count(), 1);
        assert_eq!(events.drain(), vec![GameEvent::Miss { ball }]);
        assert!(events.is_empty());
    }
}
