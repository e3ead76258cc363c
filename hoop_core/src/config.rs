use crate::Params;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Game configuration
///
/// Every field falls back to its [`Params`] value when missing from JSON, so
/// hosts only need to override what they tune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gravity: f32,
    pub solver_iterations: usize,
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub ball_linear_damping: f32,
    pub spawn_delay: f32,
    pub retire_y: f32,
    pub hoop_position: Vec3,
    pub rim_radius: f32,
    pub rim_segments: usize,
    pub net_rows: usize,
    pub net_cols: usize,
    pub net_compliance: f32,
    pub miss_y: f32,
    pub score_notify_delay: f32,
    pub round_seconds: u32,
    pub game_over_delay: f32,
    pub leaderboard_top_n: usize,
    pub event_tag: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravity: Params::GRAVITY,
            solver_iterations: Params::SOLVER_ITERATIONS,
            ball_radius: Params::BALL_RADIUS,
            ball_mass: Params::BALL_MASS,
            ball_linear_damping: Params::BALL_LINEAR_DAMPING,
            spawn_delay: Params::SPAWN_DELAY,
            retire_y: Params::RETIRE_Y,
            hoop_position: Vec3::new(Params::HOOP_X, Params::HOOP_Y, Params::HOOP_Z),
            rim_radius: Params::RIM_RADIUS,
            rim_segments: Params::RIM_SEGMENTS,
            net_rows: Params::NET_ROWS,
            net_cols: Params::NET_COLS,
            net_compliance: Params::NET_COMPLIANCE,
            miss_y: Params::MISS_Y,
            score_notify_delay: Params::SCORE_NOTIFY_DELAY,
            round_seconds: Params::ROUND_SECONDS,
            game_over_delay: Params::GAME_OVER_DELAY,
            leaderboard_top_n: Params::LEADERBOARD_TOP_N,
            event_tag: "shootout".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, -self.gravity, 0.0)
    }

    /// Radius of the vertical column a basket must drop through
    pub fn column_radius(&self) -> f32 {
        self.rim_radius * Params::COLUMN_FACTOR
    }

    /// Radius of the pointer hit sphere around the pending ball
    pub fn hitbox_radius(&self) -> f32 {
        self.ball_radius * Params::HITBOX_SCALE
    }
}
