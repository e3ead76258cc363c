/// Game tuning parameters for the shootout
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Physics
    pub const GRAVITY: f32 = 20.0;
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    pub const SOLVER_ITERATIONS: usize = 50;
    pub const ANGULAR_DAMPING: f32 = 0.01;

    // Contact materials
    pub const HARD_FRICTION: f32 = 0.1;
    pub const HARD_RESTITUTION: f32 = 0.6;
    pub const NET_FRICTION: f32 = 0.01;
    pub const NET_RESTITUTION: f32 = 0.0;

    // Ball
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_MASS: f32 = 0.6;
    pub const BALL_LINEAR_DAMPING: f32 = 0.1;
    pub const SPAWN_X_RANGE: f32 = 6.0; // x in [-6, 6]
    pub const SPAWN_Y_MIN: f32 = 8.0;
    pub const SPAWN_Y_MAX: f32 = 12.0;
    pub const SPAWN_Z_MIN: f32 = 8.0;
    pub const SPAWN_Z_MAX: f32 = 14.0;
    pub const SPAWN_DELAY: f32 = 1.5; // seconds after a launch
    pub const RETIRE_Y: f32 = -15.0;

    // Hoop
    pub const HOOP_X: f32 = 0.0;
    pub const HOOP_Y: f32 = 12.0;
    pub const HOOP_Z: f32 = 5.0;
    pub const RIM_RADIUS: f32 = 0.75;
    pub const RIM_SEGMENTS: usize = 16;
    pub const RIM_SEGMENT_HALF_EXTENTS: [f32; 3] = [0.04, 0.04, 0.1];
    pub const BACKBOARD_SIZE: [f32; 3] = [3.6, 2.6, 0.08];
    pub const BACKBOARD_RISE: f32 = 1.3;
    pub const BACKBOARD_SETBACK: f32 = 1.2;

    // Net
    pub const NET_ROWS: usize = 6;
    pub const NET_COLS: usize = 14;
    pub const NET_TOP_SCALE: f32 = 0.95;
    pub const NET_TAPER: f32 = 0.065;
    pub const NET_ROW_SPACING: f32 = 0.25;
    pub const NET_PARTICLE_RADIUS: f32 = 0.08;
    pub const NET_PARTICLE_MASS: f32 = 0.03;
    pub const NET_LINEAR_DAMPING: f32 = 0.05;
    pub const NET_COMPLIANCE: f32 = 0.0;

    // Scoring
    pub const COLUMN_FACTOR: f32 = 0.9;
    pub const SCORE_BAND: f32 = 1.0;
    pub const MISS_Y: f32 = -0.5;
    pub const SCORE_NOTIFY_DELAY: f32 = 1.0;

    // Aim
    pub const HITBOX_SCALE: f32 = 3.0;
    pub const FORWARD_BASE: f32 = 6.0;
    pub const FORWARD_GAIN: f32 = 0.025;
    pub const UP_BASE: f32 = 11.0;
    pub const UP_GAIN: f32 = 0.030;
    pub const SIDE_GAIN: f32 = 0.04;
    pub const AIM_LINE_SCALE: f32 = 0.01;
    pub const SPIN_X_MAX: f32 = 10.0;
    pub const SPIN_Z_MAX: f32 = 2.5;
    pub const PREVIEW_STEPS: usize = 50;
    pub const PREVIEW_DT: f32 = 0.055;
    pub const PREVIEW_FLOOR: f32 = -5.0;
    pub const PREVIEW_NEAR_RADIUS: f32 = 0.95;
    pub const PREVIEW_NEAR_HEIGHT: f32 = 0.8;
    pub const PREVIEW_AT_RADIUS: f32 = 1.15;
    pub const PREVIEW_AT_HEIGHT: f32 = 1.0;

    // Camera
    pub const CAMERA_DISTANCE: f32 = 11.0;
    pub const CAMERA_HEIGHT: f32 = 1.5;
    pub const ORBIT_TARGET_DROP: f32 = 4.0;
    pub const CAMERA_LERP: f32 = 0.05;
    pub const CAMERA_SNAP: f32 = 0.1;
    pub const CAMERA_FOV_Y: f32 = std::f32::consts::FRAC_PI_3; // 60 degrees
    pub const ORBIT_MIN_DISTANCE: f32 = 5.0;
    pub const ORBIT_MAX_DISTANCE: f32 = 50.0;
    pub const ORBIT_MAX_POLAR: f32 = std::f32::consts::FRAC_PI_2 - 0.05;

    // Session
    pub const ROUND_SECONDS: u32 = 60;
    pub const GAME_OVER_DELAY: f32 = 0.6;
    pub const PRAISE_SECONDS: f32 = 1.4;
    pub const MISS_FEEDBACK_SECONDS: f32 = 1.2;
    pub const STREAK_BADGE_MIN: u32 = 2;
    pub const LEADERBOARD_TOP_N: usize = 5;
    pub const NAME_MAX_CHARS: usize = 15;
}
