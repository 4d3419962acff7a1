// --- Display ---
pub const DEFAULT_DISPLAY_WIDTH: f64 = 800.0;
pub const DEFAULT_DISPLAY_HEIGHT: f64 = 600.0;
pub const TICKS_PER_SECOND: u64 = 60;

// --- Ship ---
pub const SHIP_LIVES: i32 = 3;
pub const SHIP_DEFAULT_SCALE: f64 = 2.0;
pub const SHIP_DEFAULT_SPEED: f64 = 3.0;
pub const SHIP_DIMENSION: f64 = 20.0;
pub const SHIP_THICKNESS: f64 = 3.0;
pub const DIRECTION_STEP: f64 = 0.05; // Radians per tick while turning
pub const MAX_ANGLE: f64 = 2.0 * std::f64::consts::PI;
pub const INVULNERABILITY_FRAMES: u32 = 60;
pub const FLICKER_PERIOD_FRAMES: u32 = 7;
// Wing tips and inner notches sit this far off the heading, in degrees
pub const WING_ANGLE_DEG: f64 = 165.0;
pub const NOTCH_ANGLE_DEG: f64 = 175.0;
pub const NOTCH_RADIUS_FACTOR: f64 = 2.0 / 3.0;

// --- Blasts ---
pub const BLAST_MAX: usize = 30;
pub const BLAST_SIZE: f64 = 20.0;
pub const BLAST_SPEED: f64 = 10.0;
pub const BLAST_THICKNESS: f64 = 3.0;

// --- Asteroids ---
pub const ASTEROID_MAX: usize = 100;
pub const ASTEROID_DIMENSION: f64 = 20.0;
pub const ASTEROID_BASE_SPEED: f64 = 5.0; // speed = base - scale
pub const ASTEROID_THICKNESS: f64 = 3.0;
pub const INITIAL_ASTEROIDS: usize = 5;
pub const ASTEROID_MIN_SCALE: f64 = 1.0;
pub const ASTEROID_SCALE_STEP: f64 = 0.2;
pub const ASTEROID_SCALE_STEPS: u32 = 11; // 1.0 ..= 3.2
pub const HEADING_STEPS: u32 = 100;
pub const SPLIT_POSITION_JITTER: f64 = 50.0;
pub const SPLIT_HEADING_JITTER: f64 = 0.5;

pub const ASTEROID_VERTICES: [(f64, f64); 12] = [
    (-20.0, 20.0),
    (-25.0, 5.0),
    (-25.0, -10.0),
    (-5.0, -10.0),
    (-10.0, -20.0),
    (5.0, -20.0),
    (20.0, -10.0),
    (20.0, -5.0),
    (0.0, 0.0),
    (20.0, 10.0),
    (10.0, 20.0),
    (0.0, 15.0),
];

pub const SHIP_OUTLINE: [((f64, f64), (f64, f64)); 4] = [
    ((-8.0, 9.0), (0.0, -11.0)),
    ((0.0, -11.0), (8.0, 9.0)),
    ((-6.0, 4.0), (-1.0, 4.0)),
    ((6.0, 4.0), (1.0, 4.0)),
];

// --- Scoring ---
pub const SCORE_PER_ASTEROID: u32 = 100;

// --- High scores ---
pub const NUM_SCORES: usize = 8;
pub const MAX_NAME_LEN: usize = 24;
pub const DEFAULT_SCORES: [u32; NUM_SCORES] = [666, 512, 440, 256, 192, 128, 64, 42];
pub const DEFAULT_HISCORE_NAME: &str = "Nobody";
pub const HISCORE_SECTION: &str = "hiscore";

// --- Terminal input ---
pub const KEY_HOLD_TICKS: u64 = 45; // Synthetic key release; must outlast the OS auto-repeat delay
pub const DEFAULT_DEBUG_FRAMES: u64 = 120;
