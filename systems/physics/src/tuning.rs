//! Tuning constants for the fixed-step actor physics.
//!
//! Every gameplay-affecting value lives here so the integrator, the jump
//! helpers, and the behavior systems agree on one set of numbers. Times are
//! seconds, lengths are world pixels, speeds are pixels per second.

/// Fixed simulation step for actor physics.
pub const STEP: f32 = 1.0 / 120.0;

/// Upper bound on substeps drained per rendered frame by the outer loop.
pub const MAX_SUBSTEPS: u32 = 5;

/// Downward acceleration applied to airborne actors.
pub const GRAVITY: f32 = 1500.0;

/// Terminal fall speed for actors.
pub const MAX_FALL_SPEED: f32 = 780.0;

/// Maximum horizontal actor speed.
pub const MAX_VEL_X: f32 = 260.0;

/// Horizontal acceleration while grounded and steering.
pub const MOVE_ACC: f32 = 1800.0;

/// Fraction of [`MOVE_ACC`] available while airborne.
pub const AIR_ACCEL_SCALE: f32 = 0.6;

/// Fraction of [`MOVE_ACC`] used to decelerate toward rest on the ground.
pub const GROUND_DECEL_SCALE: f32 = 0.9;

/// Fraction of [`MOVE_ACC`] used to decelerate toward rest in the air.
pub const AIR_DECEL_SCALE: f32 = 0.3;

/// Instantaneous vertical velocity applied by a jump (negative is up).
pub const JUMP_VEL: f32 = -520.0;

/// Fraction of [`MAX_VEL_X`] kicked away from the wall by a wall-jump.
pub const WALL_JUMP_KICK_SCALE: f32 = 0.8;

/// Grace window after leaving a platform during which a jump still succeeds.
pub const COYOTE_TIME: f32 = 0.085;

/// Window during which an early jump press stays armed.
pub const JUMP_BUFFER: f32 = 0.1;

/// Post-landing window suppressing an immediate re-jump.
pub const JUMP_COOLDOWN: f32 = 0.06;

/// Post-landing lock during which `just_landed` stays set.
pub const JUMP_LOCK: f32 = 0.04;

/// A jump is refused while ascending faster than this (negative is up).
pub const JUMP_RISE_GATE: f32 = -100.0;

/// Per-tick horizontal velocity retention loss while grounded.
pub const GROUND_FRICTION: f32 = 0.04;

/// Per-tick horizontal velocity retention loss while airborne.
pub const AIR_DRAG: f32 = 0.01;

/// Speeds below this snap to zero to keep resting bodies still.
pub const SLEEP_EPS: f32 = 4.0;

/// Fall-speed cap while sliding down a wall.
pub const WALL_SLIDE_MAX: f32 = 130.0;

/// Minimum overlap depth before collision resolution pushes an entity out.
pub const PENETRATION_SLOP: f32 = 0.05;

/// Distance within which a box edge counts as touching a wall.
pub const WALL_TOUCH_EPS: f32 = 1.0;

/// Vertical reach of the ground probe beneath the foot row.
pub const GROUND_PROBE_TOLERANCE: f32 = 4.0;

/// Deltas above this are treated as invalid and replaced with [`STEP`].
pub const MAX_DT: f32 = 0.1;
