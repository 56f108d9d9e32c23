#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Actor behavior: input-driven players and finite-state-machine opponents.
//!
//! Both actor kinds compose the shared physics [`Body`]; there is no
//! inheritance anywhere. Players translate an
//! [`quiver_arena_core::ActionState`] into movement, jump, and fire calls.
//! Opponents run the five-state AI and receive the live arrow slice and a
//! caller-supplied RNG explicitly, so a whole match replays bit-for-bit from
//! one seed.
//!
//! [`Body`]: quiver_arena_system_physics::Body

use sha2::{Digest, Sha256};

mod npc;
mod player;

pub use npc::{AiState, Npc};
pub use player::Player;

/// Launch speed of a fired arrow in pixels per second.
pub const ARROW_LAUNCH_SPEED: f32 = 420.0;

/// Per-wave difficulty knobs for scripted opponents.
///
/// Raising the wave number is the sole difficulty-curve mechanism: reactions
/// sharpen, aim tightens, and patrol/shot pacing speeds up, each clamped to
/// keep late waves playable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveTuning {
    /// Seconds an opponent holds its aim before shooting.
    pub reaction_delay: f32,
    /// Standard deviation of the aim-point error in pixels.
    pub aim_jitter: f32,
    /// Multiplier applied on top of the base patrol walk speed.
    pub patrol_speed: f32,
    /// Seconds between consecutive shots.
    pub shot_cooldown: f32,
}

impl WaveTuning {
    /// Derives the tuning for the given one-based wave number.
    #[must_use]
    pub fn for_wave(wave: u32) -> Self {
        let ramp = wave.max(1).saturating_sub(1) as f32;
        Self {
            reaction_delay: (0.6 - 0.05 * ramp).max(0.15),
            aim_jitter: (36.0 - 4.0 * ramp).max(8.0),
            patrol_speed: (1.0 + 0.05 * ramp).min(1.5),
            shot_cooldown: (1.2 - 0.08 * ramp).max(0.5),
        }
    }
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self::for_wave(1)
    }
}

/// Derives the deterministic RNG seed for one wave of a match.
///
/// Hashing keeps unrelated waves decorrelated even for adjacent seeds or
/// wave numbers.
#[must_use]
pub fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    hasher.update(b"wave-stream");
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
