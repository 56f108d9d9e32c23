//! Shared physics record composed into every actor.

use quiver_arena_core::{Aabb, Facing};

/// Wall-contact flags refreshed every physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchingWall {
    /// A wall sits within touching distance of the left edge.
    pub left: bool,
    /// A wall sits within touching distance of the right edge.
    pub right: bool,
}

impl TouchingWall {
    /// Whether either side is in contact.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.left || self.right
    }
}

/// Position, velocity, and timer state advanced by the physics step.
///
/// Every field is given its final default at construction; nothing is
/// lazily initialized during simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Left edge of the bounding box.
    pub x: f32,
    /// Top edge of the bounding box.
    pub y: f32,
    /// Horizontal extent of the bounding box.
    pub width: f32,
    /// Vertical extent of the bounding box.
    pub height: f32,
    /// Horizontal velocity in pixels per second.
    pub vx: f32,
    /// Vertical velocity in pixels per second (positive is down).
    pub vy: f32,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Authoritative grounded state for the current tick.
    pub on_ground: bool,
    /// Grounded state captured at the start of the current tick.
    pub was_on_ground: bool,
    /// Wall-contact flags for the current tick.
    pub touching_wall: TouchingWall,
    /// Remaining coyote grace after leaving a platform.
    pub coyote_time: f32,
    /// Remaining jump-buffer window from an early press.
    pub jump_buffer: f32,
    /// Remaining post-landing cooldown before a jump may fire.
    pub jump_cooldown: f32,
    /// Remaining post-landing lock window.
    pub jump_lock_time: f32,
    /// Accumulated time spent continuously grounded.
    pub ground_stable_time: f32,
    /// Set on the landing tick, cleared once the jump lock expires.
    pub just_landed: bool,
    /// The foot row sits at or past the world's lowest tile row.
    pub on_bottom_wall: bool,
}

impl Body {
    /// Creates a resting body at the given position with the given extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            on_ground: false,
            was_on_ground: false,
            touching_wall: TouchingWall {
                left: false,
                right: false,
            },
            coyote_time: 0.0,
            jump_buffer: 0.0,
            jump_cooldown: 0.0,
            jump_lock_time: 0.0,
            ground_stable_time: 0.0,
            just_landed: false,
            on_bottom_wall: false,
        }
    }

    /// Moves the body to a spawn position and clears all motion state.
    ///
    /// Extent and facing survive; velocities, timers, and contact flags do
    /// not.
    pub fn reset(&mut self, x: f32, y: f32) {
        let facing = self.facing;
        *self = Self::new(x, y, self.width, self.height);
        self.facing = facing;
    }

    /// Bounding box of the body.
    #[must_use]
    pub const fn aabb(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// Center point of the bounding box.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        self.aabb().center()
    }

    /// Whether position and velocity are all finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }
}
