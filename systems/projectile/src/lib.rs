#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Arrow projectiles: ballistic flight, terrain embedding, removal.
//!
//! An arrow is **flying** while `active && !embedded`, becomes **embedded**
//! when its box clips a solid tile (snapping to the enclosing tile's origin
//! with velocity zeroed), and is **removed** (`active = false`) when it hits
//! an actor, is picked up, or is explicitly discarded. A removed arrow is
//! never resurrected.

use quiver_arena_core::{Aabb, ActorId, ArrowId};
use quiver_arena_system_physics::{sanitize_dt, tuning};
use quiver_arena_world::World;

/// Horizontal extent of every arrow's box.
pub const ARROW_WIDTH: f32 = 8.0;

/// Vertical extent of every arrow's box.
pub const ARROW_HEIGHT: f32 = 2.0;

/// Downward acceleration on flying arrows; lower than actor gravity so shots
/// carry a shallow ballistic arc.
pub const ARROW_GRAVITY: f32 = 600.0;

/// Number of pre-wrap positions retained for trail rendering.
pub const TRAIL_LENGTH: usize = 3;

/// Ring buffer of the last few pre-wrap arrow positions.
///
/// Rendering-only data: the seam-crossing jump between a pre-wrap position
/// and the wrapped one lets backends draw continuous trails across edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Trail {
    buffer: [(f32, f32); TRAIL_LENGTH],
    len: usize,
    head: usize,
}

impl Trail {
    fn push(&mut self, position: (f32, f32)) {
        self.buffer[self.head] = position;
        self.head = (self.head + 1) % TRAIL_LENGTH;
        if self.len < TRAIL_LENGTH {
            self.len += 1;
        }
    }

    /// Number of recorded positions, at most [`TRAIL_LENGTH`].
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no position has been recorded yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates recorded positions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let start = (self.head + TRAIL_LENGTH - self.len) % TRAIL_LENGTH;
        (0..self.len).map(move |offset| self.buffer[(start + offset) % TRAIL_LENGTH])
    }
}

/// A single arrow and its lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
    id: ArrowId,
    owner: ActorId,
    /// Left edge of the arrow's box.
    pub x: f32,
    /// Top edge of the arrow's box.
    pub y: f32,
    /// Horizontal velocity in pixels per second.
    pub vx: f32,
    /// Vertical velocity in pixels per second.
    pub vy: f32,
    /// Whether the arrow is stuck in terrain, waiting to be collected.
    pub embedded: bool,
    /// Whether the arrow still exists in the match.
    pub active: bool,
    trail: Trail,
}

impl Arrow {
    /// Creates a flying arrow owned by the actor that fired it.
    #[must_use]
    pub fn new(id: ArrowId, owner: ActorId, x: f32, y: f32, vx: f32, vy: f32) -> Self {
        Self {
            id,
            owner,
            x,
            y,
            vx,
            vy,
            embedded: false,
            active: true,
            trail: Trail::default(),
        }
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> ArrowId {
        self.id
    }

    /// Actor that fired this arrow; excluded from self-collision.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Whether the arrow is airborne and dangerous.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.active && !self.embedded
    }

    /// Bounding box of the arrow.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, ARROW_WIDTH, ARROW_HEIGHT)
    }

    /// Center point of the arrow's box.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        self.bounds().center()
    }

    /// Trail of recent pre-wrap positions, oldest first.
    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Removes the arrow from play. Irreversible.
    pub fn remove(&mut self) {
        self.active = false;
    }

    /// Advances the arrow by one step; returns whether it embedded this tick.
    ///
    /// Embedding snaps the arrow to the origin of the tile enclosing its
    /// center and re-wraps, since the snap itself can push the box outside
    /// bounds. A non-finite state deactivates the arrow instead of
    /// propagating.
    pub fn update(&mut self, dt: f32, world: &World) -> bool {
        if !self.is_flying() {
            return false;
        }
        let dt = sanitize_dt(dt);

        self.vy = (self.vy + ARROW_GRAVITY * dt).min(tuning::MAX_FALL_SPEED);
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        let pre_wrap = (self.x, self.y);
        let (x, y) = world.torus().wrap(self.x, self.y);
        self.x = x;
        self.y = y;
        self.trail.push(pre_wrap);

        if !self.x.is_finite() || !self.y.is_finite() || !self.vx.is_finite() || !self.vy.is_finite()
        {
            log::warn!("arrow {:?} reached a non-finite state; deactivated", self.id);
            self.active = false;
            return false;
        }

        if world.collides(self.x, self.y, ARROW_WIDTH, ARROW_HEIGHT) {
            self.embedded = true;
            self.vx = 0.0;
            self.vy = 0.0;

            let (cx, cy) = self.center();
            let (tx, ty) = world.tile_of(cx, cy);
            self.x = tx as f32 * world.tile_size();
            self.y = ty as f32 * world.tile_size();
            let (x, y) = world.torus().wrap(self.x, self.y);
            self.x = x;
            self.y = y;
            return true;
        }
        false
    }
}
