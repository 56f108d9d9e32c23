#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Quiver Arena engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure simulation systems, and the adapters that host a match: entity
//! identifiers, the per-tick input snapshot delivered by input adapters, the
//! combat events surfaced to the orchestrator for audio/VFX/score side
//! effects, and the axis-aligned box geometry every collision query is
//! phrased in. The simulation itself lives in the system crates; nothing in
//! here mutates state.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Quiver Arena.";

/// Unique identifier assigned to an actor (player or scripted opponent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an arrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrowId(u32);

impl ArrowId {
    /// Creates a new arrow identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Allocates monotonically increasing arrow identifiers for one match.
///
/// Owned by the orchestrator and threaded into the actor update calls that
/// may fire, so spawned arrows carry their final identity immediately.
#[derive(Clone, Debug, Default)]
pub struct ArrowIdAllocator {
    next: u32,
}

impl ArrowIdAllocator {
    /// Creates an allocator that starts issuing identifiers at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Issues the next arrow identifier.
    pub fn allocate(&mut self) -> ArrowId {
        let id = ArrowId::new(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Horizontal orientation of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    Right,
}

impl Facing {
    /// Unit sign of the facing direction along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Returns the opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Derives a facing from a horizontal direction, keeping `current` when
    /// the direction carries no sign.
    #[must_use]
    pub fn from_direction(direction: f32, current: Self) -> Self {
        if direction < 0.0 {
            Self::Left
        } else if direction > 0.0 {
            Self::Right
        } else {
            current
        }
    }
}

/// Per-tick action snapshot delivered by an input adapter for one actor.
///
/// The engine is agnostic to whether the snapshot came from a keyboard, a
/// gamepad, or a script; `axis_x` carries an analog stick when one exists
/// and is zero otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ActionState {
    /// Digital move-left input.
    pub left: bool,
    /// Digital move-right input.
    pub right: bool,
    /// Whether the jump control is held this tick.
    pub jump_held: bool,
    /// Whether the fire control is pressed this tick.
    pub shoot: bool,
    /// Analog horizontal axis in `[-1.0, 1.0]`, zero when absent.
    pub axis_x: f32,
}

/// Combat outcomes detected after movement each tick.
///
/// The orchestrator consumes these for score, audio, and VFX side effects;
/// the engine itself never calls into presentation code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An arrow struck an actor it does not belong to.
    ArrowHit {
        /// Arrow that scored the hit.
        arrow: ArrowId,
        /// Actor that fired the arrow.
        shooter: ActorId,
        /// Actor that was struck.
        target: ActorId,
    },
    /// A fast-falling actor struck another actor's head with its feet.
    Stomp {
        /// Actor that delivered the stomp.
        attacker: ActorId,
        /// Actor that was stomped.
        target: ActorId,
    },
    /// An embedded arrow was collected by an actor with quiver room.
    ArrowPickedUp {
        /// Arrow that was collected and removed.
        arrow: ArrowId,
        /// Actor whose ammo count increased.
        actor: ActorId,
    },
    /// An arrow struck terrain and became a stationary pickup.
    ArrowEmbedded {
        /// Arrow that embedded into the world.
        arrow: ArrowId,
    },
}

/// Axis-aligned bounding box in world pixels, anchored at its top-left.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Aabb {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Aabb {
    /// Creates a new box from its top-left corner and extents.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exact overlap test; shared edges do not count as overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Returns a copy of the box shifted by the provided offsets.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}
