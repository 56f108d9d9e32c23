//! Input-driven player actor.

use quiver_arena_core::{ActionState, ActorId, Aabb, ArrowIdAllocator, Facing};
use quiver_arena_system_physics::{
    apply_horizontal_movement, apply_jump, apply_wall_slide, sanitize_dt, step, tuning, Body,
};
use quiver_arena_system_projectile::Arrow;
use quiver_arena_world::World;

use crate::ARROW_LAUNCH_SPEED;

/// Bounding-box width shared by all actors.
pub(crate) const ACTOR_WIDTH: f32 = 12.0;

/// Bounding-box height shared by all actors.
pub(crate) const ACTOR_HEIGHT: f32 = 16.0;

/// Quiver capacity for players.
pub(crate) const PLAYER_MAX_ARROWS: u32 = 5;

/// Slight lift applied to player shots so a flat shot clears ledge lips.
const LAUNCH_LIFT: f32 = -40.0;

/// Minimum time between player shots; a held button does not drain the
/// quiver in a handful of ticks.
const FIRE_COOLDOWN: f32 = 0.25;

/// A human-controlled actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    id: ActorId,
    /// Physics state advanced every tick.
    pub body: Body,
    /// Arrows currently carried.
    pub arrows: u32,
    /// Quiver capacity.
    pub max_arrows: u32,
    /// Whether the player is waiting to respawn.
    pub dead: bool,
    /// Rounds won; survives respawns.
    pub wins: u32,
    fire_cooldown: f32,
}

impl Player {
    /// Creates a live player at the given spawn position with a full quiver.
    #[must_use]
    pub fn new(id: ActorId, x: f32, y: f32) -> Self {
        Self {
            id,
            body: Body::new(x, y, ACTOR_WIDTH, ACTOR_HEIGHT),
            arrows: PLAYER_MAX_ARROWS,
            max_arrows: PLAYER_MAX_ARROWS,
            dead: false,
            wins: 0,
            fire_cooldown: 0.0,
        }
    }

    /// Identity of this player.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Current bounding box.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.body.aabb()
    }

    /// Marks the player dead; the orchestrator schedules the respawn.
    pub fn die(&mut self) {
        self.dead = true;
    }

    /// Revives the player at a spawn position.
    ///
    /// Position, velocity, timers, and ammo reset; identity and wins are
    /// preserved.
    pub fn respawn(&mut self, x: f32, y: f32) {
        self.body.reset(x, y);
        self.arrows = self.max_arrows;
        self.fire_cooldown = 0.0;
        self.dead = false;
    }

    /// Advances the player by one tick, returning a fired arrow, if any.
    pub fn update(
        &mut self,
        dt: f32,
        world: &World,
        actions: &ActionState,
        ids: &mut ArrowIdAllocator,
    ) -> Option<Arrow> {
        if self.dead {
            return None;
        }
        let dt = sanitize_dt(dt);

        let direction = steering(actions);
        self.body.facing = Facing::from_direction(direction, self.body.facing);
        let airborne = !self.body.on_ground;
        apply_horizontal_movement(
            &mut self.body,
            direction * tuning::MAX_VEL_X,
            dt,
            airborne,
        );
        let _ = apply_jump(&mut self.body, actions.jump_held, dt);
        apply_wall_slide(&mut self.body, actions.left, actions.right);
        step(&mut self.body, dt, world);

        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        if actions.shoot && self.arrows > 0 && self.fire_cooldown <= 0.0 {
            self.arrows -= 1;
            self.fire_cooldown = FIRE_COOLDOWN;
            let (cx, cy) = self.body.center();
            return Some(Arrow::new(
                ids.allocate(),
                self.id,
                cx,
                cy,
                self.body.facing.sign() * ARROW_LAUNCH_SPEED,
                LAUNCH_LIFT,
            ));
        }
        None
    }
}

/// Horizontal steering in `[-1, 1]`; the analog axis wins over digital keys.
fn steering(actions: &ActionState) -> f32 {
    if actions.axis_x != 0.0 && actions.axis_x.is_finite() {
        actions.axis_x.clamp(-1.0, 1.0)
    } else if actions.left && !actions.right {
        -1.0
    } else if actions.right && !actions.left {
        1.0
    } else {
        0.0
    }
}
