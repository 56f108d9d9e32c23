//! Finite-state scripted opponent.

use glam::Vec2;
use quiver_arena_core::{Aabb, ActorId, ArrowIdAllocator, Facing};
use quiver_arena_system_physics::{
    apply_horizontal_movement, apply_jump, sanitize_dt, step, tuning, Body,
};
use quiver_arena_system_projectile::Arrow;
use quiver_arena_world::{wrap::Torus, World};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::player::{ACTOR_HEIGHT, ACTOR_WIDTH};
use crate::{Player, WaveTuning, ARROW_LAUNCH_SPEED};

// Squared distances; the per-tick AI never takes a square root.
const AIM_ENTER_D2: f32 = 40_000.0;
const AIM_EXIT_D2: f32 = 62_500.0;
const AIM_VERTICAL_RANGE: f32 = 80.0;
const EVADE_ENTER_D2: f32 = 6_400.0;
const EVADE_EXIT_D2: f32 = 22_500.0;
const RETRIEVE_ENTER_D2: f32 = 25_000.0;
const RETRIEVE_ARRIVE_D2: f32 = 576.0;

const PATROL_SPEED_SCALE: f32 = 0.7;
const EVADE_SPEED_SCALE: f32 = 0.8;
const PATROL_DWELL: f32 = 3.0;
const EVADE_DURATION: f32 = 1.0;
const RETRIEVE_SCAN_PERIOD: f32 = 0.5;
const RETRIEVE_TIMEOUT: f32 = 5.0;
const RETRIEVE_AMMO_THRESHOLD: u32 = 2;
// An arrow this far above the opponent is worth a hop.
const RETRIEVE_JUMP_HEIGHT: f32 = 24.0;

const NPC_START_ARROWS: u32 = 3;
const NPC_MAX_ARROWS: u32 = 5;

/// Exclusive AI states of a scripted opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiState {
    /// Walk back and forth, reversing on walls or after a dwell.
    Patrol,
    /// Stand still, face the player, wait out the reaction delay.
    Aim,
    /// Loose one arrow, then fall back to patrol.
    Shoot,
    /// Back away from a player that came too close.
    Evade,
    /// Head for the nearest embedded arrow to restock the quiver.
    Retrieve,
}

/// A scripted opponent actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Npc {
    id: ActorId,
    /// Physics state advanced every tick.
    pub body: Body,
    /// Arrows currently carried.
    pub arrows: u32,
    /// Quiver capacity.
    pub max_arrows: u32,
    /// Whether the opponent is waiting to respawn.
    pub dead: bool,
    /// Rounds won; survives respawns.
    pub wins: u32,
    /// Current AI state.
    pub state: AiState,
    state_timer: f32,
    shot_cooldown: f32,
    retrieve_scan: f32,
    target_arrow: Option<quiver_arena_core::ArrowId>,
    tuning: WaveTuning,
}

impl Npc {
    /// Creates a live opponent at the given spawn position.
    #[must_use]
    pub fn new(id: ActorId, x: f32, y: f32, tuning: WaveTuning) -> Self {
        Self {
            id,
            body: Body::new(x, y, ACTOR_WIDTH, ACTOR_HEIGHT),
            arrows: NPC_START_ARROWS,
            max_arrows: NPC_MAX_ARROWS,
            dead: false,
            wins: 0,
            state: AiState::Patrol,
            state_timer: 0.0,
            shot_cooldown: 0.0,
            retrieve_scan: 0.0,
            target_arrow: None,
            tuning,
        }
    }

    /// Identity of this opponent.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Current bounding box.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.body.aabb()
    }

    /// Seconds spent in the current AI state.
    #[must_use]
    pub const fn state_timer(&self) -> f32 {
        self.state_timer
    }

    /// Marks the opponent dead; the orchestrator schedules the respawn.
    pub fn die(&mut self) {
        self.dead = true;
    }

    /// Revives the opponent at a spawn position.
    ///
    /// Position, velocity, timers, ammo, and AI state reset; identity and
    /// wins are preserved.
    pub fn respawn(&mut self, x: f32, y: f32) {
        self.body.reset(x, y);
        self.arrows = NPC_START_ARROWS;
        self.dead = false;
        self.state = AiState::Patrol;
        self.state_timer = 0.0;
        self.shot_cooldown = 0.0;
        self.retrieve_scan = 0.0;
        self.target_arrow = None;
    }

    /// Advances the opponent by one tick, returning a fired arrow, if any.
    ///
    /// The live arrow slice and the RNG arrive as explicit collaborators;
    /// with a fixed seed the whole decision sequence replays exactly.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        world: &World,
        player: &Player,
        arrows: &[Arrow],
        ids: &mut ArrowIdAllocator,
        rng: &mut R,
    ) -> Option<Arrow> {
        if self.dead {
            return None;
        }
        let dt = sanitize_dt(dt);
        self.state_timer += dt;
        self.shot_cooldown = (self.shot_cooldown - dt).max(0.0);
        self.retrieve_scan = (self.retrieve_scan - dt).max(0.0);

        let torus = world.torus();
        let (cx, cy) = self.body.center();
        let (px, py) = player.body.center();
        let dx = torus.delta_x(cx, px);
        let dy = torus.delta_y(cy, py);
        let d2 = dx * dx + dy * dy;
        let player_alive = !player.dead;

        let mut target_vx = 0.0;
        let mut jump = false;

        match self.state {
            AiState::Patrol => {
                if (self.body.facing == Facing::Right && self.body.touching_wall.right)
                    || (self.body.facing == Facing::Left && self.body.touching_wall.left)
                    || self.state_timer >= PATROL_DWELL
                {
                    self.body.facing = self.body.facing.flipped();
                    self.state_timer = 0.0;
                }
                target_vx = self.body.facing.sign()
                    * tuning::MAX_VEL_X
                    * PATROL_SPEED_SCALE
                    * self.tuning.patrol_speed;

                if player_alive
                    && d2 < AIM_ENTER_D2
                    && dy.abs() < AIM_VERTICAL_RANGE
                    && world.line_of_sight(cx, cy, px, py)
                {
                    self.enter(AiState::Aim);
                } else if player_alive && d2 < EVADE_ENTER_D2 {
                    self.enter(AiState::Evade);
                    jump = self.body.on_ground;
                } else if self.arrows < RETRIEVE_AMMO_THRESHOLD && self.retrieve_scan <= 0.0 {
                    self.retrieve_scan = RETRIEVE_SCAN_PERIOD;
                    if let Some((id, arrow_d2)) = self.nearest_embedded(arrows, torus) {
                        if arrow_d2 < RETRIEVE_ENTER_D2 {
                            self.target_arrow = Some(id);
                            self.enter(AiState::Retrieve);
                        }
                    }
                }
            }
            AiState::Aim => {
                self.body.facing = Facing::from_direction(dx, self.body.facing);
                if !player_alive || d2 > AIM_EXIT_D2 || dy.abs() > AIM_VERTICAL_RANGE {
                    self.enter(AiState::Patrol);
                } else if self.state_timer >= self.tuning.reaction_delay
                    && self.shot_cooldown <= 0.0
                {
                    self.enter(AiState::Shoot);
                }
            }
            AiState::Evade => {
                let away = if dx > 0.0 { -1.0 } else { 1.0 };
                target_vx = away * tuning::MAX_VEL_X * EVADE_SPEED_SCALE;
                self.body.facing = Facing::from_direction(away, self.body.facing);
                if self.state_timer >= EVADE_DURATION || d2 > EVADE_EXIT_D2 {
                    self.enter(AiState::Patrol);
                }
            }
            AiState::Retrieve => {
                self.run_retrieve(arrows, torus, cx, cy, &mut target_vx, &mut jump);
            }
            // Shoot is instantaneous; it is handled below so the arrow goes
            // out on the same tick the Aim gate opens.
            AiState::Shoot => {}
        }

        let mut fired = None;
        if self.state == AiState::Shoot {
            if self.arrows > 0 && player_alive {
                fired = Some(self.loose_arrow(dx, dy, ids, rng));
                self.arrows -= 1;
                self.shot_cooldown = self.tuning.shot_cooldown;
            }
            self.enter(AiState::Patrol);
        }

        let airborne = !self.body.on_ground;
        apply_horizontal_movement(&mut self.body, target_vx, dt, airborne);
        let _ = apply_jump(&mut self.body, jump, dt);
        step(&mut self.body, dt, world);
        fired
    }

    fn run_retrieve(
        &mut self,
        arrows: &[Arrow],
        torus: Torus,
        cx: f32,
        cy: f32,
        target_vx: &mut f32,
        jump: &mut bool,
    ) {
        if self.state_timer >= RETRIEVE_TIMEOUT {
            self.target_arrow = None;
            self.enter(AiState::Patrol);
            return;
        }

        if self.retrieve_scan <= 0.0 {
            self.retrieve_scan = RETRIEVE_SCAN_PERIOD;
            self.target_arrow = self.nearest_embedded(arrows, torus).map(|(id, _)| id);
        }

        let target = self.target_arrow.and_then(|id| {
            arrows
                .iter()
                .find(|arrow| arrow.id() == id && arrow.active && arrow.embedded)
        });
        let Some(target) = target else {
            self.target_arrow = None;
            self.enter(AiState::Patrol);
            return;
        };

        let (ax, ay) = target.center();
        let adx = torus.delta_x(cx, ax);
        let ady = torus.delta_y(cy, ay);
        if adx * adx + ady * ady < RETRIEVE_ARRIVE_D2 {
            // Close enough for the pickup query; patrol resumes while the
            // orchestrator credits the ammo.
            self.target_arrow = None;
            self.enter(AiState::Patrol);
            return;
        }

        let direction = if adx < 0.0 { -1.0 } else { 1.0 };
        *target_vx = direction * tuning::MAX_VEL_X * PATROL_SPEED_SCALE;
        self.body.facing = Facing::from_direction(direction, self.body.facing);

        let blocked = (direction < 0.0 && self.body.touching_wall.left)
            || (direction > 0.0 && self.body.touching_wall.right);
        if self.body.on_ground && (blocked || ady < -RETRIEVE_JUMP_HEIGHT) {
            *jump = true;
        }
    }

    fn nearest_embedded(
        &self,
        arrows: &[Arrow],
        torus: Torus,
    ) -> Option<(quiver_arena_core::ArrowId, f32)> {
        let center = self.body.center();
        arrows
            .iter()
            .filter(|arrow| arrow.active && arrow.embedded)
            .map(|arrow| {
                (
                    arrow.id(),
                    torus.distance_squared(center, arrow.center()),
                )
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    fn loose_arrow<R: Rng>(
        &self,
        dx: f32,
        dy: f32,
        ids: &mut ArrowIdAllocator,
        rng: &mut R,
    ) -> Arrow {
        let jitter = Normal::new(0.0, self.tuning.aim_jitter.max(f32::EPSILON))
            .expect("aim jitter deviation is finite and positive");
        let aim = Vec2::new(dx + jitter.sample(rng), dy + jitter.sample(rng));
        let direction = aim.normalize_or_zero();
        let direction = if direction == Vec2::ZERO {
            Vec2::new(self.body.facing.sign(), 0.0)
        } else {
            direction
        };

        let (cx, cy) = self.body.center();
        Arrow::new(
            ids.allocate(),
            self.id,
            cx,
            cy,
            direction.x * ARROW_LAUNCH_SPEED,
            direction.y * ARROW_LAUNCH_SPEED,
        )
    }

    fn enter(&mut self, next: AiState) {
        self.state = next;
        self.state_timer = 0.0;
    }
}
