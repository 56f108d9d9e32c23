//! Match orchestration.
//!
//! The session owns the live actor and arrow collections, drains fixed
//! simulation steps from a frame accumulator, and applies the per-tick order
//! the engine requires: movement first, combat queries second, lifecycle
//! cleanup last. Combat side effects (score, audio, VFX) stay outside; the
//! session only records [`CombatEvent`] values for the host to consume.

use std::time::Duration;

use anyhow::{anyhow, Result};
use glam::Vec2;
use quiver_arena_core::{ActionState, ActorId, ArrowId, ArrowIdAllocator, CombatEvent, Facing};
use quiver_arena_rendering::{
    interpolate_wrapped, sprite_placements, ActorPresentation, ArenaGridPresentation,
    ArrowPresentation, Scene,
};
use quiver_arena_system_behavior::{derive_wave_seed, Npc, Player, WaveTuning};
use quiver_arena_system_combat as combat;
use quiver_arena_system_combat::ActorView;
use quiver_arena_system_physics::tuning;
use quiver_arena_system_projectile::Arrow;
use quiver_arena_world::{SpawnPoint, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seconds a dead actor waits before returning at its spawn point.
const RESPAWN_DELAY: f32 = 1.5;

/// One running match: world, entities, RNG, and the frame accumulator.
pub(crate) struct MatchSession {
    world: World,
    player: Player,
    player_spawn: SpawnPoint,
    player_respawn: f32,
    npcs: Vec<Npc>,
    npc_spawns: Vec<SpawnPoint>,
    npc_respawns: Vec<f32>,
    arrows: Vec<Arrow>,
    ids: ArrowIdAllocator,
    rng: ChaCha8Rng,
    events: Vec<CombatEvent>,
    accumulator: Duration,
    ticks: u64,
    prev_actor_positions: Vec<(ActorId, (f32, f32))>,
    prev_arrow_positions: Vec<(ArrowId, (f32, f32))>,
}

impl MatchSession {
    /// Builds a match on the given world, spawning one player and
    /// `npc_count` opponents on the map's named spawn points.
    pub(crate) fn new(world: World, seed: u64, wave: u32, npc_count: usize) -> Result<Self> {
        let player_spawn = world
            .spawn_point("player")
            .ok_or_else(|| anyhow!("map declares no 'player' spawn point"))?;
        let player = Player::new(ActorId::new(0), player_spawn.x, player_spawn.y);

        let named: Vec<SpawnPoint> = world
            .spawn_points()
            .filter(|(name, _)| name.starts_with("npc"))
            .map(|(_, point)| point)
            .collect();
        if npc_count > 0 && named.is_empty() {
            return Err(anyhow!("map declares no npc spawn points"));
        }

        let wave_tuning = WaveTuning::for_wave(wave);
        let mut npcs = Vec::with_capacity(npc_count);
        let mut npc_spawns = Vec::with_capacity(npc_count);
        for index in 0..npc_count {
            let spawn = named[index % named.len()];
            npcs.push(Npc::new(
                ActorId::new(index as u32 + 1),
                spawn.x,
                spawn.y,
                wave_tuning,
            ));
            npc_spawns.push(spawn);
        }

        Ok(Self {
            world,
            player,
            player_spawn,
            player_respawn: 0.0,
            npc_respawns: vec![0.0; npc_count],
            npcs,
            npc_spawns,
            arrows: Vec::new(),
            ids: ArrowIdAllocator::new(),
            rng: ChaCha8Rng::seed_from_u64(derive_wave_seed(seed, wave)),
            events: Vec::new(),
            accumulator: Duration::ZERO,
            ticks: 0,
            prev_actor_positions: Vec::new(),
            prev_arrow_positions: Vec::new(),
        })
    }

    /// Feeds one rendered frame's wall-clock time into the simulation.
    ///
    /// Whole fixed steps are drained up to the substep cap; whole steps
    /// beyond the cap are dropped to bound worst-case work. The return value
    /// is the leftover interpolation fraction for rendering only.
    pub(crate) fn frame(&mut self, elapsed: Duration, actions: ActionState) -> f32 {
        let step = Duration::from_secs_f32(tuning::STEP);
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator >= step && substeps < tuning::MAX_SUBSTEPS {
            self.accumulator -= step;
            self.tick(&actions);
            substeps += 1;
        }
        while self.accumulator >= step {
            self.accumulator -= step;
        }

        (self.accumulator.as_secs_f32() / tuning::STEP).clamp(0.0, 1.0)
    }

    /// Combat events recorded since the match started.
    pub(crate) fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Fixed steps simulated so far.
    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The human-controlled actor.
    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    /// The scripted opponents.
    pub(crate) fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    /// Arrows currently alive (flying or embedded).
    pub(crate) fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Builds the presentation scene at the given interpolation fraction.
    pub(crate) fn scene(&self, alpha: f32) -> Scene {
        let torus = self.world.torus();
        let grid = ArenaGridPresentation::of_world(&self.world);

        let mut actors = Vec::with_capacity(self.npcs.len() + 1);
        actors.push(self.actor_presentation(
            self.player.id(),
            self.player.bounds(),
            self.player.body.facing,
            self.player.dead,
            alpha,
        ));
        for npc in &self.npcs {
            actors.push(self.actor_presentation(
                npc.id(),
                npc.bounds(),
                npc.body.facing,
                npc.dead,
                alpha,
            ));
        }

        let arrows = self
            .arrows
            .iter()
            .map(|arrow| {
                let bounds = arrow.bounds();
                let prev = self
                    .prev_arrow_positions
                    .iter()
                    .find(|(id, _)| *id == arrow.id())
                    .map(|(_, position)| *position)
                    .unwrap_or((bounds.x, bounds.y));
                let position = interpolate_wrapped(torus, prev, (bounds.x, bounds.y), alpha);
                ArrowPresentation {
                    id: arrow.id(),
                    size: Vec2::new(bounds.width, bounds.height),
                    placements: sprite_placements(
                        torus,
                        position.x,
                        position.y,
                        bounds.width,
                        bounds.height,
                    ),
                    embedded: arrow.embedded,
                    trail: arrow.trail().iter().map(|(x, y)| Vec2::new(x, y)).collect(),
                }
            })
            .collect();

        Scene::new(grid, actors, arrows)
    }

    fn actor_presentation(
        &self,
        id: ActorId,
        bounds: quiver_arena_core::Aabb,
        facing: Facing,
        dead: bool,
        alpha: f32,
    ) -> ActorPresentation {
        let torus = self.world.torus();
        let prev = self
            .prev_actor_positions
            .iter()
            .find(|(actor, _)| *actor == id)
            .map(|(_, position)| *position)
            .unwrap_or((bounds.x, bounds.y));
        let position = interpolate_wrapped(torus, prev, (bounds.x, bounds.y), alpha);
        ActorPresentation {
            id,
            size: Vec2::new(bounds.width, bounds.height),
            placements: sprite_placements(
                torus,
                position.x,
                position.y,
                bounds.width,
                bounds.height,
            ),
            facing,
            dead,
        }
    }

    /// One fixed step: movement, then combat queries, then cleanup.
    fn tick(&mut self, actions: &ActionState) {
        self.capture_previous_positions();
        let dt = tuning::STEP;

        if let Some(arrow) = self.player.update(dt, &self.world, actions, &mut self.ids) {
            self.arrows.push(arrow);
        }

        let mut fired = Vec::new();
        for npc in &mut self.npcs {
            if let Some(arrow) = npc.update(
                dt,
                &self.world,
                &self.player,
                &self.arrows,
                &mut self.ids,
                &mut self.rng,
            ) {
                fired.push(arrow);
            }
        }
        self.arrows.append(&mut fired);

        for arrow in &mut self.arrows {
            if arrow.update(dt, &self.world) {
                self.events.push(CombatEvent::ArrowEmbedded { arrow: arrow.id() });
            }
        }

        self.resolve_arrow_hits();
        self.resolve_stomps();
        self.resolve_pickups();

        self.arrows.retain(|arrow| arrow.active);
        self.advance_respawns(dt);
        self.ticks += 1;
    }

    fn capture_previous_positions(&mut self) {
        self.prev_actor_positions.clear();
        self.prev_actor_positions
            .push((self.player.id(), (self.player.body.x, self.player.body.y)));
        for npc in &self.npcs {
            self.prev_actor_positions
                .push((npc.id(), (npc.body.x, npc.body.y)));
        }

        self.prev_arrow_positions.clear();
        for arrow in &self.arrows {
            self.prev_arrow_positions
                .push((arrow.id(), (arrow.x, arrow.y)));
        }
    }

    fn resolve_arrow_hits(&mut self) {
        let torus = self.world.torus();
        for index in 0..self.arrows.len() {
            let arrow = self.arrows[index];
            if !arrow.is_flying() {
                continue;
            }

            let view = player_view(&self.player);
            if combat::arrow_hits_actor(&arrow, &view, torus) {
                self.events.push(CombatEvent::ArrowHit {
                    arrow: arrow.id(),
                    shooter: arrow.owner(),
                    target: view.id,
                });
                self.kill(view.id);
                self.credit_win(arrow.owner());
                self.arrows[index].remove();
                continue;
            }

            for npc_index in 0..self.npcs.len() {
                let view = npc_view(&self.npcs[npc_index]);
                if combat::arrow_hits_actor(&arrow, &view, torus) {
                    self.events.push(CombatEvent::ArrowHit {
                        arrow: arrow.id(),
                        shooter: arrow.owner(),
                        target: view.id,
                    });
                    self.kill(view.id);
                    self.credit_win(arrow.owner());
                    self.arrows[index].remove();
                    break;
                }
            }
        }
    }

    fn resolve_stomps(&mut self) {
        let torus = self.world.torus();
        let mut views = Vec::with_capacity(self.npcs.len() + 1);
        views.push(player_view(&self.player));
        views.extend(self.npcs.iter().map(npc_view));

        let mut stomps: Vec<(ActorId, ActorId)> = Vec::new();
        for attacker in &views {
            for target in &views {
                if combat::stomp(attacker, target, torus) {
                    stomps.push((attacker.id, target.id));
                }
            }
        }

        for (attacker, target) in stomps {
            self.events.push(CombatEvent::Stomp { attacker, target });
            self.kill(target);
            self.credit_win(attacker);
        }
    }

    fn resolve_pickups(&mut self) {
        let torus = self.world.torus();
        for index in 0..self.arrows.len() {
            let arrow = self.arrows[index];
            if !arrow.active || !arrow.embedded {
                continue;
            }

            let view = player_view(&self.player);
            if combat::arrow_pickup(&arrow, &view, torus) {
                self.player.arrows += 1;
                self.events.push(CombatEvent::ArrowPickedUp {
                    arrow: arrow.id(),
                    actor: view.id,
                });
                self.arrows[index].remove();
                continue;
            }

            for npc_index in 0..self.npcs.len() {
                let view = npc_view(&self.npcs[npc_index]);
                if combat::arrow_pickup(&arrow, &view, torus) {
                    self.npcs[npc_index].arrows += 1;
                    self.events.push(CombatEvent::ArrowPickedUp {
                        arrow: arrow.id(),
                        actor: view.id,
                    });
                    self.arrows[index].remove();
                    break;
                }
            }
        }
    }

    fn kill(&mut self, id: ActorId) {
        if self.player.id() == id {
            self.player.die();
            self.player_respawn = RESPAWN_DELAY;
            log::debug!("player {:?} died", id);
            return;
        }
        if let Some(index) = self.npcs.iter().position(|npc| npc.id() == id) {
            self.npcs[index].die();
            self.npc_respawns[index] = RESPAWN_DELAY;
            log::debug!("npc {:?} died", id);
        }
    }

    fn credit_win(&mut self, id: ActorId) {
        if self.player.id() == id {
            self.player.wins += 1;
            return;
        }
        if let Some(npc) = self.npcs.iter_mut().find(|npc| npc.id() == id) {
            npc.wins += 1;
        }
    }

    fn advance_respawns(&mut self, dt: f32) {
        if self.player.dead {
            self.player_respawn = (self.player_respawn - dt).max(0.0);
            if self.player_respawn <= 0.0 {
                self.player.respawn(self.player_spawn.x, self.player_spawn.y);
                log::debug!("player respawned");
            }
        }
        for index in 0..self.npcs.len() {
            if self.npcs[index].dead {
                self.npc_respawns[index] = (self.npc_respawns[index] - dt).max(0.0);
                if self.npc_respawns[index] <= 0.0 {
                    let spawn = self.npc_spawns[index];
                    self.npcs[index].respawn(spawn.x, spawn.y);
                    log::debug!("npc {:?} respawned", self.npcs[index].id());
                }
            }
        }
    }
}

fn player_view(player: &Player) -> ActorView {
    ActorView {
        id: player.id(),
        bounds: player.bounds(),
        vy: player.body.vy,
        dead: player.dead,
        arrows: player.arrows,
        max_arrows: player.max_arrows,
    }
}

fn npc_view(npc: &Npc) -> ActorView {
    ActorView {
        id: npc.id(),
        bounds: npc.bounds(),
        vy: npc.body.vy,
        dead: npc.dead,
        arrows: npc.arrows,
        max_arrows: npc.max_arrows,
    }
}
