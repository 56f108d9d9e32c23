#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that hosts a headless Quiver Arena match.
//!
//! Runs the deterministic fixed-step simulation with scripted player input,
//! prints a match report, and presents the final frame through the
//! backend-free rendering contract.

mod config;
mod session;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use quiver_arena_core::{ActionState, CombatEvent, WELCOME_BANNER};
use quiver_arena_rendering::{Color, Presentation, PresentationBackend, Scene};
use quiver_arena_world::{World, DEFAULT_TILE_SIZE};

use config::MatchSettings;
use session::MatchSession;

/// Nominal wall-clock duration of one rendered frame (60 Hz).
const FRAME: Duration = Duration::from_nanos(16_666_667);

/// Built-in arena used when no map file is provided.
const DEFAULT_ARENA: &str = "\
........................................\n\
........................................\n\
....###......................###........\n\
........................................\n\
..........####......####................\n\
........................................\n\
.P..................................1...\n\
######..........................########\n\
........................................\n\
.....2..........####..........3.........\n\
..#####....................#####........\n\
........................................\n\
...............4........................\n\
........................................\n\
########################################";

/// Command-line options for the headless match runner.
#[derive(Debug, Parser)]
#[command(
    name = "quiver-arena",
    about = "Deterministic headless Quiver Arena match runner"
)]
pub(crate) struct Options {
    /// Rendered frames to simulate at 60 frames per second.
    #[arg(long, default_value_t = 1_800)]
    pub(crate) frames: u32,

    /// Seed for the deterministic match RNG.
    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,

    /// Difficulty wave applied to scripted opponents.
    #[arg(long, default_value_t = 1)]
    pub(crate) wave: u32,

    /// Number of scripted opponents.
    #[arg(long, default_value_t = 2)]
    pub(crate) npcs: u32,

    /// ASCII arena map file; the built-in arena is used when absent.
    #[arg(long)]
    pub(crate) map: Option<PathBuf>,

    /// TOML file overriding the options above.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

/// Entry point for the Quiver Arena command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let options = Options::parse();
    let settings = MatchSettings::resolve(&options)?;

    println!("{WELCOME_BANNER}");

    let world = load_world(settings.map.as_deref())?;
    let mut session = MatchSession::new(
        world,
        settings.seed,
        settings.wave,
        settings.npcs as usize,
    )?;

    let mut alpha = 0.0;
    for frame in 0..settings.frames {
        alpha = session.frame(FRAME, scripted_actions(frame));
    }

    report(&session);

    let presentation = Presentation::new(
        "Quiver Arena",
        Color::from_rgb_u8(24, 24, 32),
        session.scene(alpha),
    );
    TextPresenter.run(presentation, |_, _| {})
}

fn load_world(map: Option<&Path>) -> Result<World> {
    let text = match map {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading map file {}", path.display()))?,
        None => DEFAULT_ARENA.to_owned(),
    };
    World::from_ascii(&text, DEFAULT_TILE_SIZE).context("parsing arena map")
}

/// Deterministic demo input: run, hop, and loose arrows on a fixed cycle.
fn scripted_actions(frame: u32) -> ActionState {
    let phase = frame % 240;
    ActionState {
        right: phase < 90,
        left: (120..200).contains(&phase),
        jump_held: phase % 60 < 6,
        shoot: phase % 150 == 0,
        axis_x: 0.0,
    }
}

fn report(session: &MatchSession) {
    let mut hits = 0u32;
    let mut stomps = 0u32;
    let mut pickups = 0u32;
    let mut embeds = 0u32;
    for event in session.events() {
        match event {
            CombatEvent::ArrowHit { .. } => hits += 1,
            CombatEvent::Stomp { .. } => stomps += 1,
            CombatEvent::ArrowPickedUp { .. } => pickups += 1,
            CombatEvent::ArrowEmbedded { .. } => embeds += 1,
        }
    }

    let player = session.player();
    println!("simulated {} fixed steps", session.ticks());
    println!(
        "player: {} wins, {} arrows{}",
        player.wins,
        player.arrows,
        if player.dead { ", awaiting respawn" } else { "" }
    );
    for npc in session.npcs() {
        println!(
            "npc {}: {:?}, {} wins, {} arrows{}",
            npc.id().get(),
            npc.state,
            npc.wins,
            npc.arrows,
            if npc.dead { ", awaiting respawn" } else { "" }
        );
    }
    println!("combat: {hits} hits, {stomps} stomps, {pickups} pickups, {embeds} embedded");
    println!("arrows alive: {}", session.arrows().len());
}

/// Headless presenter that prints a one-line summary of the final frame.
struct TextPresenter;

impl PresentationBackend for TextPresenter {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static,
    {
        let mut scene = presentation.scene;
        update_scene(Duration::ZERO, &mut scene);

        let ghosts: usize = scene
            .actors
            .iter()
            .map(|actor| actor.placements.len() - 1)
            .sum::<usize>()
            + scene
                .arrows
                .iter()
                .map(|arrow| arrow.placements.len() - 1)
                .sum::<usize>();
        println!(
            "{}: {}x{} tiles, {} actors, {} arrows, {} seam ghosts",
            presentation.window_title,
            scene.grid.columns,
            scene.grid.rows,
            scene.actors.len(),
            scene.arrows.len(),
            ghosts
        );
        Ok(())
    }
}
