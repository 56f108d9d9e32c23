#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Quiver Arena adapters.
//!
//! Backends receive a declarative [`Scene`] and draw it however they like;
//! nothing here touches simulation state. The seam-aware helpers solve the
//! two presentation problems a toroidal arena creates: an entity straddling
//! an edge must be drawn on both sides (ghost placements), and render-time
//! interpolation between two simulation states must take the short way
//! around the torus instead of sweeping across the whole arena.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use quiver_arena_core::{ActorId, ArrowId, Facing};
use quiver_arena_world::{wrap::Torus, World};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// One drawable placement of a sprite, real or ghost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePlacement {
    /// Top-left corner of the sprite in world pixels.
    pub position: Vec2,
    /// Whether this placement is a seam ghost rather than the real position.
    pub ghost: bool,
}

/// Declarative description of one actor for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Identity of the actor.
    pub id: ActorId,
    /// Extent of the actor's sprite in world pixels.
    pub size: Vec2,
    /// Real placement followed by any seam ghosts.
    pub placements: Vec<SpritePlacement>,
    /// Horizontal orientation for sprite flipping.
    pub facing: Facing,
    /// Whether the actor is currently dead (backends typically dim or hide).
    pub dead: bool,
}

/// Declarative description of one arrow for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowPresentation {
    /// Identity of the arrow.
    pub id: ArrowId,
    /// Extent of the arrow's sprite in world pixels.
    pub size: Vec2,
    /// Real placement followed by any seam ghosts.
    pub placements: Vec<SpritePlacement>,
    /// Whether the arrow is embedded in terrain.
    pub embedded: bool,
    /// Recent pre-wrap positions, oldest first, for trail rendering.
    pub trail: Vec<Vec2>,
}

/// Static tile-grid description for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaGridPresentation {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a square tile in world pixels.
    pub tile_length: f32,
    /// Coordinates of every solid tile, row-major.
    pub solid_tiles: Vec<(u32, u32)>,
}

impl ArenaGridPresentation {
    /// Captures the grid description of a world.
    #[must_use]
    pub fn of_world(world: &World) -> Self {
        let mut solid_tiles = Vec::new();
        for row in 0..world.rows() {
            for column in 0..world.columns() {
                if world.is_solid(i64::from(column), i64::from(row)) {
                    solid_tiles.push((column, row));
                }
            }
        }
        Self {
            columns: world.columns(),
            rows: world.rows(),
            tile_length: world.tile_size(),
            solid_tiles,
        }
    }

    /// Total width of the grid in world pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid in world pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }
}

/// Scene description consumed by rendering backends each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile terrain backdrop.
    pub grid: ArenaGridPresentation,
    /// Actors visible this frame.
    pub actors: Vec<ActorPresentation>,
    /// Arrows visible this frame.
    pub arrows: Vec<ArrowPresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        grid: ArenaGridPresentation,
        actors: Vec<ActorPresentation>,
        arrows: Vec<ArrowPresentation>,
    ) -> Self {
        Self {
            grid,
            actors,
            arrows,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window, where one exists.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Quiver Arena scenes.
pub trait PresentationBackend {
    /// Runs the backend until it is requested to exit.
    ///
    /// The `update_scene` closure receives the frame delta and may rewrite
    /// the scene before it is drawn; simulation state is never reachable
    /// from here.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Interpolates between two wrapped positions at the render fraction.
///
/// The delta is taken the short way around the torus, so an entity that
/// crossed a seam between ticks glides over the edge instead of streaking
/// across the arena. The result is wrapped again.
#[must_use]
pub fn interpolate_wrapped(torus: Torus, prev: (f32, f32), curr: (f32, f32), alpha: f32) -> Vec2 {
    let alpha = if alpha.is_finite() {
        alpha.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let x = prev.0 + torus.delta_x(prev.0, curr.0) * alpha;
    let y = prev.1 + torus.delta_y(prev.1, curr.1) * alpha;
    let (x, y) = torus.wrap(x, y);
    Vec2::new(x, y)
}

/// Real placement plus ghost copies for a box near wrap seams.
#[must_use]
pub fn sprite_placements(torus: Torus, x: f32, y: f32, width: f32, height: f32) -> Vec<SpritePlacement> {
    let mut placements = vec![SpritePlacement {
        position: Vec2::new(x, y),
        ghost: false,
    }];
    for (dx, dy) in torus.ghost_offsets(x, y, width, height) {
        placements.push(SpritePlacement {
            position: Vec2::new(x + dx, y + dy),
            ghost: true,
        });
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::{interpolate_wrapped, sprite_placements, ArenaGridPresentation, Color};
    use glam::Vec2;
    use quiver_arena_world::{wrap::Torus, World};

    const TORUS: Torus = Torus::new(640.0, 480.0, true, true);

    #[test]
    fn interpolation_crosses_the_seam_the_short_way() {
        let half = interpolate_wrapped(TORUS, (638.0, 100.0), (2.0, 100.0), 0.5);
        assert_eq!(half, Vec2::new(0.0, 100.0));

        let quarter = interpolate_wrapped(TORUS, (638.0, 100.0), (2.0, 100.0), 0.25);
        assert_eq!(quarter, Vec2::new(639.0, 100.0));
    }

    #[test]
    fn interpolation_clamps_the_fraction() {
        let past = interpolate_wrapped(TORUS, (10.0, 10.0), (20.0, 10.0), 4.0);
        assert_eq!(past, Vec2::new(20.0, 10.0));
        let invalid = interpolate_wrapped(TORUS, (10.0, 10.0), (20.0, 10.0), f32::NAN);
        assert_eq!(invalid, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn seam_straddling_sprites_gain_ghost_placements() {
        let placements = sprite_placements(TORUS, 634.0, 100.0, 12.0, 16.0);
        assert_eq!(placements.len(), 2);
        assert!(!placements[0].ghost);
        assert!(placements[1].ghost);
        assert_eq!(placements[1].position, Vec2::new(-6.0, 100.0));

        let interior = sprite_placements(TORUS, 300.0, 200.0, 12.0, 16.0);
        assert_eq!(interior.len(), 1);
    }

    #[test]
    fn grid_presentation_collects_solid_tiles() {
        let world = World::from_ascii(
            "#..\n\
             .#.",
            16.0,
        )
        .expect("test world parses");
        let grid = ArenaGridPresentation::of_world(&world);
        assert_eq!(grid.columns, 3);
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.solid_tiles, vec![(0, 0), (1, 1)]);
        assert_eq!(grid.width(), 48.0);
        assert_eq!(grid.height(), 32.0);
    }

    #[test]
    fn colors_convert_from_bytes() {
        let color = Color::from_rgb_u8(255, 0, 51);
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.0);
        assert!((color.blue - 0.2).abs() < 1e-6);
        assert_eq!(color.alpha, 1.0);
    }
}
