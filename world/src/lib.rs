#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena terrain for Quiver Arena.
//!
//! The world is a tile grid of solidity flags fixed at construction, a named
//! spawn-point table, and the toroidal coordinate space everything simulates
//! inside. All queries are pure; nothing here mutates after a map is built.

use std::collections::BTreeMap;

use thiserror::Error;

pub mod wrap;

use wrap::Torus;

/// Side length of a square tile in world pixels used by the stock maps.
pub const DEFAULT_TILE_SIZE: f32 = 16.0;

/// Named point where an actor can (re)spawn, in world pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    /// Horizontal pixel coordinate of the spawn tile's top-left corner.
    pub x: f32,
    /// Vertical pixel coordinate of the spawn tile's top-left corner.
    pub y: f32,
}

/// Errors produced while parsing an ASCII arena map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The map text contained no rows.
    #[error("map contains no rows")]
    Empty,
    /// A row's width differs from the first row's width.
    #[error("row {row} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width actually found.
        found: usize,
    },
    /// The same spawn marker appeared on two tiles.
    #[error("spawn marker '{marker}' appears more than once")]
    DuplicateSpawn {
        /// The repeated marker glyph.
        marker: char,
    },
    /// A glyph outside the map alphabet was encountered.
    #[error("unrecognized map glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// The offending glyph.
        glyph: char,
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
    },
}

/// Immutable tile terrain plus spawn table and wrap configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    columns: u32,
    rows: u32,
    tile_size: f32,
    solid: Vec<bool>,
    spawn_points: BTreeMap<String, SpawnPoint>,
    torus: Torus,
}

impl World {
    /// Parses an ASCII map into a world that wraps on both axes.
    ///
    /// Alphabet: `#` solid, `.` or space empty, `P` the "player" spawn,
    /// digits `1`–`9` the "npc1"–"npc9" spawns. Rows must share one width.
    pub fn from_ascii(map: &str, tile_size: f32) -> Result<Self, MapError> {
        Self::from_ascii_with_wrap(map, tile_size, true, true)
    }

    /// Parses an ASCII map with explicit per-axis wrap switches.
    pub fn from_ascii_with_wrap(
        map: &str,
        tile_size: f32,
        wrap_x: bool,
        wrap_y: bool,
    ) -> Result<Self, MapError> {
        let lines: Vec<&str> = map
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(MapError::Empty);
        }

        let columns = lines[0].chars().count();
        let rows = lines.len();
        let mut solid = vec![false; columns * rows];
        let mut spawn_points = BTreeMap::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != columns {
                return Err(MapError::RaggedRow {
                    row,
                    expected: columns,
                    found,
                });
            }

            for (column, glyph) in line.chars().enumerate() {
                match glyph {
                    '#' => solid[row * columns + column] = true,
                    '.' | ' ' => {}
                    'P' | '1'..='9' => {
                        let name = if glyph == 'P' {
                            String::from("player")
                        } else {
                            format!("npc{glyph}")
                        };
                        let point = SpawnPoint {
                            x: column as f32 * tile_size,
                            y: row as f32 * tile_size,
                        };
                        if spawn_points.insert(name, point).is_some() {
                            return Err(MapError::DuplicateSpawn { marker: glyph });
                        }
                    }
                    other => {
                        return Err(MapError::UnknownGlyph {
                            glyph: other,
                            row,
                            column,
                        })
                    }
                }
            }
        }

        let columns = columns as u32;
        let rows = rows as u32;
        let torus = Torus::new(
            columns as f32 * tile_size,
            rows as f32 * tile_size,
            wrap_x,
            wrap_y,
        );

        Ok(Self {
            columns,
            rows,
            tile_size,
            solid,
            spawn_points,
            torus,
        })
    }

    /// Number of tile columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a square tile in world pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Total width of the world in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.torus.width()
    }

    /// Total height of the world in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.torus.height()
    }

    /// Toroidal coordinate space covering this world.
    #[must_use]
    pub const fn torus(&self) -> Torus {
        self.torus
    }

    /// Looks up the named spawn point, if the map declared one.
    #[must_use]
    pub fn spawn_point(&self, name: &str) -> Option<SpawnPoint> {
        self.spawn_points.get(name).copied()
    }

    /// Iterates the spawn table in deterministic (name) order.
    pub fn spawn_points(&self) -> impl Iterator<Item = (&str, SpawnPoint)> {
        self.spawn_points
            .iter()
            .map(|(name, point)| (name.as_str(), *point))
    }

    /// Reports whether the tile at the given indices is solid.
    ///
    /// Indices wrap modulo the grid size on wrapping axes; outside a
    /// non-wrapping axis every tile reads as solid.
    #[must_use]
    pub fn is_solid(&self, tx: i64, ty: i64) -> bool {
        let column = wrap_index(tx, self.columns, self.torus.wraps_x());
        let row = wrap_index(ty, self.rows, self.torus.wraps_y());
        match (column, row) {
            (Some(column), Some(row)) => self.solid[row * self.columns as usize + column],
            _ => true,
        }
    }

    /// Tile indices containing the given pixel position (floor division).
    #[must_use]
    pub fn tile_of(&self, x: f32, y: f32) -> (i64, i64) {
        (
            (x / self.tile_size).floor() as i64,
            (y / self.tile_size).floor() as i64,
        )
    }

    /// Tests an axis-aligned box against every tile it overlaps.
    #[must_use]
    pub fn collides(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }

        let (first_tx, first_ty) = self.tile_of(x, y);
        let mut ty = first_ty;
        while ty as f32 * self.tile_size < y + height {
            let mut tx = first_tx;
            while tx as f32 * self.tile_size < x + width {
                if self.is_solid(tx, ty) {
                    return true;
                }
                tx += 1;
            }
            ty += 1;
        }
        false
    }

    /// Reports whether a straight line between two points is unobstructed.
    ///
    /// Both endpoints are wrapped first; the segment is then sampled at
    /// `ceil(dist / tile_size) + 1` equally spaced points, and any sample
    /// landing on a solid tile breaks sight.
    #[must_use]
    pub fn line_of_sight(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        let (x1, y1) = self.torus.wrap(x1, y1);
        let (x2, y2) = self.torus.wrap(x2, y2);

        let distance = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        let samples = (distance / self.tile_size).ceil() as usize + 1;
        if samples == 1 {
            let (tx, ty) = self.tile_of(x1, y1);
            return !self.is_solid(tx, ty);
        }

        for index in 0..samples {
            let t = index as f32 / (samples - 1) as f32;
            let px = x1 + (x2 - x1) * t;
            let py = y1 + (y2 - y1) * t;
            let (tx, ty) = self.tile_of(px, py);
            if self.is_solid(tx, ty) {
                return false;
            }
        }
        true
    }
}

fn wrap_index(index: i64, extent: u32, wraps: bool) -> Option<usize> {
    let extent = i64::from(extent);
    if extent == 0 {
        return None;
    }

    if wraps {
        Some(index.rem_euclid(extent) as usize)
    } else if (0..extent).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{MapError, World, DEFAULT_TILE_SIZE};

    fn arena() -> World {
        World::from_ascii(
            "########\n\
             #..P...#\n\
             #......#\n\
             #...1..#\n\
             ########",
            DEFAULT_TILE_SIZE,
        )
        .expect("stock arena parses")
    }

    #[test]
    fn parses_dimensions_and_spawns() {
        let world = arena();
        assert_eq!(world.columns(), 8);
        assert_eq!(world.rows(), 5);
        assert_eq!(world.width(), 128.0);
        assert_eq!(world.height(), 80.0);

        let player = world.spawn_point("player").expect("player spawn");
        assert_eq!((player.x, player.y), (48.0, 16.0));
        let npc = world.spawn_point("npc1").expect("npc spawn");
        assert_eq!((npc.x, npc.y), (64.0, 48.0));
        assert!(world.spawn_point("npc2").is_none());

        let names: Vec<&str> = world.spawn_points().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["npc1", "player"]);
    }

    #[test]
    fn rejects_malformed_maps() {
        assert_eq!(
            World::from_ascii("", DEFAULT_TILE_SIZE),
            Err(MapError::Empty)
        );
        assert_eq!(
            World::from_ascii("###\n##", DEFAULT_TILE_SIZE),
            Err(MapError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            World::from_ascii("P.P", DEFAULT_TILE_SIZE),
            Err(MapError::DuplicateSpawn { marker: 'P' })
        );
        assert_eq!(
            World::from_ascii(".x.", DEFAULT_TILE_SIZE),
            Err(MapError::UnknownGlyph {
                glyph: 'x',
                row: 0,
                column: 1
            })
        );
    }

    #[test]
    fn solidity_wraps_modulo_grid() {
        let world = arena();
        assert!(world.is_solid(0, 0));
        assert!(!world.is_solid(1, 1));
        // One full grid width to the left of (1, 1).
        assert!(!world.is_solid(1 - 8, 1));
        assert!(world.is_solid(-8, 5));
    }

    #[test]
    fn solidity_reads_out_of_bounds_as_solid_without_wrap() {
        let world =
            World::from_ascii_with_wrap("...\n...", DEFAULT_TILE_SIZE, false, false).expect("map");
        assert!(!world.is_solid(1, 1));
        assert!(world.is_solid(-1, 0));
        assert!(world.is_solid(0, 2));
    }

    #[test]
    fn box_collision_covers_spanned_tiles() {
        let world = arena();
        // Fully inside the open interior.
        assert!(!world.collides(20.0, 20.0, 12.0, 20.0));
        // Overlapping the top border row.
        assert!(world.collides(20.0, 12.0, 12.0, 20.0));
        // Touching the border tile edge exactly does not collide.
        assert!(!world.collides(20.0, 16.0, 12.0, 48.0));
    }

    #[test]
    fn line_of_sight_blocked_by_solid_tiles() {
        let world = World::from_ascii(
            "........\n\
             ....#...\n\
             ........",
            DEFAULT_TILE_SIZE,
        )
        .expect("map");
        // Straight across the middle row, through the pillar.
        assert!(!world.line_of_sight(8.0, 24.0, 120.0, 24.0));
        // Across the open top row.
        assert!(world.line_of_sight(8.0, 8.0, 120.0, 8.0));
        // Degenerate zero-length sight on an open tile.
        assert!(world.line_of_sight(8.0, 8.0, 8.0, 8.0));
    }
}
