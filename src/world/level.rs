//! Level data and loading
//!
//! Levels are plain data: a tile grid, a list of entrances, and optional
//! platforms. Files use RON (Rusty Object Notation) and are validated before
//! they reach the world.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::game::{
    Actor, ActorId, Behavior, Canvas, Color, MovingPlatform, Player, SolidBox, Tag, TileGrid, World,
    WorldError,
};
use crate::math::{Fixed, FixedPoint, Rectangle};

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum grid dimension (width or height) in tiles
    pub const MAX_GRID_SIZE: usize = 1024;
    /// Largest tile edge in pixels
    pub const MAX_TILE_SIZE: i32 = 256;
    pub const MAX_ENTRANCES: usize = 256;
    pub const MAX_PLATFORMS: usize = 1024;
    /// Maximum coordinate in pixels (keeps fixed-point values in range)
    pub const MAX_COORD: i32 = 1 << 20;
}

const TILEMAP_DEPTH: i32 = 100;
const TILE_FILL: Color = Color::hex(0x45283c);
const TILE_EDGE: Color = Color::hex(0x663931);

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::ParseError(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::SerializeError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {}

/// A solid box placed by the level, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformData {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Raw fixed-point units per frame; zero for a static box
    #[serde(default)]
    pub velocity: (i32, i32),
    /// Frames between direction changes
    #[serde(default)]
    pub period: u32,
}

impl PlatformData {
    fn is_moving(&self) -> bool {
        self.period > 0 && self.velocity != (0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub id: u32,
    /// Grid width in tiles
    pub width: usize,
    /// Grid height in tiles
    pub height: usize,
    /// Tile edge in pixels
    pub tile_size: i32,
    /// Row-major tile ids, 0 = empty
    pub tiles: Vec<i32>,
    /// Spawn points in pixels (feet position)
    pub entrances: Vec<(i32, i32)>,
    #[serde(default)]
    pub platforms: Vec<PlatformData>,
}

impl LevelData {
    /// An empty `width` x `height` level
    pub fn new(id: u32, width: usize, height: usize, tile_size: i32) -> Self {
        Self {
            id,
            width,
            height,
            tile_size,
            tiles: vec![0; width * height],
            entrances: Vec::new(),
            platforms: Vec::new(),
        }
    }

    pub fn entrance(&self, index: usize) -> Option<FixedPoint> {
        self.entrances.get(index).map(|&(x, y)| FixedPoint::from_pixels(x, y))
    }

    pub fn set_tile(&mut self, x: usize, y: usize, value: i32) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = value;
        }
    }

    /// Fill the inclusive tile span `(x0, y0)..=(x1, y1)` with `value`.
    pub fn fill(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: i32) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set_tile(x, y, value);
            }
        }
    }

    pub fn grid(&self) -> Result<TileGrid, WorldError> {
        TileGrid::new(self.width, self.height, Fixed::from_pixels(self.tile_size), self.tiles.clone())
    }

    /// Replace the contents of `world` with this level.
    ///
    /// Registers the tile grid, the platforms, and a player at `entrance`
    /// when that index exists, then starts the world. Returns the player.
    pub fn load_into(
        &self,
        world: &mut World,
        entrance: usize,
        config: &PlayerConfig,
    ) -> Result<Option<ActorId>, WorldError> {
        world.reset();

        let grid = self.grid()?;
        let tilemap = Actor::tilemap(FixedPoint::ZERO, grid)
            .with_tag(Tag::PLAYER_COLLIDABLE | Tag::ENEMY_COLLIDABLE)
            .with_depth(TILEMAP_DEPTH);
        world.register_with(tilemap, TilemapView)?;

        for platform in &self.platforms {
            let actor = SolidBox::actor(Rectangle::from_pixels(platform.x, platform.y, platform.width, platform.height));
            if platform.is_moving() {
                let velocity = FixedPoint::from_raw(platform.velocity.0, platform.velocity.1);
                world.register_with(actor, MovingPlatform::new(velocity, platform.period))?;
            } else {
                world.register_with(actor, SolidBox)?;
            }
        }

        let player = match self.entrance(entrance) {
            Some(spawn) => Some(world.register_with(Player::actor(spawn, config), Player::new(config.clone()))?),
            None => None,
        };

        world.start();
        debug!(
            "level {}: loaded {}x{} tiles, entrance {} ({})",
            self.id,
            self.width,
            self.height,
            entrance,
            if player.is_some() { "player spawned" } else { "no player" }
        );
        Ok(player)
    }
}

/// Draws the solid tiles of a tile-grid actor
pub struct TilemapView;

impl Behavior for TilemapView {
    fn draw(&self, actor: &Actor, canvas: &mut dyn Canvas) {
        let Some(grid) = actor.solid().and_then(|s| s.shape.as_grid()) else {
            return;
        };
        let origin = actor.position();
        for (x, y, _) in grid.solid_tiles() {
            let rect = grid.tile_rect(origin, x, y);
            canvas.fill_rect(rect, TILE_FILL);
            canvas.outline_rect(rect, TILE_EDGE);
        }
    }
}

fn valid_coord(v: i32) -> bool {
    v.abs() <= limits::MAX_COORD
}

/// Validate level data after loading.
pub fn validate_level(level: &LevelData) -> Result<(), LevelError> {
    let fail = |msg: String| Err(LevelError::ValidationError(msg));

    if level.width == 0 || level.height == 0 {
        return fail(format!("empty grid {}x{}", level.width, level.height));
    }
    if level.width > limits::MAX_GRID_SIZE || level.height > limits::MAX_GRID_SIZE {
        return fail(format!(
            "grid {}x{} exceeds {}",
            level.width,
            level.height,
            limits::MAX_GRID_SIZE
        ));
    }
    if level.tile_size <= 0 || level.tile_size > limits::MAX_TILE_SIZE {
        return fail(format!("invalid tile size {}", level.tile_size));
    }
    let expected = level.width * level.height;
    if level.tiles.len() != expected {
        return fail(format!("expected {} tiles, found {}", expected, level.tiles.len()));
    }
    if level.entrances.len() > limits::MAX_ENTRANCES {
        return fail(format!("too many entrances ({})", level.entrances.len()));
    }
    for (i, &(x, y)) in level.entrances.iter().enumerate() {
        if !valid_coord(x) || !valid_coord(y) {
            return fail(format!("entrance {} out of range ({}, {})", i, x, y));
        }
    }
    if level.platforms.len() > limits::MAX_PLATFORMS {
        return fail(format!("too many platforms ({})", level.platforms.len()));
    }
    for (i, p) in level.platforms.iter().enumerate() {
        if p.width <= 0 || p.height <= 0 {
            return fail(format!("platform {} has empty size {}x{}", i, p.width, p.height));
        }
        if !valid_coord(p.x) || !valid_coord(p.y) || !valid_coord(p.width) || !valid_coord(p.height) {
            return fail(format!("platform {} out of range", i));
        }
    }
    Ok(())
}

pub fn load_level_from_str(s: &str) -> Result<LevelData, LevelError> {
    let level: LevelData = ron::from_str(s)?;
    validate_level(&level)?;
    Ok(level)
}

pub fn load_level<P: AsRef<Path>>(path: P) -> Result<LevelData, LevelError> {
    let contents = fs::read_to_string(path)?;
    load_level_from_str(&contents)
}

pub fn serialize_level(level: &LevelData) -> Result<String, LevelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(level, config)?)
}

pub fn save_level<P: AsRef<Path>>(level: &LevelData, path: P) -> Result<(), LevelError> {
    fs::write(path, serialize_level(level)?)?;
    Ok(())
}

/// Built-in 320x240 level: a walled room with ledges and two moving platforms
pub fn demo_level() -> LevelData {
    let mut level = LevelData::new(0, 40, 30, 8);
    // Walls, floor, ceiling
    level.fill(0, 0, 39, 1, 1);
    level.fill(0, 28, 39, 29, 1);
    level.fill(0, 0, 1, 29, 1);
    level.fill(38, 0, 39, 29, 1);
    // Ledges
    level.fill(8, 22, 13, 22, 1);
    level.fill(26, 18, 33, 18, 1);
    // Steps
    level.fill(34, 26, 37, 27, 1);
    level.fill(36, 24, 37, 25, 1);

    level.entrances.push((24, 224));
    level.entrances.push((232, 144));

    level.platforms.push(PlatformData { x: 128, y: 176, width: 32, height: 8, velocity: (0x100, 0), period: 96 });
    level.platforms.push(PlatformData { x: 56, y: 128, width: 24, height: 8, velocity: (0, 0x80), period: 120 });
    level
}
