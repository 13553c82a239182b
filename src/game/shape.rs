//! Solid collision shapes
//!
//! A solid is either a plain box (its hitbox) or a static grid of tiles.
//! Both answer the same question: does this rectangle touch me?

use crate::math::{Fixed, FixedPoint, Rectangle};

use super::world::WorldError;

/// Shape of a solid actor
#[derive(Debug, Clone, PartialEq)]
pub enum SolidShape {
    /// The actor's hitbox is the solid area
    Box,
    /// Tile grid anchored at the hitbox location
    Grid(TileGrid),
}

impl SolidShape {
    /// Check `rect` against this shape, where `bounds` is the owning actor's hitbox.
    #[inline]
    pub fn intersects(&self, bounds: &Rectangle, rect: &Rectangle) -> bool {
        match self {
            SolidShape::Box => bounds.intersects(rect),
            SolidShape::Grid(grid) => grid.intersects(bounds.location(), rect),
        }
    }

    /// Grids never move, ride or get pushed
    pub fn is_static(&self) -> bool {
        matches!(self, SolidShape::Grid(_))
    }

    pub fn as_grid(&self) -> Option<&TileGrid> {
        match self {
            SolidShape::Grid(grid) => Some(grid),
            SolidShape::Box => None,
        }
    }
}

/// Row-major grid of integer tile values. Zero is empty, anything else is solid.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: Fixed,
    tiles: Vec<i32>,
}

impl TileGrid {
    /// Build a grid from row-major tile values (`tiles[y * width + x]`).
    pub fn new(width: usize, height: usize, tile_size: Fixed, tiles: Vec<i32>) -> Result<Self, WorldError> {
        let expected = width * height;
        if tiles.len() != expected {
            return Err(WorldError::GridSize { expected, found: tiles.len() });
        }
        Ok(Self { width, height, tile_size, tiles })
    }

    /// Grid with every tile empty
    pub fn empty(width: usize, height: usize, tile_size: Fixed) -> Self {
        Self { width, height, tile_size, tiles: vec![0; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> Fixed {
        self.tile_size
    }

    /// Total extent in fixed units
    pub fn size(&self) -> FixedPoint {
        FixedPoint::new(self.tile_size * self.width as i32, self.tile_size * self.height as i32)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        if x < self.width && y < self.height {
            Some(self.tiles[y * self.width + x])
        } else {
            None
        }
    }

    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|v| v != 0)
    }

    /// World-space rectangle of tile `(x, y)` for a grid anchored at `origin`
    pub fn tile_rect(&self, origin: FixedPoint, x: usize, y: usize) -> Rectangle {
        Rectangle::new(
            origin.x + self.tile_size * x as i32,
            origin.y + self.tile_size * y as i32,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Non-empty tiles as `(x, y, value)`, row by row
    pub fn solid_tiles(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(move |(i, v)| (i % self.width, i / self.width, *v))
    }

    /// Check `rect` against every non-empty tile it could overlap.
    pub fn intersects(&self, origin: FixedPoint, rect: &Rectangle) -> bool {
        let ts = self.tile_size.raw() as i64;
        if ts <= 0 {
            return false;
        }

        let left = (rect.x - origin.x).raw() as i64;
        let top = (rect.y - origin.y).raw() as i64;
        let right = left + rect.width.raw() as i64;
        let bottom = top + rect.height.raw() as i64;

        // Covered tile span, at least one tile wide on each axis
        let x0 = left.div_euclid(ts);
        let y0 = top.div_euclid(ts);
        let x1 = ceil_div(right, ts).max(x0 + 1);
        let y1 = ceil_div(bottom, ts).max(y0 + 1);

        let (x0, x1) = (x0.max(0), x1.min(self.width as i64));
        let (y0, y1) = (y0.max(0), y1.min(self.height as i64));

        for ty in y0..y1 {
            for tx in x0..x1 {
                let (tx, ty) = (tx as usize, ty as usize);
                if self.tiles[ty * self.width + tx] == 0 {
                    continue;
                }
                if self.tile_rect(origin, tx, ty).intersects(rect) {
                    return true;
                }
            }
        }
        false
    }
}

#[inline]
fn ceil_div(a: i64, b: i64) -> i64 {
    -((-a).div_euclid(b))
}
