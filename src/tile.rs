//! Slippy-map tile math: XYZ coordinates, EPSG:3857 tile bounds, and
//! projection onto the tile-local integer grid.

use crate::error::Error;
use crate::MAX_TILE_ZOOM;

/// Half the extent of the Web Mercator plane, in meters.
pub const ORIGIN_SHIFT: f64 = 20_037_508.342_789_2;

/// A slippy-map tile index in XYZ format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Validates and constructs a tile coordinate.
    ///
    /// `x` and `y` must lie in `[0, 2^z)`, and `z` must not exceed
    /// [`MAX_TILE_ZOOM`] so that `2^z` stays representable as a `u32`.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, Error> {
        if z > MAX_TILE_ZOOM {
            return Err(Error::InvalidTileCoord { z, x, y });
        }

        let tiles_per_side = 1u32 << z;
        if x >= tiles_per_side || y >= tiles_per_side {
            return Err(Error::InvalidTileCoord { z, x, y });
        }

        Ok(Self { z, x, y })
    }

    /// EPSG:3857 bounding box of this tile, in meters.
    ///
    /// Tile row 0 is the northernmost row, so `y` grows southward.
    pub fn bounds(&self) -> TileBounds {
        let tile_size = (2.0 * ORIGIN_SHIFT) / (1u32 << self.z) as f64;

        let west = -ORIGIN_SHIFT + self.x as f64 * tile_size;
        let north = ORIGIN_SHIFT - self.y as f64 * tile_size;

        TileBounds {
            west,
            south: north - tile_size,
            east: west + tile_size,
            north,
        }
    }
}

/// EPSG:3857 bounding box of a single tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl TileBounds {
    /// Projects a Mercator point onto the tile-local grid.
    ///
    /// The grid origin is the tile's top-left corner (the MVT convention),
    /// so grid y grows southward. Rounding is half-away-from-zero to keep
    /// output reproducible across platforms. No clipping is performed;
    /// points outside the tile project to values outside `[0, extent)` and
    /// are clipped by the renderer instead.
    pub fn project(&self, pt: MercatorPoint, extent: u32) -> Result<GridPoint, Error> {
        let width = self.east - self.west;
        let height = self.north - self.south;

        let gx = ((pt.x - self.west) / width * extent as f64).round();
        let gy = ((self.north - pt.y) / height * extent as f64).round();

        Ok(GridPoint {
            x: grid_value(gx)?,
            y: grid_value(gy)?,
        })
    }
}

/// A point on the Web Mercator plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorPoint {
    pub x: f64,
    pub y: f64,
}

impl MercatorPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point on a tile's local integer grid.
///
/// Nominally in `[0, extent)`, but values outside that range are legal for
/// geometries crossing the tile edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// Projected values can exceed the grid's signed 32-bit domain when a point
// lies far outside the tile at high zoom; those features get dropped rather
// than wrapped.
fn grid_value(v: f64) -> Result<i32, Error> {
    if v < i32::MIN as f64 || v > i32::MAX as f64 {
        return Err(Error::SerializationOverflow(v as i64));
    }

    Ok(v as i32)
}
