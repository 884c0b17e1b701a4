//! # Track Sorcerer
//!
//! Tools for modeling and serving vector tiles of recorded GPS tracks.
//!
//! ## Current status
//!
//! This crate should be regarded as stable in terms of code reliability/correctness, but not
//! yet stable in terms of trait and method signatures. The wire output has
//! been verified against the public Mapbox Vector Tile schema and the encoder
//! is exercised end to end by the test suite. We are releasing this code in
//! Rust tradition as 0.x until we feel the interface and feature set have
//! stabilized.
//!
//! ## Current features
//!
//! Given a SQLite database of tile-indexed track geometries, this crate
//! renders Mapbox Vector Tiles entirely in-process: slippy-map tile bounds,
//! Web Mercator projection onto the tile grid, geometry command-stream
//! encoding, and protobuf serialization are all implemented here rather than
//! delegated to the database or to a protobuf library. A small `axum` server
//! exposes the rendered tiles over `GET /{z}/{x}/{y}`.
//!
//! ## Known Limitations
//!
//! Only line geometries are rendered; points and polygons are out of scope
//! for now. Geometries are not clipped to the tile (MVT renderers clip at
//! draw time) and are not simplified by zoom level. There is no tile cache
//! and no authentication; run it behind a reverse proxy if you need either.
//!
//! The trait-based design allows for further extensibility, so additional
//! store backends and source formats can be added in the future.

#![deny(warnings)]

// TODO: remove once async fn in traits become stable
use async_trait::async_trait;

use sqlx::SqlitePool;

use crate::error::Error;
use crate::render::TileOutcome;

/// Grid resolution of a rendered tile unless a source overrides it.
pub const DEFAULT_TILE_EXTENT: u32 = 4096;

/// Deepest zoom level with a representable tile grid (`2^z` must fit `u32`).
pub const MAX_TILE_ZOOM: u8 = 30;

/// This is the main trait exported by this crate. It is presently rather
/// barebones, but is open for future expansion if other store backends
/// become relevant.
#[async_trait]
pub trait TileSource: Sized {
    /// Renders the Mapbox vector tile for a slippy map tile in XYZ format.
    async fn render_mvt(
        &self,
        pool: &SqlitePool,
        zoom: u8,
        x: u32,
        y: u32,
    ) -> Result<TileOutcome, Error>;
}

pub mod error;
pub mod geometry;
pub mod layer;
pub mod render;
pub mod serve;
pub mod source;
pub mod tile;
pub mod wire;
