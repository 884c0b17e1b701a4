/// Track tile source YAML format.
///
/// A small modeled document naming the served layer, its tile extent, the
/// zoom ceiling, and the backing tile-index table.
use crate::error::Error;
use crate::render::{self, TileOutcome, TrackRow};
use crate::tile::TileCoord;
use crate::{TileSource, DEFAULT_TILE_EXTENT};

use serde::Deserialize;

// TODO: remove once async fn in traits become stable
use async_trait::async_trait;

use futures::TryStreamExt;
use sqlx::{query, Row, SqlitePool};

/// A modeled track tile source.
///
/// Every field carries a default, so an empty document (`{}`) yields the
/// baseline source: layer `activities`, extent 4096, served through zoom 18,
/// backed by the `activity_tiles` index table.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct TrackSource {
    pub name: String,
    pub extent: u32,
    #[serde(rename = "maxzoom")]
    pub max_zoom: u8,
    pub table: String,
}

impl Default for TrackSource {
    fn default() -> Self {
        TrackSource {
            name: String::from("activities"),
            extent: DEFAULT_TILE_EXTENT,
            max_zoom: 18,
            table: String::from("activity_tiles"),
        }
    }
}

impl TrackSource {
    /// Constructs a new TrackSource from a YAML document string.
    pub fn from_yaml(data: &str) -> Result<TrackSource, Error> {
        Ok(serde_yaml::from_str(data)?)
    }

    // The tile index table name is interpolated; the tile coordinates are
    // bound as parameters when the query runs.
    fn query_sql(&self) -> String {
        format!(
            "SELECT activities.name, {table}.mercator_coords \
             FROM {table} \
             JOIN activities ON {table}.activity_id = activities.id \
             WHERE tile_z = ? AND tile_x = ? AND tile_y = ?",
            table = self.table
        )
    }
}

#[async_trait]
impl TileSource for TrackSource {
    async fn render_mvt(
        &self,
        pool: &SqlitePool,
        zoom: u8,
        x: u32,
        y: u32,
    ) -> Result<TileOutcome, Error> {
        if zoom > self.max_zoom {
            return Err(Error::InvalidTileCoord { z: zoom, x, y });
        }
        let coord = TileCoord::new(zoom, x, y)?;

        let sql = self.query_sql();
        let mut conn = pool.acquire().await?;
        let mut stream = query(&sql)
            .bind(i64::from(zoom))
            .bind(i64::from(x))
            .bind(i64::from(y))
            .fetch(&mut *conn);

        let mut rows: Vec<TrackRow> = Vec::new();
        while let Some(row) = stream.try_next().await? {
            rows.push(TrackRow {
                name: row.get(0),
                coords: row.get(1),
            });
        }

        Ok(render::build_tile(coord, &rows, &self.name, self.extent))
    }
}
