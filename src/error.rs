#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Tile coordinate out of range: {z}/{x}/{y}.")]
    InvalidTileCoord { z: u8, x: u32, y: u32 },

    #[error("Malformed coordinate text near {0:?}.")]
    MalformedCoordinateText(String),

    #[error("Line has fewer than two distinct points.")]
    DegenerateGeometry,

    #[error("Coordinate delta {0} does not fit the signed 32-bit grid.")]
    SerializationOverflow(i64),

    #[error("Invalid YAML in TrackSource.")]
    Source(#[from] serde_yaml::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
