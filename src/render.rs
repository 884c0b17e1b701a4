//! Tile assembly: parsing stored coordinate text, projecting it onto the
//! tile grid, and serializing the resulting layer.

use tracing::{debug, warn};

use crate::error::Error;
use crate::layer::{LayerBuilder, Value};
use crate::tile::{MercatorPoint, TileBounds, TileCoord};
use crate::wire::{self, Tile};

/// A stored line row: display name plus packed coordinate text.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub name: String,
    pub coords: String,
}

/// The result of building one tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileOutcome {
    /// No feature survived. Served as `204 No Content`; a zero-length
    /// protobuf body is never emitted.
    Empty,
    Bytes(Vec<u8>),
}

/// Parses coordinate text of the form `"x1,y1;x2,y2;..."`.
///
/// Values are Web Mercator meters. Tokens tolerate surrounding ASCII
/// whitespace. An empty or blank string parses to zero points; any token
/// that is not exactly two finite decimal numbers fails with
/// [`Error::MalformedCoordinateText`] carrying the offending token.
pub fn parse_coords(text: &str) -> Result<Vec<MercatorPoint>, Error> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    text.split(';').map(parse_point).collect()
}

fn parse_point(token: &str) -> Result<MercatorPoint, Error> {
    let mut fields = token.split(',').map(str::trim);
    let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(malformed(token));
    };

    let x: f64 = x.parse().map_err(|_| malformed(token))?;
    let y: f64 = y.parse().map_err(|_| malformed(token))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(malformed(token));
    }

    Ok(MercatorPoint::new(x, y))
}

fn malformed(token: &str) -> Error {
    Error::MalformedCoordinateText(token.trim().to_string())
}

/// Assembles the tile for `coord` from pre-filtered store rows.
///
/// Every feature lands in a single layer named `layer_name`. A row whose
/// coordinate text fails to parse, collapses to fewer than two distinct
/// points, or overflows the grid is skipped with a log line; the remaining
/// rows still render. Zero surviving features yields [`TileOutcome::Empty`].
pub fn build_tile(
    coord: TileCoord,
    rows: &[TrackRow],
    layer_name: &str,
    extent: u32,
) -> TileOutcome {
    let bounds = coord.bounds();
    let mut builder = LayerBuilder::new(layer_name, extent);

    for row in rows {
        if let Err(err) = add_row(&mut builder, &bounds, extent, row) {
            match err {
                Error::DegenerateGeometry => {
                    debug!(name = %row.name, "skipping line with fewer than two distinct points");
                }
                err => {
                    warn!(name = %row.name, %err, "skipping unrenderable row");
                }
            }
        }
    }

    if builder.is_empty() {
        return TileOutcome::Empty;
    }

    let mut tile = Tile::new();
    tile.push_layer(builder.finish());

    TileOutcome::Bytes(wire::serialize(&tile))
}

fn add_row(
    builder: &mut LayerBuilder,
    bounds: &TileBounds,
    extent: u32,
    row: &TrackRow,
) -> Result<(), Error> {
    let points = parse_coords(&row.coords)?
        .into_iter()
        .map(|pt| bounds.project(pt, extent))
        .collect::<Result<Vec<_>, _>>()?;

    builder.add_line_feature(&points, &[("name", Value::String(row.name.clone()))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_TILE_EXTENT;

    fn row(name: &str, coords: &str) -> TrackRow {
        TrackRow {
            name: name.to_string(),
            coords: coords.to_string(),
        }
    }

    fn greenwich_tile() -> TileCoord {
        TileCoord::new(10, 512, 340).expect("valid tile")
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_parse_coords() {
        let points = parse_coords("100.0,200.0;110.5,-205.25").expect("parses");
        assert_eq!(
            points,
            vec![
                MercatorPoint::new(100.0, 200.0),
                MercatorPoint::new(110.5, -205.25)
            ]
        );

        // Whitespace around tokens and fields is tolerated.
        let padded = parse_coords(" 1.0 , 2.0 ; 3.0 , 4.0 ").expect("parses");
        assert_eq!(padded.len(), 2);

        assert_eq!(parse_coords("").expect("parses"), vec![]);
        assert_eq!(parse_coords("   ").expect("parses"), vec![]);
    }

    #[test]
    fn test_parse_coords_malformed() {
        for text in [
            "100.0,200.0,300.0", // three fields
            "100.0",             // one field
            "a,b",               // not numeric
            "1.0,2.0;",          // dangling separator
            "1.0,NaN",           // non-finite
        ] {
            assert!(
                matches!(parse_coords(text), Err(Error::MalformedCoordinateText(_))),
                "expected failure for {text:?}"
            );
        }

        match parse_coords("1.0,2.0;oops;3.0,4.0") {
            Err(Error::MalformedCoordinateText(token)) => assert_eq!(token, "oops"),
            other => panic!("expected malformed token, got {other:?}"),
        }
    }

    #[test]
    fn test_single_row_tile() {
        let rows = [row("Trail", "-11019.0,11019.0;-10919.0,11119.0")];
        let outcome = build_tile(greenwich_tile(), &rows, "activities", DEFAULT_TILE_EXTENT);

        let TileOutcome::Bytes(bytes) = outcome else {
            panic!("expected bytes");
        };

        // Tile.layers message with the layer name and the single attribute.
        assert_eq!(bytes[0], 0x1a);
        assert!(contains(&bytes, b"activities"));
        assert!(contains(&bytes, b"name"));
        assert!(contains(&bytes, b"Trail"));
    }

    #[test]
    fn test_malformed_row_yields_empty_tile() {
        // Odd field count in the only row: skipped, nothing to serve.
        let rows = [row("Broken", "1,2,3")];
        let outcome = build_tile(greenwich_tile(), &rows, "activities", DEFAULT_TILE_EXTENT);

        assert_eq!(outcome, TileOutcome::Empty);
    }

    #[test]
    fn test_sub_cell_line_collapses() {
        // One grid cell at z=10 covers ~9.6 m; a line moving only 1 m
        // projects both endpoints into the same cell and degenerates.
        let rows = [row("Trail", "-11019.0,11019.0;-11018.0,11019.0")];
        let outcome = build_tile(greenwich_tile(), &rows, "activities", DEFAULT_TILE_EXTENT);

        assert_eq!(outcome, TileOutcome::Empty);
    }

    #[test]
    fn test_bad_rows_do_not_block_good_rows() {
        let rows = [
            row("Morning Run", "0.0,6700000.0;500.0,6700500.0"),
            row("Broken", "not-coordinates"),
            row("Stationary", "10.0,6700000.0;10.0,6700000.0"),
            row("Evening Ride", "900.0,6700000.0;1400.0,6699500.0"),
        ];
        let outcome = build_tile(greenwich_tile(), &rows, "activities", DEFAULT_TILE_EXTENT);

        let TileOutcome::Bytes(bytes) = outcome else {
            panic!("expected bytes");
        };
        assert!(contains(&bytes, b"Morning Run"));
        assert!(contains(&bytes, b"Evening Ride"));
        assert!(!contains(&bytes, b"Broken"));
        assert!(!contains(&bytes, b"Stationary"));
    }

    #[test]
    fn test_world_tile_keeps_out_of_range_points() {
        // At z=0 the whole Mercator plane is one tile; edge points map to
        // grid values at or beyond the extent and are kept as-is.
        let world = TileCoord::new(0, 0, 0).expect("valid tile");
        let rows = [row(
            "Antipodal",
            "-20037508.3427892,20037508.3427892;20037508.3427892,-20037508.3427892",
        )];
        let outcome = build_tile(world, &rows, "activities", DEFAULT_TILE_EXTENT);

        assert!(matches!(outcome, TileOutcome::Bytes(_)));
    }

    #[test]
    fn test_no_rows_is_empty() {
        let outcome = build_tile(greenwich_tile(), &[], "activities", DEFAULT_TILE_EXTENT);
        assert_eq!(outcome, TileOutcome::Empty);
    }

    #[test]
    fn test_shared_names_are_deduplicated() {
        let rows = [
            row("Trail", "0.0,6700000.0;500.0,6700500.0"),
            row("Trail", "900.0,6700000.0;1400.0,6699500.0"),
        ];
        let outcome = build_tile(greenwich_tile(), &rows, "activities", DEFAULT_TILE_EXTENT);

        let TileOutcome::Bytes(bytes) = outcome else {
            panic!("expected bytes");
        };

        // One interned key and one interned value serve both features.
        assert_eq!(count(&bytes, b"name"), 1);
        assert_eq!(count(&bytes, b"Trail"), 1);
    }
}
