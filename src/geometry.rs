//! MVT geometry command stream encoding.
//!
//! A linestring is encoded as a `MoveTo` of the first point followed by a
//! single `LineTo` run covering the rest, with every coordinate expressed as
//! a zigzag-encoded delta from the previous one.

use crate::error::Error;
use crate::tile::GridPoint;

/// Command identifiers from the vector tile specification.
pub const MOVE_TO: u32 = 1;
pub const LINE_TO: u32 = 2;

/// Packs a command identifier and repeat count into a single command word.
#[inline]
pub fn command(id: u32, count: u32) -> u32 {
    (id & 0x7) | (count << 3)
}

/// Zigzag-encodes a signed delta so small magnitudes stay small on the wire.
#[inline]
pub fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag`].
#[inline]
pub fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Encodes a linestring as an MVT geometry command stream.
///
/// Consecutive duplicate points are collapsed first; if fewer than two
/// distinct points remain the line cannot be drawn and
/// [`Error::DegenerateGeometry`] is returned. Deltas are computed in 64-bit
/// space and rejected with [`Error::SerializationOverflow`] if they fall
/// outside the signed 32-bit range.
pub fn encode_line(points: &[GridPoint]) -> Result<Vec<u32>, Error> {
    let mut distinct: Vec<GridPoint> = Vec::with_capacity(points.len());
    for &pt in points {
        if distinct.last() != Some(&pt) {
            distinct.push(pt);
        }
    }

    if distinct.len() < 2 {
        return Err(Error::DegenerateGeometry);
    }

    let mut commands = Vec::with_capacity(2 + 2 * distinct.len());
    let mut cursor = GridPoint::new(0, 0);

    commands.push(command(MOVE_TO, 1));
    push_delta(&mut commands, &mut cursor, distinct[0])?;

    commands.push(command(LINE_TO, (distinct.len() - 1) as u32));
    for &pt in &distinct[1..] {
        push_delta(&mut commands, &mut cursor, pt)?;
    }

    Ok(commands)
}

fn push_delta(commands: &mut Vec<u32>, cursor: &mut GridPoint, pt: GridPoint) -> Result<(), Error> {
    let dx = pt.x as i64 - cursor.x as i64;
    let dy = pt.y as i64 - cursor.y as i64;

    commands.push(zigzag(checked_delta(dx)?));
    commands.push(zigzag(checked_delta(dy)?));
    *cursor = pt;

    Ok(())
}

fn checked_delta(delta: i64) -> Result<i32, Error> {
    i32::try_from(delta).map_err(|_| Error::SerializationOverflow(delta))
}

/// Decodes a command stream produced by [`encode_line`] back into points.
///
/// Accepts any stream of `MoveTo`/`LineTo` runs, so it can also read
/// linestrings written by other encoders.
pub fn decode_line(commands: &[u32]) -> Result<Vec<GridPoint>, Error> {
    let mut points = Vec::new();
    let mut cursor = GridPoint::new(0, 0);
    let mut iter = commands.iter();

    while let Some(&word) = iter.next() {
        let id = word & 0x7;
        let count = word >> 3;
        if id != MOVE_TO && id != LINE_TO {
            return Err(Error::DegenerateGeometry);
        }

        for _ in 0..count {
            let dx = unzigzag(*iter.next().ok_or(Error::DegenerateGeometry)?);
            let dy = unzigzag(*iter.next().ok_or(Error::DegenerateGeometry)?);
            cursor = GridPoint::new(cursor.x + dx, cursor.y + dy);
            points.push(cursor);
        }
    }

    if points.len() < 2 {
        return Err(Error::DegenerateGeometry);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag() {
        let cases = [
            (0, 0),
            (-1, 1),
            (1, 2),
            (-2, 3),
            (2, 4),
            (4096, 8192),
            (-4096, 8191),
        ];

        for (signed, encoded) in cases {
            assert_eq!(zigzag(signed), encoded);
            assert_eq!(unzigzag(encoded), signed);
        }

        assert_eq!(unzigzag(zigzag(i32::MAX)), i32::MAX);
        assert_eq!(unzigzag(zigzag(i32::MIN)), i32::MIN);
    }

    #[test]
    fn test_command_word() {
        assert_eq!(command(MOVE_TO, 1), 9);
        assert_eq!(command(LINE_TO, 1), 10);
        assert_eq!(command(LINE_TO, 3), 26);
    }

    #[test]
    fn test_encode_simple_line() {
        let points = [GridPoint::new(2, 2), GridPoint::new(2, 10), GridPoint::new(10, 10)];
        let commands = encode_line(&points).expect("encodes");

        // Worked example from the vector tile specification.
        assert_eq!(commands, vec![9, 4, 4, 18, 0, 16, 16, 0]);
    }

    #[test]
    fn test_round_trip() {
        let points = [
            GridPoint::new(0, 0),
            GridPoint::new(-5, 4000),
            GridPoint::new(4096, 4096),
            GridPoint::new(12, -7),
        ];
        let commands = encode_line(&points).expect("encodes");

        assert_eq!(decode_line(&commands).expect("decodes"), points);
    }

    #[test]
    fn test_collapses_consecutive_duplicates() {
        let points = [
            GridPoint::new(1, 1),
            GridPoint::new(1, 1),
            GridPoint::new(5, 5),
            GridPoint::new(5, 5),
            GridPoint::new(5, 5),
            GridPoint::new(9, 1),
        ];
        let commands = encode_line(&points).expect("encodes");

        assert_eq!(
            decode_line(&commands).expect("decodes"),
            vec![GridPoint::new(1, 1), GridPoint::new(5, 5), GridPoint::new(9, 1)]
        );
    }

    #[test]
    fn test_degenerate_lines() {
        assert!(matches!(encode_line(&[]), Err(Error::DegenerateGeometry)));
        assert!(matches!(
            encode_line(&[GridPoint::new(3, 3)]),
            Err(Error::DegenerateGeometry)
        ));

        // All duplicates collapse to a single point.
        let stationary = [GridPoint::new(7, 7); 5];
        assert!(matches!(
            encode_line(&stationary),
            Err(Error::DegenerateGeometry)
        ));
    }

    #[test]
    fn test_delta_overflow() {
        let points = [GridPoint::new(i32::MIN, 0), GridPoint::new(i32::MAX, 0)];

        match encode_line(&points) {
            Err(Error::SerializationOverflow(delta)) => {
                assert_eq!(delta, i32::MAX as i64 - i32::MIN as i64);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }
}
