//! Protobuf wire format for vector tiles, written out by hand.
//!
//! The tile schema is small and append-only, so the encoder works directly
//! in terms of tags, varints, and length-delimited fields rather than going
//! through generated message types. Field numbers follow the vector tile
//! schema: `Tile.layers` is field 3; within a layer, `name`/`features`/
//! `keys`/`values`/`extent` are fields 1-5 and `version` is field 15.

use crate::layer::{Feature, Layer, Value};

const WIRE_VARINT: u32 = 0;
const WIRE_I64: u32 = 1;
const WIRE_LEN: u32 = 2;

/// A complete vector tile: an ordered list of layers.
#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub layers: Vec<Layer>,
}

impl Tile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
}

/// Serializes a tile into protobuf bytes.
///
/// Layers are written in insertion order; within a layer the field order is
/// name, features, keys, values, extent, version. Empty repeated fields are
/// omitted entirely, and feature ids are never written.
pub fn serialize(tile: &Tile) -> Vec<u8> {
    let mut out = Vec::new();
    for layer in &tile.layers {
        put_message(&mut out, 3, &encode_layer(layer));
    }

    out
}

fn encode_layer(layer: &Layer) -> Vec<u8> {
    let mut buf = Vec::new();

    put_string(&mut buf, 1, &layer.name);
    for feature in &layer.features {
        put_message(&mut buf, 2, &encode_feature(feature));
    }
    for key in &layer.keys {
        put_string(&mut buf, 3, key);
    }
    for value in &layer.values {
        put_message(&mut buf, 4, &encode_value(value));
    }
    put_uint(&mut buf, 5, u64::from(layer.extent));
    put_uint(&mut buf, 15, u64::from(layer.version));

    buf
}

fn encode_feature(feature: &Feature) -> Vec<u8> {
    let mut buf = Vec::new();

    if !feature.tags.is_empty() {
        put_packed(&mut buf, 2, &feature.tags);
    }
    put_uint(&mut buf, 3, feature.geom_type as u64);
    put_packed(&mut buf, 4, &feature.geometry);

    buf
}

fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();

    match value {
        Value::String(s) => put_string(&mut buf, 1, s),
        Value::Double(d) => {
            put_tag(&mut buf, 3, WIRE_I64);
            buf.extend_from_slice(&d.to_le_bytes());
        }
        // Negative ints take the full ten-byte two's complement varint.
        Value::Int(i) => put_uint(&mut buf, 4, *i as u64),
        Value::Bool(b) => put_uint(&mut buf, 7, u64::from(*b)),
    }

    buf
}

fn put_varint(buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push((v as u8) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

fn put_tag(buf: &mut Vec<u8>, field: u32, wire_type: u32) {
    put_varint(buf, u64::from((field << 3) | wire_type));
}

fn put_uint(buf: &mut Vec<u8>, field: u32, v: u64) {
    put_tag(buf, field, WIRE_VARINT);
    put_varint(buf, v);
}

fn put_string(buf: &mut Vec<u8>, field: u32, s: &str) {
    put_tag(buf, field, WIRE_LEN);
    put_varint(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn put_message(buf: &mut Vec<u8>, field: u32, body: &[u8]) {
    put_tag(buf, field, WIRE_LEN);
    put_varint(buf, body.len() as u64);
    buf.extend_from_slice(body);
}

fn put_packed(buf: &mut Vec<u8>, field: u32, values: &[u32]) {
    let mut body = Vec::with_capacity(values.len());
    for &v in values {
        put_varint(&mut body, u64::from(v));
    }

    put_message(buf, field, &body);
}
