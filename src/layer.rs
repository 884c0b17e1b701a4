//! In-memory model of a vector tile layer and its features.
//!
//! [`LayerBuilder`] interns attribute keys and values into the layer-level
//! string and value tables, so features carry compact index pairs instead of
//! repeated strings.

use std::collections::HashMap;

use crate::error::Error;
use crate::geometry;
use crate::tile::GridPoint;

/// Geometry class carried in a feature's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum GeomType {
    Unknown = 0,
    Point = 1,
    Linestring = 2,
    Polygon = 3,
}

/// A typed attribute value from the MVT value vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// A single feature: tag index pairs plus an encoded geometry stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Alternating key and value indexes into the layer tables.
    pub tags: Vec<u32>,
    pub geom_type: GeomType,
    /// Geometry command stream as produced by [`geometry::encode_line`].
    pub geometry: Vec<u32>,
}

/// Vector tile schema version written into every layer.
pub const MVT_VERSION: u32 = 2;

/// A complete layer ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub features: Vec<Feature>,
    pub keys: Vec<String>,
    pub values: Vec<Value>,
    pub extent: u32,
    pub version: u32,
}

/// Accumulates features into a layer, deduplicating keys and values.
#[derive(Debug)]
pub struct LayerBuilder {
    name: String,
    extent: u32,
    features: Vec<Feature>,
    keys: Vec<String>,
    key_index: HashMap<String, u32>,
    values: Vec<Value>,
}

impl LayerBuilder {
    pub fn new(name: impl Into<String>, extent: u32) -> Self {
        Self {
            name: name.into(),
            extent,
            features: Vec::new(),
            keys: Vec::new(),
            key_index: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Encodes `points` as a linestring feature tagged with `attrs`.
    ///
    /// Attribute order is preserved in the feature's tag list. Errors from
    /// geometry encoding propagate unchanged, leaving the layer as it was.
    pub fn add_line_feature(
        &mut self,
        points: &[GridPoint],
        attrs: &[(&str, Value)],
    ) -> Result<(), Error> {
        let commands = geometry::encode_line(points)?;

        let mut tags = Vec::with_capacity(attrs.len() * 2);
        for (key, value) in attrs {
            tags.push(self.intern_key(key));
            tags.push(self.intern_value(value));
        }

        self.features.push(Feature {
            tags,
            geom_type: GeomType::Linestring,
            geometry: commands,
        });

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn finish(self) -> Layer {
        Layer {
            name: self.name,
            features: self.features,
            keys: self.keys,
            values: self.values,
            extent: self.extent,
            version: MVT_VERSION,
        }
    }

    fn intern_key(&mut self, key: &str) -> u32 {
        if let Some(&index) = self.key_index.get(key) {
            return index;
        }

        let index = self.keys.len() as u32;
        self.keys.push(key.to_string());
        self.key_index.insert(key.to_string(), index);
        index
    }

    // Values are deduplicated by scan rather than hashing so that Double
    // values compare structurally.
    fn intern_value(&mut self, value: &Value) -> u32 {
        if let Some(index) = self.values.iter().position(|v| v == value) {
            return index as u32;
        }

        self.values.push(value.clone());
        (self.values.len() - 1) as u32
    }
}
