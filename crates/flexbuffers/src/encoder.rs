//! FlexBuffers encoder for flat maps of scalars, strings and blobs.

use std::collections::BTreeMap;

use crate::types::pack_type;
use crate::FlexType;

/// A value that [`MapBuilder`] can store.
#[derive(Debug, Clone, PartialEq)]
pub enum MapValue {
    UInt(u64),
    Int(i64),
    Str(String),
    Blob(Vec<u8>),
}

impl MapValue {
    fn flex_type(&self) -> FlexType {
        match self {
            MapValue::UInt(_) => FlexType::UInt,
            MapValue::Int(_) => FlexType::Int,
            MapValue::Str(_) => FlexType::String,
            MapValue::Blob(_) => FlexType::Blob,
        }
    }
}

/// Builds a single FlexBuffers map as the buffer root.
///
/// Every slot, offset and size prefix uses one byte width (4 by default).
/// Keys are kept sorted; setting a key twice keeps the last value.
///
/// # Example
///
/// ```
/// use tree_ensemble_flexbuffers::{root, MapBuilder};
///
/// let bytes = MapBuilder::new()
///     .string("kind", "leq")
///     .blob("ids", &[1, 0, 2, 0])
///     .finish();
/// let map = root(&bytes).unwrap().as_map().unwrap();
/// assert_eq!(map.get("kind").unwrap().as_str().unwrap(), "leq");
/// assert_eq!(map.get("ids").unwrap().as_blob().unwrap(), &[1, 0, 2, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct MapBuilder {
    entries: BTreeMap<String, MapValue>,
    byte_width: usize,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::with_byte_width(4)
    }

    /// # Panics
    ///
    /// Panics if `byte_width` is not 1, 2, 4 or 8.
    pub fn with_byte_width(byte_width: usize) -> Self {
        assert!(
            matches!(byte_width, 1 | 2 | 4 | 8),
            "flexbuffers byte width must be 1, 2, 4 or 8, got {byte_width}"
        );
        Self {
            entries: BTreeMap::new(),
            byte_width,
        }
    }

    pub fn insert(&mut self, key: &str, value: MapValue) -> &mut Self {
        self.entries.insert(key.to_owned(), value);
        self
    }

    pub fn uint(&mut self, key: &str, value: u64) -> &mut Self {
        self.insert(key, MapValue::UInt(value))
    }

    pub fn int(&mut self, key: &str, value: i64) -> &mut Self {
        self.insert(key, MapValue::Int(value))
    }

    pub fn string(&mut self, key: &str, value: &str) -> &mut Self {
        self.insert(key, MapValue::Str(value.to_owned()))
    }

    pub fn blob(&mut self, key: &str, value: &[u8]) -> &mut Self {
        self.insert(key, MapValue::Blob(value.to_vec()))
    }

    /// Serializes the map.
    ///
    /// # Panics
    ///
    /// Panics if a value, length or offset does not fit the chosen byte width.
    pub fn finish(&self) -> Vec<u8> {
        let w = self.byte_width;
        let mut out = Vec::new();

        let key_positions: Vec<usize> = self
            .entries
            .keys()
            .map(|key| {
                let at = out.len();
                out.extend_from_slice(key.as_bytes());
                out.push(0);
                at
            })
            .collect();

        let payloads: Vec<Option<usize>> = self
            .entries
            .values()
            .map(|value| {
                let bytes = match value {
                    MapValue::Str(s) => s.as_bytes(),
                    MapValue::Blob(b) => b.as_slice(),
                    MapValue::UInt(_) | MapValue::Int(_) => return None,
                };
                align(&mut out, w);
                write_uint(&mut out, bytes.len() as u64, w);
                let at = out.len();
                out.extend_from_slice(bytes);
                if matches!(value, MapValue::Str(_)) {
                    out.push(0);
                }
                Some(at)
            })
            .collect();

        align(&mut out, w);
        write_uint(&mut out, key_positions.len() as u64, w);
        let keys = out.len();
        for key_at in &key_positions {
            write_offset(&mut out, *key_at, w);
        }

        align(&mut out, w);
        write_offset(&mut out, keys, w);
        write_uint(&mut out, w as u64, w);
        write_uint(&mut out, self.entries.len() as u64, w);
        let values = out.len();
        for (value, payload) in self.entries.values().zip(&payloads) {
            match (value, payload) {
                (MapValue::UInt(v), _) => write_uint(&mut out, *v, w),
                (MapValue::Int(v), _) => write_int(&mut out, *v, w),
                (_, Some(at)) => write_offset(&mut out, *at, w),
                (_, None) => unreachable!("sized values always have a payload"),
            }
        }
        for value in self.entries.values() {
            out.push(pack_type(value.flex_type(), w));
        }

        write_offset(&mut out, values, w);
        out.push(pack_type(FlexType::Map, w));
        out.push(w as u8);
        out
    }
}

fn align(out: &mut Vec<u8>, width: usize) {
    while out.len() % width != 0 {
        out.push(0);
    }
}

fn write_uint(out: &mut Vec<u8>, value: u64, width: usize) {
    assert!(
        width == 8 || value >> (width * 8) == 0,
        "{value} does not fit in {width} bytes"
    );
    out.extend_from_slice(&value.to_le_bytes()[..width]);
}

fn write_int(out: &mut Vec<u8>, value: i64, width: usize) {
    let bits = width * 8;
    assert!(
        width == 8 || (value >> (bits - 1) == 0 || value >> (bits - 1) == -1),
        "{value} does not fit in {width} bytes"
    );
    out.extend_from_slice(&value.to_le_bytes()[..width]);
}

/// Writes the backwards distance from the slot being written to `target`.
fn write_offset(out: &mut Vec<u8>, target: usize, width: usize) {
    let slot = out.len();
    write_uint(out, (slot - target) as u64, width);
}
