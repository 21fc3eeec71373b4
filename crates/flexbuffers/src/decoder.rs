//! FlexBuffers decoder.
//!
//! A FlexBuffers buffer is read from the end: the last byte is the root's
//! byte width, the byte before it is the root's packed type, and the root
//! slot sits immediately before that. Containers and strings are reached by
//! offsets that point backwards from the slot holding them.
//!
//! Every position derived from the buffer is checked before use, so a
//! corrupt or hostile buffer yields a [`FlexError`] rather than a panic.

use tree_ensemble_buffers::{BufferError, Reader};

use crate::types::{check_width, unpack_type};
use crate::{FlexError, FlexType};

/// Returns the root value of a FlexBuffers buffer.
///
/// # Example
///
/// ```
/// use tree_ensemble_flexbuffers::{root, MapBuilder};
///
/// let bytes = MapBuilder::new().uint("answer", 42).finish();
/// let map = root(&bytes).unwrap().as_map().unwrap();
/// assert_eq!(map.get("answer").unwrap().as_u32().unwrap(), 42);
/// ```
pub fn root(buf: &[u8]) -> Result<Reference<'_>, FlexError> {
    let len = buf.len();
    if len < 3 {
        return Err(FlexError::TooShort(len));
    }
    let width = check_width(u64::from(buf[len - 1]))?;
    let packed = buf[len - 2];
    let pos = (len - 2)
        .checked_sub(width)
        .ok_or(FlexError::TooShort(len))?;
    Reference::new(buf, pos, width, packed)
}

/// A typed handle on one value inside a buffer.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    buf: &'a [u8],
    /// Slot position in `buf`.
    pos: usize,
    /// Width of the slot itself.
    parent_width: usize,
    /// Width carried by the packed type; for offset types this is the width
    /// of the payload's elements and size prefix.
    byte_width: usize,
    ty: FlexType,
}

impl<'a> Reference<'a> {
    fn new(buf: &'a [u8], pos: usize, parent_width: usize, packed: u8) -> Result<Self, FlexError> {
        let (ty, byte_width) = unpack_type(packed)?;
        Ok(Self {
            buf,
            pos,
            parent_width,
            byte_width,
            ty,
        })
    }

    pub fn flex_type(&self) -> FlexType {
        self.ty
    }

    pub fn is_null(&self) -> bool {
        self.ty == FlexType::Null
    }

    fn reader(&self, pos: usize) -> Reader<'a> {
        Reader::at(self.buf, pos)
    }

    fn unexpected(&self, expected: &'static str) -> FlexError {
        FlexError::UnexpectedType {
            expected,
            found: self.ty.name(),
        }
    }

    /// Follows the backwards offset stored in this slot.
    fn indirect(&self) -> Result<usize, FlexError> {
        let offset = self.reader(self.pos).uint(self.parent_width)?;
        usize::try_from(offset)
            .ok()
            .and_then(|o| self.pos.checked_sub(o))
            .ok_or(FlexError::BadOffset {
                position: self.pos,
                offset,
            })
    }

    /// Reads the size prefix stored immediately before `target`.
    fn size_prefix(&self, target: usize) -> Result<u64, FlexError> {
        let at = target
            .checked_sub(self.byte_width)
            .ok_or(FlexError::BadOffset {
                position: target,
                offset: self.byte_width as u64,
            })?;
        Ok(self.reader(at).uint(self.byte_width)?)
    }

    /// Reads a sized payload (string or blob) at the end of this slot's offset.
    fn sized(&self) -> Result<&'a [u8], FlexError> {
        let target = self.indirect()?;
        let size = self.size_prefix(target)?;
        let size = usize::try_from(size).map_err(|_| FlexError::BadOffset {
            position: target,
            offset: size,
        })?;
        Ok(self.reader(target).buf(size)?)
    }

    /// Reads the value as an unsigned integer. Signed values are accepted
    /// when non-negative.
    pub fn as_u64(&self) -> Result<u64, FlexError> {
        match self.ty {
            FlexType::UInt => Ok(self.reader(self.pos).uint(self.parent_width)?),
            FlexType::IndirectUInt => Ok(self.reader(self.indirect()?).uint(self.byte_width)?),
            FlexType::Int | FlexType::IndirectInt => {
                let value = self.as_i64()?;
                u64::try_from(value).map_err(|_| FlexError::Overflow(i128::from(value)))
            }
            _ => Err(self.unexpected("unsigned integer")),
        }
    }

    pub fn as_u32(&self) -> Result<u32, FlexError> {
        let value = self.as_u64()?;
        u32::try_from(value).map_err(|_| FlexError::Overflow(i128::from(value)))
    }

    /// Reads the value as a signed integer. Unsigned values are accepted when
    /// they fit.
    pub fn as_i64(&self) -> Result<i64, FlexError> {
        match self.ty {
            FlexType::Int => Ok(self.reader(self.pos).int(self.parent_width)?),
            FlexType::IndirectInt => Ok(self.reader(self.indirect()?).int(self.byte_width)?),
            FlexType::UInt | FlexType::IndirectUInt => {
                let value = self.as_u64()?;
                i64::try_from(value).map_err(|_| FlexError::Overflow(i128::from(value)))
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    pub fn as_f64(&self) -> Result<f64, FlexError> {
        match self.ty {
            FlexType::Float => Ok(self.reader(self.pos).float(self.parent_width)?),
            FlexType::IndirectFloat => Ok(self.reader(self.indirect()?).float(self.byte_width)?),
            _ => Err(self.unexpected("float")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, FlexError> {
        match self.ty {
            FlexType::Bool => Ok(self.reader(self.pos).uint(self.parent_width)? != 0),
            _ => Err(self.unexpected("bool")),
        }
    }

    /// Reads a string or key without copying.
    pub fn as_str(&self) -> Result<&'a str, FlexError> {
        let bytes = match self.ty {
            FlexType::String => self.sized()?,
            FlexType::Key => self.reader(self.indirect()?).until_nul()?,
            _ => return Err(self.unexpected("string")),
        };
        std::str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8.into())
    }

    /// Borrows the bytes of a blob.
    pub fn as_blob(&self) -> Result<&'a [u8], FlexError> {
        match self.ty {
            FlexType::Blob => self.sized(),
            _ => Err(self.unexpected("blob")),
        }
    }

    pub fn as_map(&self) -> Result<Map<'a>, FlexError> {
        if self.ty != FlexType::Map {
            return Err(self.unexpected("map"));
        }
        Map::decode(self.buf, self.indirect()?, self.byte_width)
    }
}

/// A decoded map header. Keys are sorted, so lookups are a binary search.
#[derive(Debug, Clone, Copy)]
pub struct Map<'a> {
    buf: &'a [u8],
    values: usize,
    byte_width: usize,
    len: usize,
    keys: usize,
    keys_width: usize,
}

impl<'a> Map<'a> {
    /// Layout before `values`: keys offset, keys byte width, length.
    /// After the `len` value slots come `len` packed type bytes.
    fn decode(buf: &'a [u8], values: usize, byte_width: usize) -> Result<Self, FlexError> {
        let header = |slots: usize| {
            values
                .checked_sub(slots * byte_width)
                .ok_or(FlexError::BadOffset {
                    position: values,
                    offset: (slots * byte_width) as u64,
                })
        };

        let len = Reader::at(buf, header(1)?).uint(byte_width)?;
        let keys_width = check_width(Reader::at(buf, header(2)?).uint(byte_width)?)?;
        let keys_slot = header(3)?;
        let keys_offset = Reader::at(buf, keys_slot).uint(byte_width)?;
        let keys = usize::try_from(keys_offset)
            .ok()
            .and_then(|o| keys_slot.checked_sub(o))
            .ok_or(FlexError::BadOffset {
                position: keys_slot,
                offset: keys_offset,
            })?;
        let keys_prefix = keys.checked_sub(keys_width).ok_or(FlexError::BadOffset {
            position: keys,
            offset: keys_width as u64,
        })?;
        let keys_len = Reader::at(buf, keys_prefix).uint(keys_width)?;
        if keys_len != len {
            return Err(FlexError::KeyCountMismatch {
                values: len,
                keys: keys_len,
            });
        }

        // Both tables must fit before any element is touched.
        let len_usize = usize::try_from(len).map_err(|_| FlexError::Overflow(i128::from(len)))?;
        let fits = |start: usize, per_entry: usize| {
            len_usize
                .checked_mul(per_entry)
                .and_then(|n| start.checked_add(n))
                .is_some_and(|end| end <= buf.len())
        };
        if !fits(values, byte_width + 1) || !fits(keys, keys_width) {
            return Err(FlexError::BadOffset {
                position: values,
                offset: len,
            });
        }

        Ok(Self {
            buf,
            values,
            byte_width,
            len: len_usize,
            keys,
            keys_width,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn key_bytes(&self, index: usize) -> Result<&'a [u8], FlexError> {
        let slot = self.keys + index * self.keys_width;
        let offset = Reader::at(self.buf, slot).uint(self.keys_width)?;
        let at = usize::try_from(offset)
            .ok()
            .and_then(|o| slot.checked_sub(o))
            .ok_or(FlexError::BadOffset {
                position: slot,
                offset,
            })?;
        Ok(Reader::at(self.buf, at).until_nul()?)
    }

    /// Key at `index`, in sorted order.
    pub fn key(&self, index: usize) -> Result<&'a str, FlexError> {
        if index >= self.len {
            return Err(FlexError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        std::str::from_utf8(self.key_bytes(index)?)
            .map_err(|_| BufferError::InvalidUtf8.into())
    }

    /// Value at `index`, in key order.
    pub fn value(&self, index: usize) -> Result<Reference<'a>, FlexError> {
        if index >= self.len {
            return Err(FlexError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let packed = self.buf[self.values + self.len * self.byte_width + index];
        Reference::new(
            self.buf,
            self.values + index * self.byte_width,
            self.byte_width,
            packed,
        )
    }

    /// Looks up `key` by binary search over the sorted key vector.
    pub fn get(&self, key: &str) -> Result<Reference<'a>, FlexError> {
        let needle = key.as_bytes();
        let (mut lo, mut hi) = (0, self.len);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.key_bytes(mid)?.cmp(needle) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return self.value(mid),
            }
        }
        Err(FlexError::KeyNotFound(key.to_owned()))
    }

    /// Returns `None` when the key is absent and propagates every other error.
    pub fn find(&self, key: &str) -> Result<Option<Reference<'a>>, FlexError> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(FlexError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `{"a": 1}` with one-byte widths throughout, laid out by hand.
    const ONE_ENTRY: [u8; 12] = [
        b'a', 0x00, // key
        0x01, 0x03, // keys vector: len 1, offset back to "a"
        0x01, 0x01, 0x01, // map: keys offset, keys width, len
        0x01, // value slot: uint 1
        0x08, // packed type: uint, width 1
        0x02, 0x24, 0x01, // root: offset to map, packed map, width 1
    ];

    #[test]
    fn decodes_hand_built_map() {
        let map = root(&ONE_ENTRY).unwrap().as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.key(0), Ok("a"));
        assert_eq!(map.get("a").unwrap().as_u64(), Ok(1));
        assert_eq!(map.get("b").unwrap_err(), FlexError::KeyNotFound("b".into()));
        assert!(map.find("b").unwrap().is_none());
    }

    #[test]
    fn positional_access_past_the_end() {
        let map = root(&ONE_ENTRY).unwrap().as_map().unwrap();
        let past = FlexError::IndexOutOfRange { index: 1, len: 1 };
        assert_eq!(map.key(1), Err(past.clone()));
        assert_eq!(map.value(1).unwrap_err(), past);
    }

    #[test]
    fn invalid_utf8_key_is_an_error() {
        let mut bytes = ONE_ENTRY;
        bytes[0] = 0xff;
        let map = root(&bytes).unwrap().as_map().unwrap();
        assert_eq!(map.key(0), Err(FlexError::Buffer(BufferError::InvalidUtf8)));
    }

    #[test]
    fn keys_vector_before_buffer_start() {
        let mut bytes = ONE_ENTRY;
        // Keys offset lands on byte 0, leaving no room for the size prefix.
        bytes[4] = 0x04;
        let err = root(&bytes).unwrap().as_map().unwrap_err();
        assert!(matches!(err, FlexError::BadOffset { .. }), "{err:?}");
    }

    #[test]
    fn rejects_short_and_bad_width_buffers() {
        assert_eq!(root(&[0x24, 0x01]).unwrap_err(), FlexError::TooShort(2));
        assert_eq!(
            root(&[0x00, 0x24, 0x03]).unwrap_err(),
            FlexError::InvalidWidth(3)
        );
        assert_eq!(
            root(&[0x00, 0x24, 0x02]).unwrap_err(),
            FlexError::TooShort(3)
        );
    }

    #[test]
    fn offset_past_start_is_rejected() {
        let mut bytes = ONE_ENTRY;
        bytes[9] = 0x40;
        let err = root(&bytes).unwrap().as_map().unwrap_err();
        assert!(matches!(err, FlexError::BadOffset { .. }), "{err:?}");
    }

    #[test]
    fn oversized_map_length_is_rejected() {
        let mut bytes = ONE_ENTRY;
        bytes[6] = 0xff;
        bytes[2] = 0xff;
        let err = root(&bytes).unwrap().as_map().unwrap_err();
        assert!(matches!(err, FlexError::BadOffset { .. }), "{err:?}");
    }

    #[test]
    fn key_count_mismatch_is_rejected() {
        let mut bytes = ONE_ENTRY;
        bytes[2] = 0x02;
        assert_eq!(
            root(&bytes).unwrap().as_map().unwrap_err(),
            FlexError::KeyCountMismatch { values: 1, keys: 2 }
        );
    }

    #[test]
    fn wrong_kind_reports_both_types() {
        let value = root(&ONE_ENTRY).unwrap().as_map().unwrap().get("a").unwrap();
        assert_eq!(
            value.as_blob().unwrap_err(),
            FlexError::UnexpectedType {
                expected: "blob",
                found: "uint"
            }
        );
        assert_eq!(value.as_i64(), Ok(1));
        assert!(value.as_str().is_err());
    }
}
