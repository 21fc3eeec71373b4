//! FlexBuffers value types and packed type bytes.

use crate::FlexError;

/// The type half of a FlexBuffers packed type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FlexType {
    Null = 0,
    Int = 1,
    UInt = 2,
    Float = 3,
    Key = 4,
    String = 5,
    IndirectInt = 6,
    IndirectUInt = 7,
    IndirectFloat = 8,
    Map = 9,
    Vector = 10,
    VectorInt = 11,
    VectorUInt = 12,
    VectorFloat = 13,
    VectorKey = 14,
    VectorStringDeprecated = 15,
    VectorInt2 = 16,
    VectorUInt2 = 17,
    VectorFloat2 = 18,
    VectorInt3 = 19,
    VectorUInt3 = 20,
    VectorFloat3 = 21,
    VectorInt4 = 22,
    VectorUInt4 = 23,
    VectorFloat4 = 24,
    Blob = 25,
    Bool = 26,
    VectorBool = 36,
}

impl FlexType {
    pub fn from_u8(value: u8) -> Option<Self> {
        use FlexType::*;
        Some(match value {
            0 => Null,
            1 => Int,
            2 => UInt,
            3 => Float,
            4 => Key,
            5 => String,
            6 => IndirectInt,
            7 => IndirectUInt,
            8 => IndirectFloat,
            9 => Map,
            10 => Vector,
            11 => VectorInt,
            12 => VectorUInt,
            13 => VectorFloat,
            14 => VectorKey,
            15 => VectorStringDeprecated,
            16 => VectorInt2,
            17 => VectorUInt2,
            18 => VectorFloat2,
            19 => VectorInt3,
            20 => VectorUInt3,
            21 => VectorFloat3,
            22 => VectorInt4,
            23 => VectorUInt4,
            24 => VectorFloat4,
            25 => Blob,
            26 => Bool,
            36 => VectorBool,
            _ => return None,
        })
    }

    /// Inline types are stored directly in their parent's slot; every other
    /// type stores a backwards offset to its payload.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            FlexType::Null | FlexType::Int | FlexType::UInt | FlexType::Float | FlexType::Bool
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            FlexType::Null => "null",
            FlexType::Int | FlexType::IndirectInt => "int",
            FlexType::UInt | FlexType::IndirectUInt => "uint",
            FlexType::Float | FlexType::IndirectFloat => "float",
            FlexType::Key => "key",
            FlexType::String => "string",
            FlexType::Map => "map",
            FlexType::Blob => "blob",
            FlexType::Bool => "bool",
            _ => "vector",
        }
    }
}

/// Byte widths a FlexBuffers slot may use.
pub(crate) fn check_width(width: u64) -> Result<usize, FlexError> {
    match width {
        1 | 2 | 4 | 8 => Ok(width as usize),
        _ => Err(FlexError::InvalidWidth(width)),
    }
}

/// Splits a packed type byte into its type and the byte width it carries.
pub(crate) fn unpack_type(packed: u8) -> Result<(FlexType, usize), FlexError> {
    let ty = FlexType::from_u8(packed >> 2).ok_or(FlexError::UnknownType(packed))?;
    Ok((ty, 1usize << (packed & 3)))
}

pub(crate) fn pack_type(ty: FlexType, byte_width: usize) -> u8 {
    let bits = match byte_width {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    };
    ((ty as u8) << 2) | bits
}
