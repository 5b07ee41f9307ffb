//! Fixed-width values stored inline in bucket segments.

use crate::error::MapError;

/// Declared width of every value in a map, fixed at construction.
///
/// `Zero` turns the map into a set: entries carry no payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueSize {
    Zero,
    One,
    Two,
    Four,
    Eight,
}

impl ValueSize {
    /// Largest supported value width, one machine word.
    pub const MAX_BYTES: usize = 8;

    pub const fn bytes(self) -> usize {
        match self {
            ValueSize::Zero => 0,
            ValueSize::One => 1,
            ValueSize::Two => 2,
            ValueSize::Four => 4,
            ValueSize::Eight => 8,
        }
    }
}

impl TryFrom<usize> for ValueSize {
    type Error = MapError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        match bytes {
            0 => Ok(ValueSize::Zero),
            1 => Ok(ValueSize::One),
            2 => Ok(ValueSize::Two),
            4 => Ok(ValueSize::Four),
            8 => Ok(ValueSize::Eight),
            other => Err(MapError::InvalidValueSize(other)),
        }
    }
}

/// A value of one of the supported widths.
///
/// The variant must agree with the map's [`ValueSize`]; a mismatch is
/// rejected by `set` rather than truncated or widened.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl Value {
    pub const fn size(self) -> ValueSize {
        match self {
            Value::U8(_) => ValueSize::One,
            Value::U16(_) => ValueSize::Two,
            Value::U32(_) => ValueSize::Four,
            Value::U64(_) => ValueSize::Eight,
        }
    }

    /// Zero-extended numeric value.
    pub const fn as_u64(self) -> u64 {
        match self {
            Value::U8(v) => v as u64,
            Value::U16(v) => v as u64,
            Value::U32(v) => v as u64,
            Value::U64(v) => v,
        }
    }

    /// Native-endian encoding; only the first `self.size().bytes()` bytes
    /// are meaningful.
    pub(crate) fn encode(self) -> [u8; ValueSize::MAX_BYTES] {
        let mut out = [0u8; ValueSize::MAX_BYTES];
        match self {
            Value::U8(v) => out[0] = v,
            Value::U16(v) => out[..2].copy_from_slice(&v.to_ne_bytes()),
            Value::U32(v) => out[..4].copy_from_slice(&v.to_ne_bytes()),
            Value::U64(v) => out.copy_from_slice(&v.to_ne_bytes()),
        }
        out
    }

    /// Decode stored bytes of the given width. Sets have no value.
    pub(crate) fn decode(size: ValueSize, bytes: &[u8]) -> Option<Value> {
        match size {
            ValueSize::Zero => None,
            ValueSize::One => Some(Value::U8(bytes[0])),
            ValueSize::Two => Some(Value::U16(u16::from_ne_bytes(array(bytes)))),
            ValueSize::Four => Some(Value::U32(u32::from_ne_bytes(array(bytes)))),
            ValueSize::Eight => Some(Value::U64(u64::from_ne_bytes(array(bytes)))),
        }
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_size_accepts_only_supported_widths() {
        for ok in [0usize, 1, 2, 4, 8] {
            assert_eq!(ValueSize::try_from(ok).unwrap().bytes(), ok);
        }
        for bad in [3usize, 5, 6, 7, 9, 16] {
            assert_eq!(
                ValueSize::try_from(bad),
                Err(MapError::InvalidValueSize(bad))
            );
        }
    }

    #[test]
    fn encode_decode_preserves_each_variant() {
        for v in [
            Value::U8(0xab),
            Value::U16(0xbeef),
            Value::U32(0xdead_beef),
            Value::U64(u64::MAX - 3),
        ] {
            let bytes = v.encode();
            let width = v.size().bytes();
            assert_eq!(Value::decode(v.size(), &bytes[..width]), Some(v));
        }
        assert_eq!(Value::decode(ValueSize::Zero, &[]), None);
    }

    #[test]
    fn as_u64_zero_extends() {
        assert_eq!(Value::U8(255).as_u64(), 255);
        assert_eq!(Value::from(7u16).as_u64(), 7);
    }
}
