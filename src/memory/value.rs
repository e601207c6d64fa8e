//! Fixed-width unsigned values.

use crate::error::{Error, Result};

/// Width of a memory access in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 1 byte.
    One,
    /// 2 bytes.
    Two,
    /// 4 bytes.
    Four,
    /// 8 bytes.
    Eight,
}

impl Width {
    /// All supported widths, narrowest first.
    pub const ALL: [Width; 4] = [Width::One, Width::Two, Width::Four, Width::Eight];

    /// Number of bytes covered by an access of this width.
    pub fn bytes(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
            Width::Four => 4,
            Width::Eight => 8,
        }
    }

    /// Look up the width for a byte count.
    pub fn from_bytes(n: usize) -> Result<Self> {
        match n {
            1 => Ok(Width::One),
            2 => Ok(Width::Two),
            4 => Ok(Width::Four),
            8 => Ok(Width::Eight),
            _ => Err(Error::UnsupportedWidth(n)),
        }
    }

    /// Largest value representable at this width.
    pub fn max_value(self) -> u64 {
        match self {
            Width::One => u8::MAX as u64,
            Width::Two => u16::MAX as u64,
            Width::Four => u32::MAX as u64,
            Width::Eight => u64::MAX,
        }
    }
}

impl std::fmt::Display for Width {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// An unsigned integer of width 1, 2, 4 or 8 bytes.
///
/// Used both as the input of a write and as the destination of a read.
/// Byte conversions use the host's native byte order, matching how the
/// value sits in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedValue {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
}

impl TypedValue {
    /// A zero value of the given width, ready to be filled by a read.
    pub fn zeroed(width: Width) -> Self {
        match width {
            Width::One => TypedValue::Uint8(0),
            Width::Two => TypedValue::Uint16(0),
            Width::Four => TypedValue::Uint32(0),
            Width::Eight => TypedValue::Uint64(0),
        }
    }

    /// Narrow `value` to `width`, failing if it does not fit.
    pub fn from_u64(width: Width, value: u64) -> Result<Self> {
        if value > width.max_value() {
            return Err(Error::ValueOverflow {
                value,
                width: width.bytes(),
            });
        }

        Ok(match width {
            Width::One => TypedValue::Uint8(value as u8),
            Width::Two => TypedValue::Uint16(value as u16),
            Width::Four => TypedValue::Uint32(value as u32),
            Width::Eight => TypedValue::Uint64(value),
        })
    }

    /// The declared width.
    pub fn width(&self) -> Width {
        match self {
            TypedValue::Uint8(_) => Width::One,
            TypedValue::Uint16(_) => Width::Two,
            TypedValue::Uint32(_) => Width::Four,
            TypedValue::Uint64(_) => Width::Eight,
        }
    }

    /// The declared width in bytes.
    pub fn size_bytes(&self) -> usize {
        self.width().bytes()
    }

    /// The payload widened to 64 bits.
    pub fn as_u64(&self) -> u64 {
        match *self {
            TypedValue::Uint8(v) => v as u64,
            TypedValue::Uint16(v) => v as u64,
            TypedValue::Uint32(v) => v as u64,
            TypedValue::Uint64(v) => v,
        }
    }

    /// Serialize the payload in native byte order. Always `size_bytes()` long.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            TypedValue::Uint8(v) => v.to_ne_bytes().to_vec(),
            TypedValue::Uint16(v) => v.to_ne_bytes().to_vec(),
            TypedValue::Uint32(v) => v.to_ne_bytes().to_vec(),
            TypedValue::Uint64(v) => v.to_ne_bytes().to_vec(),
        }
    }

    /// Replace the payload with `bytes`, which must be exactly `size_bytes()` long.
    ///
    /// On error the previous payload is left untouched.
    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let expected = self.size_bytes();
        let mismatch = |_| Error::WidthMismatch {
            expected,
            actual: bytes.len(),
        };

        *self = match *self {
            TypedValue::Uint8(_) => {
                TypedValue::Uint8(u8::from_ne_bytes(bytes.try_into().map_err(mismatch)?))
            }
            TypedValue::Uint16(_) => {
                TypedValue::Uint16(u16::from_ne_bytes(bytes.try_into().map_err(mismatch)?))
            }
            TypedValue::Uint32(_) => {
                TypedValue::Uint32(u32::from_ne_bytes(bytes.try_into().map_err(mismatch)?))
            }
            TypedValue::Uint64(_) => {
                TypedValue::Uint64(u64::from_ne_bytes(bytes.try_into().map_err(mismatch)?))
            }
        };

        Ok(())
    }
}

impl From<u8> for TypedValue {
    fn from(v: u8) -> Self {
        TypedValue::Uint8(v)
    }
}

impl From<u16> for TypedValue {
    fn from(v: u16) -> Self {
        TypedValue::Uint16(v)
    }
}

impl From<u32> for TypedValue {
    fn from(v: u32) -> Self {
        TypedValue::Uint32(v)
    }
}

impl From<u64> for TypedValue {
    fn from(v: u64) -> Self {
        TypedValue::Uint64(v)
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

impl std::fmt::LowerHex for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.as_u64(), f)
    }
}
