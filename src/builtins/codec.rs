//! Element codec: how each fixed-width element kind maps between raw bytes
//! and numeric values.
//!
//! Integer kinds are two's complement of their width; float kinds are
//! IEEE-754 binary32/binary64. Byte order is chosen per call, big-endian
//! unless the caller asks for little-endian. Writes narrow with the usual
//! ToInt8 ... ToBigUint64 conversions, so a value out of range wraps (or
//! clamps, for `Uint8Clamped`) instead of failing.

use std::fmt;

use num_bigint::BigInt;

use crate::error::{BufferError, Result};
use crate::types::{NumericValue, bigint_ops, number_ops};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

/// Runs `$body` with `$t` bound to the Rust element type of `$kind`.
macro_rules! dispatch_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            $crate::builtins::codec::ElementKind::Int8 => {
                type $t = i8;
                $body
            }
            $crate::builtins::codec::ElementKind::Uint8 => {
                type $t = u8;
                $body
            }
            $crate::builtins::codec::ElementKind::Uint8Clamped => {
                type $t = $crate::builtins::codec::U8Clamped;
                $body
            }
            $crate::builtins::codec::ElementKind::Int16 => {
                type $t = i16;
                $body
            }
            $crate::builtins::codec::ElementKind::Uint16 => {
                type $t = u16;
                $body
            }
            $crate::builtins::codec::ElementKind::Int32 => {
                type $t = i32;
                $body
            }
            $crate::builtins::codec::ElementKind::Uint32 => {
                type $t = u32;
                $body
            }
            $crate::builtins::codec::ElementKind::Float32 => {
                type $t = f32;
                $body
            }
            $crate::builtins::codec::ElementKind::Float64 => {
                type $t = f64;
                $body
            }
            $crate::builtins::codec::ElementKind::BigInt64 => {
                type $t = i64;
                $body
            }
            $crate::builtins::codec::ElementKind::BigUint64 => {
                type $t = u64;
                $body
            }
        }
    };
}
pub(crate) use dispatch_kind;

impl ElementKind {
    pub const ALL: [ElementKind; 11] = [
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Uint8Clamped,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::BigInt64,
        ElementKind::BigUint64,
    ];

    pub fn bytes_per_element(self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 | ElementKind::Uint8Clamped => 1,
            ElementKind::Int16 | ElementKind::Uint16 => 2,
            ElementKind::Int32 | ElementKind::Uint32 | ElementKind::Float32 => 4,
            ElementKind::Float64 | ElementKind::BigInt64 | ElementKind::BigUint64 => 8,
        }
    }

    /// Constructor name of the typed array holding this kind.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "Int8Array",
            ElementKind::Uint8 => "Uint8Array",
            ElementKind::Uint8Clamped => "Uint8ClampedArray",
            ElementKind::Int16 => "Int16Array",
            ElementKind::Uint16 => "Uint16Array",
            ElementKind::Int32 => "Int32Array",
            ElementKind::Uint32 => "Uint32Array",
            ElementKind::Float32 => "Float32Array",
            ElementKind::Float64 => "Float64Array",
            ElementKind::BigInt64 => "BigInt64Array",
            ElementKind::BigUint64 => "BigUint64Array",
        }
    }

    /// Accepts constructor names (`Int16Array`) and DataView accessor
    /// suffixes (`int16`, `Int16`), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let short = lower.strip_suffix("array").unwrap_or(&lower);
        ElementKind::ALL.into_iter().find(|kind| {
            kind.name()
                .to_ascii_lowercase()
                .strip_suffix("array")
                .is_some_and(|n| n == short)
        })
    }

    pub fn is_bigint(self) -> bool {
        matches!(self, ElementKind::BigInt64 | ElementKind::BigUint64)
    }

    /// The value type this kind stores: `"BigInt"` or `"Number"`.
    pub fn content_name(self) -> &'static str {
        if self.is_bigint() { "BigInt" } else { "Number" }
    }

    /// Decode exactly `bytes_per_element()` bytes.
    pub fn decode(self, bytes: &[u8], little_endian: bool) -> Result<NumericValue> {
        self.check_width(bytes.len())?;
        Ok(dispatch_kind!(self, T => {
            let mut raw = <T as Element>::Bytes::default();
            raw.as_mut().copy_from_slice(bytes);
            T::decode(raw, little_endian).to_numeric()
        }))
    }

    /// Narrow `value` to this kind and encode it.
    pub fn encode(self, value: &NumericValue, little_endian: bool) -> Result<Vec<u8>> {
        Ok(dispatch_kind!(self, T => {
            T::from_numeric(value)?.encode(little_endian).as_ref().to_vec()
        }))
    }

    fn check_width(self, len: usize) -> Result<()> {
        if len == self.bytes_per_element() {
            Ok(())
        } else {
            Err(BufferError::range(format!(
                "{} element needs {} bytes, got {len}",
                self.name(),
                self.bytes_per_element()
            )))
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A byte that saturates into `[0, 255]` on write instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct U8Clamped(pub u8);

impl fmt::Debug for U8Clamped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

mod private {
    pub trait Sealed {}
}

/// A Rust type that can live in a typed array.
pub trait Element: private::Sealed + Copy + PartialEq + fmt::Debug + 'static {
    const KIND: ElementKind;
    const BYTES_PER_ELEMENT: usize;

    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default + Copy;

    fn decode(bytes: Self::Bytes, little_endian: bool) -> Self;
    fn encode(self, little_endian: bool) -> Self::Bytes;

    fn to_numeric(self) -> NumericValue;

    /// Narrow a Number (or BigInt, for the 64-bit kinds) into this type.
    fn from_numeric(value: &NumericValue) -> Result<Self>;

    /// Typed arrays always use the platform byte order.
    #[inline(always)]
    fn decode_native(bytes: Self::Bytes) -> Self {
        Self::decode(bytes, cfg!(target_endian = "little"))
    }

    #[inline(always)]
    fn encode_native(self) -> Self::Bytes {
        self.encode(cfg!(target_endian = "little"))
    }
}

fn content_mismatch(expected: ElementKind, value: &NumericValue) -> BufferError {
    BufferError::ContentTypeMismatch {
        expected: expected.content_name(),
        found: value.content_name(),
    }
}

// rounds to nearest binary32
fn to_float32(n: f64) -> f32 {
    n as f32
}

fn to_float64(n: f64) -> f64 {
    n
}

macro_rules! number_element {
    ($ty:ty, $kind:ident, $width:literal, $narrow:expr) => {
        impl private::Sealed for $ty {}

        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;
            const BYTES_PER_ELEMENT: usize = $width;

            type Bytes = [u8; $width];

            fn decode(bytes: Self::Bytes, little_endian: bool) -> Self {
                if little_endian {
                    <$ty>::from_le_bytes(bytes)
                } else {
                    <$ty>::from_be_bytes(bytes)
                }
            }

            fn encode(self, little_endian: bool) -> Self::Bytes {
                if little_endian {
                    self.to_le_bytes()
                } else {
                    self.to_be_bytes()
                }
            }

            fn to_numeric(self) -> NumericValue {
                NumericValue::Number(f64::from(self))
            }

            fn from_numeric(value: &NumericValue) -> Result<Self> {
                match value {
                    NumericValue::Number(n) => Ok($narrow(*n)),
                    NumericValue::BigInt(_) => Err(content_mismatch(Self::KIND, value)),
                }
            }
        }
    };
}

number_element!(i8, Int8, 1, number_ops::to_int8);
number_element!(u8, Uint8, 1, number_ops::to_uint8);
number_element!(i16, Int16, 2, number_ops::to_int16);
number_element!(u16, Uint16, 2, number_ops::to_uint16);
number_element!(i32, Int32, 4, number_ops::to_int32);
number_element!(u32, Uint32, 4, number_ops::to_uint32);
number_element!(f32, Float32, 4, to_float32);
number_element!(f64, Float64, 8, to_float64);

impl private::Sealed for U8Clamped {}

impl Element for U8Clamped {
    const KIND: ElementKind = ElementKind::Uint8Clamped;
    const BYTES_PER_ELEMENT: usize = 1;

    type Bytes = [u8; 1];

    fn decode(bytes: Self::Bytes, _little_endian: bool) -> Self {
        U8Clamped(bytes[0])
    }

    fn encode(self, _little_endian: bool) -> Self::Bytes {
        [self.0]
    }

    fn to_numeric(self) -> NumericValue {
        NumericValue::Number(f64::from(self.0))
    }

    fn from_numeric(value: &NumericValue) -> Result<Self> {
        match value {
            NumericValue::Number(n) => Ok(U8Clamped(number_ops::to_uint8_clamp(*n))),
            NumericValue::BigInt(_) => Err(content_mismatch(Self::KIND, value)),
        }
    }
}

macro_rules! bigint_element {
    ($ty:ty, $kind:ident, $narrow:expr) => {
        impl private::Sealed for $ty {}

        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;
            const BYTES_PER_ELEMENT: usize = 8;

            type Bytes = [u8; 8];

            fn decode(bytes: Self::Bytes, little_endian: bool) -> Self {
                if little_endian {
                    <$ty>::from_le_bytes(bytes)
                } else {
                    <$ty>::from_be_bytes(bytes)
                }
            }

            fn encode(self, little_endian: bool) -> Self::Bytes {
                if little_endian {
                    self.to_le_bytes()
                } else {
                    self.to_be_bytes()
                }
            }

            fn to_numeric(self) -> NumericValue {
                NumericValue::BigInt(BigInt::from(self))
            }

            fn from_numeric(value: &NumericValue) -> Result<Self> {
                match value {
                    NumericValue::BigInt(b) => Ok($narrow(b)),
                    NumericValue::Number(_) => Err(content_mismatch(Self::KIND, value)),
                }
            }
        }
    };
}

bigint_element!(i64, BigInt64, bigint_ops::to_big_int64);
bigint_element!(u64, BigUint64, bigint_ops::to_big_uint64);
