use std::fmt;

use num_bigint::BigInt;

use crate::builtins::arraybuffer::ArrayBuffer;
use crate::builtins::dataview::DataView;
use crate::builtins::typedarray::AnyTypedArray;

/// A value handed over by the host runtime.
///
/// The host has already coerced call arguments; this enum only exists so the
/// construction entry points can tell buffers apart from everything else.
#[derive(Clone, Debug)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    BigInt(BigInt),
    Array(Vec<JsValue>),
    ArrayBuffer(ArrayBuffer),
    TypedArray(AnyTypedArray),
    DataView(DataView),
}

impl JsValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "null",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::BigInt(_) => "bigint",
            JsValue::Array(_) => "Array",
            JsValue::ArrayBuffer(_) => "ArrayBuffer",
            JsValue::TypedArray(ta) => ta.kind().name(),
            JsValue::DataView(_) => "DataView",
        }
    }

    /// The numeric payload, if this value is a Number or a BigInt.
    pub fn as_numeric(&self) -> Option<NumericValue> {
        match self {
            JsValue::Number(n) => Some(NumericValue::Number(*n)),
            JsValue::BigInt(b) => Some(NumericValue::BigInt(b.clone())),
            _ => None,
        }
    }
}

impl From<ArrayBuffer> for JsValue {
    fn from(buffer: ArrayBuffer) -> Self {
        JsValue::ArrayBuffer(buffer)
    }
}

impl From<AnyTypedArray> for JsValue {
    fn from(ta: AnyTypedArray) -> Self {
        JsValue::TypedArray(ta)
    }
}

impl From<DataView> for JsValue {
    fn from(dv: DataView) -> Self {
        JsValue::DataView(dv)
    }
}

/// What an element decodes to: a Number for the numeric kinds, a BigInt for
/// the 64-bit integer kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericValue {
    Number(f64),
    BigInt(BigInt),
}

impl NumericValue {
    pub fn is_bigint(&self) -> bool {
        matches!(self, NumericValue::BigInt(_))
    }

    pub(crate) fn content_name(&self) -> &'static str {
        if self.is_bigint() { "BigInt" } else { "Number" }
    }
}

impl From<f64> for NumericValue {
    fn from(n: f64) -> Self {
        NumericValue::Number(n)
    }
}

impl From<BigInt> for NumericValue {
    fn from(b: BigInt) -> Self {
        NumericValue::BigInt(b)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Number(n) => write!(f, "{}", number_ops::to_string(*n)),
            NumericValue::BigInt(b) => write!(f, "{b}n"),
        }
    }
}

// §7.1 type conversions used when narrowing into element storage
pub mod number_ops {
    use std::num::FpCategory;

    const TWO_8: f64 = 256.0;
    const TWO_16: f64 = 65536.0;
    const TWO_32: f64 = 4294967296.0;

    /// Decimal Number::toString, as printed for decoded elements.
    pub fn to_string(x: f64) -> String {
        match x.classify() {
            FpCategory::Nan => String::from("NaN"),
            FpCategory::Infinite if x.is_sign_negative() => String::from("-Infinity"),
            FpCategory::Infinite => String::from("Infinity"),
            // -0 prints as "0"
            FpCategory::Zero => String::from("0"),
            _ => ryu_js::Buffer::new().format(x).to_owned(),
        }
    }

    // truncate, then reduce into [0, modulus)
    fn modulo(x: f64, modulus: f64) -> f64 {
        if x.is_nan() || x.is_infinite() || x == 0.0 {
            return 0.0;
        }
        x.trunc().rem_euclid(modulus)
    }

    // §7.1.6 ToInt32
    pub fn to_int32(x: f64) -> i32 {
        let n = modulo(x, TWO_32);
        if n >= TWO_32 / 2.0 {
            (n - TWO_32) as i32
        } else {
            n as i32
        }
    }

    // §7.1.7 ToUint32
    pub fn to_uint32(x: f64) -> u32 {
        modulo(x, TWO_32) as u32
    }

    // §7.1.8 ToInt16
    pub fn to_int16(x: f64) -> i16 {
        let n = modulo(x, TWO_16);
        if n >= TWO_16 / 2.0 {
            (n - TWO_16) as i16
        } else {
            n as i16
        }
    }

    // §7.1.9 ToUint16
    pub fn to_uint16(x: f64) -> u16 {
        modulo(x, TWO_16) as u16
    }

    // §7.1.10 ToInt8
    pub fn to_int8(x: f64) -> i8 {
        let n = modulo(x, TWO_8);
        if n >= TWO_8 / 2.0 {
            (n - TWO_8) as i8
        } else {
            n as i8
        }
    }

    // §7.1.11 ToUint8
    pub fn to_uint8(x: f64) -> u8 {
        modulo(x, TWO_8) as u8
    }

    // §7.1.12 ToUint8Clamp
    pub fn to_uint8_clamp(x: f64) -> u8 {
        if x.is_nan() || x <= 0.0 {
            return 0;
        }
        if x >= 255.0 {
            return 255;
        }
        x.round_ties_even() as u8
    }
}

pub mod bigint_ops {
    use num_bigint::{BigInt, Sign};

    // §7.1.16 ToBigUint64: the low 64 bits of the two's complement form
    pub fn to_big_uint64(x: &BigInt) -> u64 {
        let (sign, digits) = x.to_u64_digits();
        let low = digits.first().copied().unwrap_or(0);
        if sign == Sign::Minus {
            low.wrapping_neg()
        } else {
            low
        }
    }

    // §7.1.15 ToBigInt64
    pub fn to_big_int64(x: &BigInt) -> i64 {
        to_big_uint64(x) as i64
    }
}
