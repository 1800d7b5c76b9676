use num_bigint::BigInt;
use tracing::trace;

use crate::builtins::arraybuffer::ArrayBuffer;
use crate::builtins::codec::{Element, ElementKind};
use crate::builtins::view::{ByteView, ViewRange};
use crate::error::{BufferError, Result};
use crate::types::{JsValue, NumericValue};

/// Byte-offset accessor over a buffer window.
///
/// Every accessor takes its own offset (relative to the view) and, for
/// multi-byte values, its own byte order: `little_endian == false` reads and
/// writes big-endian. Accesses that would touch any byte outside the view
/// fail with `RangeError` and leave the buffer untouched.
#[derive(Clone, Debug)]
pub struct DataView {
    range: ViewRange,
}

impl DataView {
    /// §25.3.2.1 DataView(buffer, byteOffset, byteLength)
    pub fn new(buffer: &ArrayBuffer, byte_offset: i64, byte_length: Option<i64>) -> Result<Self> {
        let range = ViewRange::new(buffer, byte_offset, byte_length)?;
        trace!(
            byte_offset = range.byte_offset(),
            byte_length = range.byte_length(),
            "created DataView"
        );
        Ok(DataView { range })
    }

    /// Host entry point: the first argument must be an ArrayBuffer.
    pub fn construct(
        buffer: &JsValue,
        byte_offset: Option<i64>,
        byte_length: Option<i64>,
    ) -> Result<Self> {
        match buffer {
            JsValue::ArrayBuffer(buf) => Self::new(buf, byte_offset.unwrap_or(0), byte_length),
            other => Err(BufferError::NotABuffer {
                found: other.type_name(),
            }),
        }
    }

    pub fn get_value<T: Element>(&self, byte_offset: i64, little_endian: bool) -> Result<T> {
        let mut raw = T::Bytes::default();
        self.read_bytes(byte_offset, raw.as_mut())?;
        Ok(T::decode(raw, little_endian))
    }

    pub fn set_value<T: Element>(&self, byte_offset: i64, value: T, little_endian: bool) -> Result<()> {
        self.write_bytes(byte_offset, value.encode(little_endian).as_ref())
    }

    /// Read an element whose kind is only known at run time.
    pub fn get(&self, kind: ElementKind, byte_offset: i64, little_endian: bool) -> Result<NumericValue> {
        let mut raw = [0u8; 8];
        let bytes = &mut raw[..kind.bytes_per_element()];
        self.read_bytes(byte_offset, bytes)?;
        kind.decode(bytes, little_endian)
    }

    /// Narrow `value` to `kind` and write it. A content mismatch (BigInt into
    /// a Number kind or the reverse) fails before any byte is written.
    pub fn set(
        &self,
        kind: ElementKind,
        byte_offset: i64,
        value: &NumericValue,
        little_endian: bool,
    ) -> Result<()> {
        let bytes = kind.encode(value, little_endian)?;
        self.write_bytes(byte_offset, &bytes)
    }

    fn set_number<T: Element>(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        let narrowed = T::from_numeric(&value.into())?;
        self.set_value(byte_offset, narrowed, little_endian)
    }

    // Gets the value of the given type at the specified byte offset from the
    // start of the view. There is no alignment constraint.

    pub fn get_int8(&self, byte_offset: i64) -> Result<i8> {
        self.get_value(byte_offset, false)
    }

    pub fn get_uint8(&self, byte_offset: i64) -> Result<u8> {
        self.get_value(byte_offset, false)
    }

    pub fn get_int16(&self, byte_offset: i64, little_endian: bool) -> Result<i16> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_uint16(&self, byte_offset: i64, little_endian: bool) -> Result<u16> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_int32(&self, byte_offset: i64, little_endian: bool) -> Result<i32> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_uint32(&self, byte_offset: i64, little_endian: bool) -> Result<u32> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_float32(&self, byte_offset: i64, little_endian: bool) -> Result<f32> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_float64(&self, byte_offset: i64, little_endian: bool) -> Result<f64> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_big_int64(&self, byte_offset: i64, little_endian: bool) -> Result<i64> {
        self.get_value(byte_offset, little_endian)
    }

    pub fn get_big_uint64(&self, byte_offset: i64, little_endian: bool) -> Result<u64> {
        self.get_value(byte_offset, little_endian)
    }

    // Stores take the host's Number and narrow it to the accessor's width, so
    // setUint8(0, 256) stores 0.

    pub fn set_int8(&self, byte_offset: i64, value: f64) -> Result<()> {
        self.set_number::<i8>(byte_offset, value, false)
    }

    pub fn set_uint8(&self, byte_offset: i64, value: f64) -> Result<()> {
        self.set_number::<u8>(byte_offset, value, false)
    }

    pub fn set_int16(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        self.set_number::<i16>(byte_offset, value, little_endian)
    }

    pub fn set_uint16(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        self.set_number::<u16>(byte_offset, value, little_endian)
    }

    pub fn set_int32(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        self.set_number::<i32>(byte_offset, value, little_endian)
    }

    pub fn set_uint32(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        self.set_number::<u32>(byte_offset, value, little_endian)
    }

    pub fn set_float32(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        self.set_number::<f32>(byte_offset, value, little_endian)
    }

    pub fn set_float64(&self, byte_offset: i64, value: f64, little_endian: bool) -> Result<()> {
        self.set_number::<f64>(byte_offset, value, little_endian)
    }

    pub fn set_big_int64(&self, byte_offset: i64, value: &BigInt, little_endian: bool) -> Result<()> {
        self.set(ElementKind::BigInt64, byte_offset, &value.clone().into(), little_endian)
    }

    pub fn set_big_uint64(&self, byte_offset: i64, value: &BigInt, little_endian: bool) -> Result<()> {
        self.set(ElementKind::BigUint64, byte_offset, &value.clone().into(), little_endian)
    }
}

impl ByteView for DataView {
    fn view_range(&self) -> &ViewRange {
        &self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(len: i64) -> DataView {
        DataView::new(&ArrayBuffer::new(len).unwrap(), 0, None).unwrap()
    }

    #[test]
    fn big_endian_by_default() {
        let dv = view(8);
        dv.set_uint32(0, f64::from(0x01020304u32), false).unwrap();
        assert_eq!(dv.get_uint8(0).unwrap(), 0x01);
        assert_eq!(dv.get_uint8(3).unwrap(), 0x04);
        assert_eq!(dv.get_uint32(0, true).unwrap(), 0x04030201);
    }

    #[test]
    fn mixed_byte_orders_in_one_buffer() {
        let dv = view(6);
        dv.set_uint16(0, 0xCAFE as f64, false).unwrap();
        dv.set_uint32(2, 7.0, true).unwrap();
        assert_eq!(dv.buffer().to_vec(), vec![0xCA, 0xFE, 7, 0, 0, 0]);
        assert_eq!(dv.get_uint16(0, false).unwrap(), 0xCAFE);
        assert_eq!(dv.get_uint32(2, true).unwrap(), 7);
    }

    #[test]
    fn narrowing_on_store() {
        let dv = view(4);
        dv.set_uint8(0, 256.0).unwrap();
        assert_eq!(dv.get_uint8(0).unwrap(), 0);
        dv.set_int8(1, 255.0).unwrap();
        assert_eq!(dv.get_int8(1).unwrap(), -1);
        dv.set_int16(2, -1.0, false).unwrap();
        assert_eq!(dv.get_uint16(2, false).unwrap(), 0xFFFF);
    }

    #[test]
    fn floats_round_trip() {
        let dv = view(12);
        dv.set_float64(0, std::f64::consts::PI, true).unwrap();
        assert_eq!(dv.get_float64(0, true).unwrap(), std::f64::consts::PI);
        dv.set_float32(8, 1.1, false).unwrap();
        assert_eq!(dv.get_float32(8, false).unwrap(), 1.1f32);
    }

    #[test]
    fn sixty_four_bit_integers() {
        let dv = view(16);
        dv.set_big_int64(0, &BigInt::from(-2), false).unwrap();
        assert_eq!(dv.get_big_int64(0, false).unwrap(), -2);
        assert_eq!(dv.get_big_uint64(0, false).unwrap(), u64::MAX - 1);
        dv.set_big_uint64(8, &BigInt::from(0x0102030405060708u64), true).unwrap();
        assert_eq!(dv.get_uint8(8).unwrap(), 0x08);
        assert_eq!(
            dv.get(ElementKind::BigUint64, 8, true).unwrap(),
            NumericValue::BigInt(BigInt::from(0x0102030405060708u64))
        );
    }

    #[test]
    fn out_of_bounds_is_a_range_error() {
        let dv = view(4);
        assert!(matches!(dv.get_uint32(1, false), Err(BufferError::RangeError { .. })));
        assert!(matches!(dv.get_uint8(-1), Err(BufferError::RangeError { .. })));
        assert!(matches!(dv.get_uint8(4), Err(BufferError::RangeError { .. })));
        assert!(dv.set_float64(0, 1.0, false).is_err());
        assert!(dv.set_uint16(3, 0xFFFF as f64, false).is_err());
        assert_eq!(dv.buffer().to_vec(), vec![0; 4]);
    }

    #[test]
    fn offsets_are_relative_to_the_view() {
        let buf = ArrayBuffer::new(8).unwrap();
        let dv = DataView::new(&buf, 4, Some(2)).unwrap();
        assert_eq!(dv.byte_offset(), 4);
        assert_eq!(dv.byte_length(), 2);
        dv.set_uint16(0, 0x1234 as f64, false).unwrap();
        assert_eq!(buf.to_vec(), vec![0, 0, 0, 0, 0x12, 0x34, 0, 0]);
        assert!(dv.get_uint16(1, false).is_err());
    }

    #[test]
    fn accessors_share_the_view_byte_path() {
        use crate::builtins::typedarray::Uint16Array;

        let buf = ArrayBuffer::new(6).unwrap();
        let dv = DataView::new(&buf, 2, None).unwrap();
        let words = Uint16Array::with_buffer(&buf, Some(2), None).unwrap();

        dv.write_bytes(1, &[0xAB, 0xCD]).unwrap();
        assert_eq!(dv.get_uint16(1, false).unwrap(), 0xABCD);
        let mut raw = [0u8; 2];
        words.read_bytes(1, &mut raw).unwrap();
        assert_eq!(raw, [0xAB, 0xCD]);

        assert!(dv.write_bytes(3, &[1, 2]).is_err());
        assert!(words.read_bytes(3, &mut raw).is_err());
        assert_eq!(buf.to_vec(), vec![0, 0, 0, 0xAB, 0xCD, 0]);
    }

    #[test]
    fn construction_checks() {
        let buf = ArrayBuffer::new(8).unwrap();
        assert!(matches!(
            DataView::new(&buf, -1, None),
            Err(BufferError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            DataView::new(&buf, 9, None),
            Err(BufferError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            DataView::new(&buf, 6, Some(4)),
            Err(BufferError::OffsetOutOfRange { .. })
        ));
        assert_eq!(DataView::new(&buf, 3, None).unwrap().byte_length(), 5);
    }

    #[test]
    fn construct_requires_a_buffer() {
        let err = DataView::construct(&JsValue::Number(8.0), None, None).unwrap_err();
        assert_eq!(err, BufferError::NotABuffer { found: "number" });
        let buf = ArrayBuffer::new(4).unwrap();
        let dv = DataView::construct(&JsValue::ArrayBuffer(buf), Some(1), None).unwrap();
        assert_eq!(dv.byte_length(), 3);
    }

    #[test]
    fn dynamic_accessors() {
        let dv = view(8);
        dv.set(ElementKind::Int16, 2, &(-300.0).into(), true).unwrap();
        assert_eq!(
            dv.get(ElementKind::Int16, 2, true).unwrap(),
            NumericValue::Number(-300.0)
        );
        assert!(matches!(
            dv.set(ElementKind::Int32, 0, &NumericValue::BigInt(BigInt::from(1)), false),
            Err(BufferError::ContentTypeMismatch { .. })
        ));
        assert!(dv.get(ElementKind::Float64, 1, false).is_err());
    }
}
