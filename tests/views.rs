use jsbuffer::{
    AnyTypedArray, ArrayBuffer, BufferError, ByteView, DataView, ElementKind, Float64Array,
    Int16Array, Int32Array, JsValue, NumericValue, Uint8Array, Uint16Array, Uint32Array,
};
use num_bigint::BigInt;

#[test]
fn dataview_values_round_trip_after_narrowing() {
    let buf = ArrayBuffer::new(16).unwrap();
    let dv = DataView::new(&buf, 0, None).unwrap();

    dv.set_uint8(0, 256.0).unwrap();
    assert_eq!(dv.get_uint8(0).unwrap(), 0);
    dv.set_int8(1, 200.0).unwrap();
    assert_eq!(dv.get_int8(1).unwrap(), -56);
    dv.set_int16(2, -2.0, true).unwrap();
    assert_eq!(dv.get_int16(2, true).unwrap(), -2);
    dv.set_uint32(4, -1.0, false).unwrap();
    assert_eq!(dv.get_uint32(4, false).unwrap(), u32::MAX);
    dv.set_float64(8, 0.1, true).unwrap();
    assert_eq!(dv.get_float64(8, true).unwrap(), 0.1);
    dv.set_float32(0, 1.5, false).unwrap();
    assert_eq!(dv.get_float32(0, false).unwrap(), 1.5);
}

#[test]
fn opposite_byte_order_reverses_bytes() {
    let buf = ArrayBuffer::new(8).unwrap();
    let dv = DataView::new(&buf, 0, None).unwrap();

    dv.set_uint16(0, 0x1234 as f64, true).unwrap();
    assert_eq!(dv.get_uint16(0, false).unwrap(), 0x3412);

    dv.set_uint32(0, 0x1234_5678 as f64, false).unwrap();
    assert_eq!(dv.get_uint32(0, true).unwrap(), 0x7856_3412);

    dv.set_big_uint64(0, &BigInt::from(0x0102_0304_0506_0708u64), true)
        .unwrap();
    assert_eq!(dv.get_big_uint64(0, false).unwrap(), 0x0807_0605_0403_0201);
}

#[test]
fn typed_array_and_dataview_share_bytes() {
    let buf = ArrayBuffer::new(8).unwrap();
    let ints = Int32Array::with_buffer(&buf, None, None).unwrap();
    let dv = DataView::new(&buf, 0, None).unwrap();
    let native_le = cfg!(target_endian = "little");

    dv.set_int32(4, -7.0, native_le).unwrap();
    assert_eq!(ints.get(1), Some(-7));

    ints.put(0, 0x0A0B_0C0D).unwrap();
    assert_eq!(dv.get_int32(0, native_le).unwrap(), 0x0A0B_0C0D);
}

#[test]
fn big_endian_word_scenario() {
    let buf = ArrayBuffer::new(8).unwrap();
    let dv = DataView::new(&buf, 0, None).unwrap();
    dv.set_uint32(0, 0x0102_0304 as f64, false).unwrap();

    assert_eq!(&buf.to_vec()[..4], &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(dv.get_uint32(0, true).unwrap(), 0x0403_0201);
    assert_eq!(dv.get_uint8(3).unwrap(), 0x04);
    assert!(matches!(
        dv.get_uint32(5, false),
        Err(BufferError::RangeError { .. })
    ));
}

#[test]
fn subarray_indices_clamp() {
    let ta = Uint8Array::from_values(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();

    let tail = ta.subarray(-2, Some(100));
    let same = ta.subarray(3, Some(5));
    assert_eq!(tail.to_vec(), same.to_vec());
    assert_eq!(tail.byte_offset(), same.byte_offset());
    assert_eq!(tail.length(), 2);

    let empty = ta.subarray(10, Some(20));
    assert_eq!(empty.length(), 0);
    assert!(empty.is_empty());
}

#[test]
fn subarray_writes_reach_the_parent() {
    let ta = Int16Array::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    let sub = ta.subarray(1, Some(3));
    assert_eq!(sub.length(), 2);
    assert_eq!(sub.byte_offset(), 2);
    assert_eq!(sub.to_vec(), vec![2, 3]);

    sub.put(0, 99).unwrap();
    assert_eq!(ta.to_vec(), vec![1, 99, 3, 4]);
    assert!(sub.buffer().ptr_eq(ta.buffer()));
}

#[test]
fn buffer_slice_does_not_alias() {
    let buf = ArrayBuffer::from_bytes(vec![1, 2, 3, 4, 5, 6]);
    let copy = buf.slice(2, None);
    let original = Uint8Array::with_buffer(&buf, None, None).unwrap();
    let copied = Uint8Array::with_buffer(&copy, None, None).unwrap();

    copied.put(0, 42).unwrap();
    original.put(3, 77).unwrap();
    assert_eq!(buf.to_vec(), vec![1, 2, 3, 77, 5, 6]);
    assert_eq!(copy.to_vec(), vec![42, 4, 5, 6]);
}

#[test]
fn set_is_all_or_nothing() {
    let ta = Uint16Array::from_values(&[1.0, 2.0, 3.0]).unwrap();

    let err = ta.set(&[7.0, 8.0], 2).unwrap_err();
    assert!(matches!(err, BufferError::RangeError { .. }));
    assert_eq!(ta.to_vec(), vec![1, 2, 3]);

    let mixed = vec![JsValue::Number(5.0), JsValue::String("x".into())];
    assert!(matches!(
        ta.set(&mixed, 0),
        Err(BufferError::ContentTypeMismatch { .. })
    ));
    assert_eq!(ta.to_vec(), vec![1, 2, 3]);

    ta.set(&[70000.0], 1).unwrap();
    assert_eq!(ta.to_vec(), vec![1, 4464, 3]);
}

#[test]
fn overlapping_set_uses_a_snapshot() {
    let ta = Uint8Array::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    let head = ta.subarray(0, Some(3));
    ta.set(&head, 2).unwrap();
    assert_eq!(ta.to_vec(), vec![1, 2, 1, 2, 3]);
}

#[test]
fn converting_set_between_kinds() {
    let floats = Float64Array::from_values(&[1.9, -1.0, 300.0]).unwrap();
    let bytes = Uint8Array::new(3).unwrap();
    bytes.set(&floats, 0).unwrap();
    assert_eq!(bytes.to_vec(), vec![1, 255, 44]);
}

#[test]
fn typed_array_reads_forgive_but_dataview_does_not() {
    let buf = ArrayBuffer::new(4).unwrap();
    let ta = Uint32Array::with_buffer(&buf, None, None).unwrap();
    let dv = DataView::new(&buf, 0, None).unwrap();

    assert_eq!(ta.get(1), None);
    assert_eq!(ta.get(-1), None);
    assert!(ta.put(5, 9).is_ok());
    assert!(matches!(ta.put(-1, 9), Err(BufferError::RangeError { .. })));
    assert_eq!(buf.to_vec(), vec![0; 4]);

    assert!(dv.get_uint8(4).is_err());
    assert!(dv.set_uint8(-1, 1.0).is_err());
}

#[test]
fn views_keep_the_store_alive() {
    let dv = {
        let buf = ArrayBuffer::from_bytes(vec![0xDE, 0xAD]);
        DataView::new(&buf, 0, None).unwrap()
    };
    assert_eq!(dv.get_uint16(0, false).unwrap(), 0xDEAD);
}

#[test]
fn construct_dispatches_on_first_argument() {
    let buf = ArrayBuffer::new(8).unwrap();
    let view = AnyTypedArray::construct(
        ElementKind::Int16,
        &JsValue::from(buf.clone()),
        Some(2),
        Some(2),
    )
    .unwrap();
    assert_eq!(view.length(), 2);
    assert!(view.buffer().ptr_eq(&buf));

    let copy = AnyTypedArray::construct(ElementKind::Float32, &JsValue::from(view), None, None)
        .unwrap();
    assert!(!copy.buffer().ptr_eq(&buf));

    assert!(matches!(
        DataView::construct(&JsValue::Number(8.0), None, None),
        Err(BufferError::NotABuffer { found: "number" })
    ));

    let big = AnyTypedArray::construct(ElementKind::BigInt64, &JsValue::Number(1.0), None, None)
        .unwrap();
    big.put_value(0, &NumericValue::BigInt(BigInt::from(-3)))
        .unwrap();
    assert_eq!(big.get_value(0), Some(NumericValue::BigInt(BigInt::from(-3))));
    assert!(big.put_value(0, &NumericValue::Number(1.0)).is_err());
}

#[test]
fn is_view_recognises_both_view_kinds() {
    let buf = ArrayBuffer::new(8).unwrap();
    let dv = DataView::new(&buf, 2, Some(4)).unwrap();
    let ints = AnyTypedArray::with_buffer(ElementKind::Int32, &buf, Some(4), None).unwrap();
    let copy = ints.slice(0, None);

    assert!(ArrayBuffer::is_view(&JsValue::from(dv)));
    assert!(ArrayBuffer::is_view(&JsValue::from(ints)));
    assert!(ArrayBuffer::is_view(&JsValue::from(copy)));
    assert!(!ArrayBuffer::is_view(&JsValue::from(buf)));
    assert!(!ArrayBuffer::is_view(&JsValue::Array(vec![])));
}

#[test]
fn huge_lengths_are_invalid_not_fatal() {
    assert!(matches!(
        ArrayBuffer::new(i64::MAX / 2),
        Err(BufferError::InvalidLength { .. })
    ));
    assert!(matches!(
        AnyTypedArray::construct(ElementKind::Float64, &JsValue::Number(1e17), None, None),
        Err(BufferError::InvalidLength { .. })
    ));
    assert!(AnyTypedArray::construct(ElementKind::Float64, &JsValue::Number(16.0), None, None).is_ok());
}
