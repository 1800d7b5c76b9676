//! Fixed-width typed arrays over a shared [`ArrayBuffer`].
//!
//! Elements use the platform byte order. Index reads and writes follow the
//! forgiving array rules rather than DataView's strict ones:
//!
//! - reading outside `[0, length)` yields `None` (the "no value" result),
//! - writing at `index >= length` is silently dropped,
//! - writing at a negative index is a `RangeError`.
//!
//! `subarray` aliases the parent's bytes; `slice` copies them into a new
//! buffer.

use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::builtins::arraybuffer::{ArrayBuffer, resolve_range, resolve_relative_index};
use crate::builtins::codec::{Element, ElementKind, U8Clamped, dispatch_kind};
use crate::builtins::view::{ByteView, ViewRange};
use crate::error::{BufferError, Result};
use crate::types::{JsValue, NumericValue};

#[derive(Clone, Debug)]
pub struct TypedArray<T: Element> {
    range: ViewRange,
    _element: PhantomData<T>,
}

pub type Int8Array = TypedArray<i8>;
pub type Uint8Array = TypedArray<u8>;
pub type Uint8ClampedArray = TypedArray<U8Clamped>;
pub type Int16Array = TypedArray<i16>;
pub type Uint16Array = TypedArray<u16>;
pub type Int32Array = TypedArray<i32>;
pub type Uint32Array = TypedArray<u32>;
pub type Float32Array = TypedArray<f32>;
pub type Float64Array = TypedArray<f64>;
pub type BigInt64Array = TypedArray<i64>;
pub type BigUint64Array = TypedArray<u64>;

impl<T: Element> TypedArray<T> {
    pub const BYTES_PER_ELEMENT: usize = T::BYTES_PER_ELEMENT;

    /// A zero-filled array of `length` elements over a fresh buffer.
    pub fn new(length: i64) -> Result<Self> {
        let invalid = || BufferError::InvalidLength { length };
        let byte_length = usize::try_from(length)
            .ok()
            .and_then(|len| len.checked_mul(T::BYTES_PER_ELEMENT))
            .and_then(|bytes| i64::try_from(bytes).ok())
            .ok_or_else(invalid)?;
        let buffer = ArrayBuffer::new(byte_length).map_err(|_| invalid())?;
        trace!(kind = %T::KIND, length, "created typed array");
        Ok(Self::from_range(ViewRange::from_parts(
            buffer,
            0,
            byte_length as usize,
        )))
    }

    /// §23.2.5.1.3 InitializeTypedArrayFromArrayBuffer
    ///
    /// Without `length` the view runs to the end of the buffer, which must
    /// then hold a whole number of elements.
    pub fn with_buffer(
        buffer: &ArrayBuffer,
        byte_offset: Option<i64>,
        length: Option<i64>,
    ) -> Result<Self> {
        let element_size = T::BYTES_PER_ELEMENT;
        let offset = byte_offset.unwrap_or(0);
        let buffer_length = buffer.byte_length();
        if offset < 0 {
            return Err(BufferError::OffsetOutOfRange {
                offset,
                length: length.unwrap_or(0),
                buffer_length,
            });
        }
        // step 9: offset modulo elementSize
        if offset as u64 % element_size as u64 != 0 {
            return Err(BufferError::MisalignedLength {
                byte_count: offset,
                element_size,
            });
        }
        let byte_length = match length {
            None => {
                if buffer_length % element_size != 0 {
                    return Err(BufferError::MisalignedLength {
                        byte_count: buffer_length as i64,
                        element_size,
                    });
                }
                None
            }
            Some(len) if len < 0 => return Err(BufferError::InvalidLength { length: len }),
            Some(len) => Some(len.checked_mul(element_size as i64).ok_or(
                BufferError::OffsetOutOfRange {
                    offset,
                    length: len,
                    buffer_length,
                },
            )?),
        };
        let range = ViewRange::new(buffer, offset, byte_length)?;
        trace!(
            kind = %T::KIND,
            byte_offset = range.byte_offset(),
            byte_length = range.byte_length(),
            "created typed array view"
        );
        Ok(Self::from_range(range))
    }

    /// A new array holding a converted copy of `source`.
    pub fn from_values<S: ElementSource + ?Sized>(source: &S) -> Result<Self> {
        let array = Self::new(source.source_length() as i64)?;
        array.set(source, 0)?;
        Ok(array)
    }

    fn from_range(range: ViewRange) -> Self {
        TypedArray {
            range,
            _element: PhantomData,
        }
    }

    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    pub fn length(&self) -> usize {
        self.range.byte_length() / T::BYTES_PER_ELEMENT
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    // view-relative byte offset of element `index`
    fn element_offset(index: usize) -> Result<i64> {
        index
            .checked_mul(T::BYTES_PER_ELEMENT)
            .and_then(|offset| i64::try_from(offset).ok())
            .ok_or_else(|| BufferError::range(format!("index {index} is out of range")))
    }

    fn read(&self, index: usize) -> Result<T> {
        let mut raw = T::Bytes::default();
        self.read_bytes(Self::element_offset(index)?, raw.as_mut())?;
        Ok(T::decode_native(raw))
    }

    fn write(&self, index: usize, value: T) -> Result<()> {
        self.write_bytes(
            Self::element_offset(index)?,
            value.encode_native().as_ref(),
        )
    }

    fn valid_index(&self, index: i64) -> Option<usize> {
        usize::try_from(index).ok().filter(|&i| i < self.length())
    }

    /// `None` when `index` is outside `[0, length)`.
    pub fn get(&self, index: i64) -> Option<T> {
        let index = usize::try_from(index).ok()?;
        self.read(index).ok()
    }

    pub fn get_value(&self, index: i64) -> Option<NumericValue> {
        self.get(index).map(Element::to_numeric)
    }

    /// Store `value` at `index`. Past the end the write is dropped; a
    /// negative index is rejected.
    pub fn put(&self, index: i64, value: T) -> Result<()> {
        if index < 0 {
            return Err(BufferError::range(format!(
                "index {index} is negative"
            )));
        }
        match self.valid_index(index) {
            Some(i) => self.write(i, value),
            None => Ok(()),
        }
    }

    /// Narrow `value` and store it, with the same index rules as [`put`](Self::put).
    pub fn put_value(&self, index: i64, value: &NumericValue) -> Result<()> {
        let narrowed = T::from_numeric(value)?;
        self.put(index, narrowed)
    }

    /// §23.2.3.1 %TypedArray%.prototype.at: negative indices count from the end.
    pub fn at(&self, index: i64) -> Option<T> {
        let len = self.length() as i64;
        let actual = if index < 0 { len + index } else { index };
        self.get(actual)
    }

    /// §23.2.3.26 %TypedArray%.prototype.set
    ///
    /// Copies all of `source` starting at element `offset`, or nothing at
    /// all. A typed array source of the same kind is copied byte for byte;
    /// any other source is converted value by value.
    pub fn set<S: ElementSource + ?Sized>(&self, source: &S, offset: i64) -> Result<()> {
        let target_length = self.length();
        let src_length = source.source_length();
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| {
                start
                    .checked_add(src_length)
                    .is_some_and(|end| end <= target_length)
            })
            .ok_or_else(|| {
                BufferError::range(format!(
                    "offset {offset} is out of bounds: {src_length} elements into length {target_length}"
                ))
            })?;

        if let Some((src_kind, src_range)) = source.typed_view() {
            if src_kind.is_bigint() != T::KIND.is_bigint() {
                return Err(BufferError::ContentTypeMismatch {
                    expected: T::KIND.content_name(),
                    found: src_kind.content_name(),
                });
            }
            if src_kind == T::KIND {
                // snapshot first; source and target may overlap
                let bytes = src_range.copy_bytes();
                debug!(kind = %T::KIND, bytes = bytes.len(), start, "bulk byte copy");
                let at = (start * T::BYTES_PER_ELEMENT) as i64;
                return self.write_bytes(at, &bytes);
            }
        }

        let values = (0..src_length)
            .map(|i| {
                source
                    .source_value(i, T::KIND)
                    .and_then(|v| T::from_numeric(&v))
            })
            .collect::<Result<Vec<T>>>()?;
        debug!(kind = %T::KIND, elements = values.len(), start, "bulk element copy");
        for (i, value) in values.into_iter().enumerate() {
            self.write(start + i, value)?;
        }
        Ok(())
    }

    /// §23.2.3.30 %TypedArray%.prototype.subarray
    ///
    /// A new view over the same buffer; writes through either are visible
    /// through both.
    pub fn subarray(&self, begin: i64, end: Option<i64>) -> Self {
        let (start, stop) = resolve_range(begin, end, self.length());
        let size = T::BYTES_PER_ELEMENT;
        Self::from_range(ViewRange::from_parts(
            self.range.buffer().clone(),
            self.range.byte_offset() + start * size,
            (stop - start) * size,
        ))
    }

    /// §23.2.3.27 %TypedArray%.prototype.slice: a copy in a new buffer.
    pub fn slice(&self, begin: i64, end: Option<i64>) -> Self {
        let (start, stop) = resolve_range(begin, end, self.length());
        let size = T::BYTES_PER_ELEMENT;
        let bytes = self
            .range
            .buffer()
            .raw_bytes(self.range.byte_offset() + start * size, (stop - start) * size)
            .to_vec();
        debug!(kind = %T::KIND, start, stop, "sliced typed array");
        let byte_length = bytes.len();
        Self::from_range(ViewRange::from_parts(
            ArrayBuffer::from_bytes(bytes),
            0,
            byte_length,
        ))
    }

    pub fn fill(&self, value: T, begin: i64, end: Option<i64>) -> Result<()> {
        let (start, stop) = resolve_range(begin, end, self.length());
        (start..stop).try_for_each(|i| self.write(i, value))
    }

    /// §23.2.3.6 %TypedArray%.prototype.copyWithin (memmove semantics)
    pub fn copy_within(&self, target: i64, begin: i64, end: Option<i64>) {
        let len = self.length();
        let to = resolve_relative_index(target, len);
        let (from, last) = resolve_range(begin, end, len);
        let count = (last - from).min(len - to);
        if count == 0 {
            return;
        }
        let size = T::BYTES_PER_ELEMENT;
        let mut bytes = self
            .range
            .buffer()
            .raw_bytes_mut(self.range.byte_offset(), self.range.byte_length());
        bytes.copy_within(from * size..(from + count) * size, to * size);
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.length()).map_while(|i| self.read(i).ok())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: Element> ByteView for TypedArray<T> {
    fn view_range(&self) -> &ViewRange {
        &self.range
    }
}

/// Anything `set` can copy from: plain value lists or other typed arrays.
pub trait ElementSource {
    fn source_length(&self) -> usize;

    /// The value at `index`, headed for an array of kind `target`; callers
    /// stay below `source_length()`.
    fn source_value(&self, index: usize, target: ElementKind) -> Result<NumericValue>;

    /// For typed array sources, their element kind and byte window.
    fn typed_view(&self) -> Option<(ElementKind, &ViewRange)> {
        None
    }
}

impl ElementSource for [f64] {
    fn source_length(&self) -> usize {
        self.len()
    }

    fn source_value(&self, index: usize, _target: ElementKind) -> Result<NumericValue> {
        Ok(NumericValue::Number(self[index]))
    }
}

impl ElementSource for [NumericValue] {
    fn source_length(&self) -> usize {
        self.len()
    }

    fn source_value(&self, index: usize, _target: ElementKind) -> Result<NumericValue> {
        Ok(self[index].clone())
    }
}

impl ElementSource for [JsValue] {
    fn source_length(&self) -> usize {
        self.len()
    }

    fn source_value(&self, index: usize, target: ElementKind) -> Result<NumericValue> {
        let value = &self[index];
        value
            .as_numeric()
            .ok_or(BufferError::ContentTypeMismatch {
                expected: target.content_name(),
                found: value.type_name(),
            })
    }
}

macro_rules! owned_source {
    ($item:ty) => {
        impl ElementSource for Vec<$item> {
            fn source_length(&self) -> usize {
                self.len()
            }

            fn source_value(&self, index: usize, target: ElementKind) -> Result<NumericValue> {
                self.as_slice().source_value(index, target)
            }
        }

        impl<const N: usize> ElementSource for [$item; N] {
            fn source_length(&self) -> usize {
                N
            }

            fn source_value(&self, index: usize, target: ElementKind) -> Result<NumericValue> {
                self.as_slice().source_value(index, target)
            }
        }
    };
}

owned_source!(f64);
owned_source!(NumericValue);
owned_source!(JsValue);

impl<T: Element> ElementSource for TypedArray<T> {
    fn source_length(&self) -> usize {
        self.length()
    }

    fn source_value(&self, index: usize, _target: ElementKind) -> Result<NumericValue> {
        self.read(index).map(Element::to_numeric)
    }

    fn typed_view(&self) -> Option<(ElementKind, &ViewRange)> {
        Some((T::KIND, &self.range))
    }
}

/// A typed array whose element kind is only known at run time.
#[derive(Clone, Debug)]
pub enum AnyTypedArray {
    Int8(Int8Array),
    Uint8(Uint8Array),
    Uint8Clamped(Uint8ClampedArray),
    Int16(Int16Array),
    Uint16(Uint16Array),
    Int32(Int32Array),
    Uint32(Uint32Array),
    Float32(Float32Array),
    Float64(Float64Array),
    BigInt64(BigInt64Array),
    BigUint64(BigUint64Array),
}

macro_rules! with_array {
    ($value:expr, $ta:ident => $body:expr) => {
        match $value {
            AnyTypedArray::Int8($ta) => $body,
            AnyTypedArray::Uint8($ta) => $body,
            AnyTypedArray::Uint8Clamped($ta) => $body,
            AnyTypedArray::Int16($ta) => $body,
            AnyTypedArray::Uint16($ta) => $body,
            AnyTypedArray::Int32($ta) => $body,
            AnyTypedArray::Uint32($ta) => $body,
            AnyTypedArray::Float32($ta) => $body,
            AnyTypedArray::Float64($ta) => $body,
            AnyTypedArray::BigInt64($ta) => $body,
            AnyTypedArray::BigUint64($ta) => $body,
        }
    };
}

macro_rules! any_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<TypedArray<$ty>> for AnyTypedArray {
                fn from(ta: TypedArray<$ty>) -> Self {
                    AnyTypedArray::$variant(ta)
                }
            }
        )*
    };
}

any_from!(
    Int8(i8),
    Uint8(u8),
    Uint8Clamped(U8Clamped),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
    BigInt64(i64),
    BigUint64(u64),
);

impl AnyTypedArray {
    pub fn new(kind: ElementKind, length: i64) -> Result<Self> {
        dispatch_kind!(kind, T => TypedArray::<T>::new(length).map(AnyTypedArray::from))
    }

    pub fn with_buffer(
        kind: ElementKind,
        buffer: &ArrayBuffer,
        byte_offset: Option<i64>,
        length: Option<i64>,
    ) -> Result<Self> {
        dispatch_kind!(kind, T => {
            TypedArray::<T>::with_buffer(buffer, byte_offset, length).map(AnyTypedArray::from)
        })
    }

    pub fn from_values<S: ElementSource + ?Sized>(kind: ElementKind, source: &S) -> Result<Self> {
        dispatch_kind!(kind, T => TypedArray::<T>::from_values(source).map(AnyTypedArray::from))
    }

    /// Host entry point for `new XArray(...)`, dispatching on the first
    /// argument: a length, a list of values, another typed array (copied), or
    /// a buffer (aliased).
    pub fn construct(
        kind: ElementKind,
        first: &JsValue,
        byte_offset: Option<i64>,
        length: Option<i64>,
    ) -> Result<Self> {
        match first {
            JsValue::Undefined => Self::new(kind, 0),
            JsValue::Number(n) => {
                let len = if n.is_nan() { 0 } else { n.trunc() as i64 };
                Self::new(kind, len)
            }
            JsValue::Array(items) => Self::from_values(kind, items.as_slice()),
            JsValue::TypedArray(source) => Self::from_values(kind, source),
            JsValue::ArrayBuffer(buffer) => Self::with_buffer(kind, buffer, byte_offset, length),
            other => Err(BufferError::NotABuffer {
                found: other.type_name(),
            }),
        }
    }

    pub fn kind(&self) -> ElementKind {
        with_array!(self, ta => ta.kind())
    }

    pub fn length(&self) -> usize {
        with_array!(self, ta => ta.length())
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    pub fn get_value(&self, index: i64) -> Option<NumericValue> {
        with_array!(self, ta => ta.get_value(index))
    }

    pub fn put_value(&self, index: i64, value: &NumericValue) -> Result<()> {
        with_array!(self, ta => ta.put_value(index, value))
    }

    pub fn at_value(&self, index: i64) -> Option<NumericValue> {
        with_array!(self, ta => ta.at(index).map(Element::to_numeric))
    }

    pub fn set<S: ElementSource + ?Sized>(&self, source: &S, offset: i64) -> Result<()> {
        with_array!(self, ta => ta.set(source, offset))
    }

    pub fn subarray(&self, begin: i64, end: Option<i64>) -> Self {
        with_array!(self, ta => AnyTypedArray::from(ta.subarray(begin, end)))
    }

    pub fn slice(&self, begin: i64, end: Option<i64>) -> Self {
        with_array!(self, ta => AnyTypedArray::from(ta.slice(begin, end)))
    }

    pub fn fill_value(&self, value: &NumericValue, begin: i64, end: Option<i64>) -> Result<()> {
        with_array!(self, ta => {
            let narrowed = Element::from_numeric(value)?;
            ta.fill(narrowed, begin, end)
        })
    }

    pub fn copy_within(&self, target: i64, begin: i64, end: Option<i64>) {
        with_array!(self, ta => ta.copy_within(target, begin, end))
    }

    pub fn to_values(&self) -> Vec<NumericValue> {
        with_array!(self, ta => ta.iter().map(Element::to_numeric).collect())
    }
}

impl ByteView for AnyTypedArray {
    fn view_range(&self) -> &ViewRange {
        with_array!(self, ta => ta.view_range())
    }
}

impl ElementSource for AnyTypedArray {
    fn source_length(&self) -> usize {
        self.length()
    }

    fn source_value(&self, index: usize, target: ElementKind) -> Result<NumericValue> {
        with_array!(self, ta => ta.source_value(index, target))
    }

    fn typed_view(&self) -> Option<(ElementKind, &ViewRange)> {
        Some((self.kind(), self.view_range()))
    }
}
