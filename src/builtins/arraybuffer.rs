use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{BufferError, Result};
use crate::types::JsValue;

/// A fixed-length, zero-initialised byte store shared by every view over it.
///
/// Cloning the handle shares the bytes; the store is freed when the last
/// handle (and thus the last view) is dropped.
#[derive(Clone, Debug)]
pub struct ArrayBuffer {
    data: Rc<RefCell<Vec<u8>>>,
}

/// Largest store `ArrayBuffer::new` will allocate.
pub const MAX_BYTE_LENGTH: usize = i32::MAX as usize;

impl ArrayBuffer {
    /// §25.1.3.1 ArrayBuffer(length)
    ///
    /// Lengths that are negative, above [`MAX_BYTE_LENGTH`], or that the
    /// allocator refuses are `InvalidLength`.
    pub fn new(byte_length: i64) -> Result<Self> {
        let invalid = || BufferError::InvalidLength {
            length: byte_length,
        };
        let len = usize::try_from(byte_length)
            .ok()
            .filter(|&len| len <= MAX_BYTE_LENGTH)
            .ok_or_else(invalid)?;
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|_| invalid())?;
        bytes.resize(len, 0);
        trace!(byte_length = len, "allocated array buffer");
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ArrayBuffer {
            data: Rc::new(RefCell::new(bytes)),
        }
    }

    pub fn byte_length(&self) -> usize {
        self.data.borrow().len()
    }

    /// §25.1.6.7 ArrayBuffer.prototype.slice(start, end)
    ///
    /// The result owns a copy of the clamped range; it never aliases `self`.
    pub fn slice(&self, begin: i64, end: Option<i64>) -> ArrayBuffer {
        let (start, stop) = resolve_range(begin, end, self.byte_length());
        debug!(start, stop, source_length = self.byte_length(), "duplicating buffer region");
        let bytes = self.data.borrow()[start..stop].to_vec();
        Self::from_bytes(bytes)
    }

    /// §25.1.5.3 ArrayBuffer.isView(arg)
    pub fn is_view(value: &JsValue) -> bool {
        matches!(value, JsValue::TypedArray(_) | JsValue::DataView(_))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ArrayBuffer) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Borrow `len` bytes at `offset` without copying.
    ///
    /// Callers validate the range against their own view first.
    pub(crate) fn raw_bytes(&self, offset: usize, len: usize) -> Ref<'_, [u8]> {
        Ref::map(self.data.borrow(), |bytes| &bytes[offset..offset + len])
    }

    pub(crate) fn raw_bytes_mut(&self, offset: usize, len: usize) -> RefMut<'_, [u8]> {
        RefMut::map(self.data.borrow_mut(), |bytes| {
            &mut bytes[offset..offset + len]
        })
    }
}

/// Resolve a relative index against `length`: negative counts from the end,
/// and the result is clamped into `[0, length]`.
pub fn resolve_relative_index(index: i64, length: usize) -> usize {
    let len = i64::try_from(length).unwrap_or(i64::MAX);
    let resolved = if index < 0 {
        index.saturating_add(len).max(0)
    } else {
        index.min(len)
    };
    resolved as usize
}

/// Resolve a `[begin, end)` pair; `end` defaults to `length` and the range
/// is never negative.
pub fn resolve_range(begin: i64, end: Option<i64>, length: usize) -> (usize, usize) {
    let start = resolve_relative_index(begin, length);
    let stop = end.map_or(length, |e| resolve_relative_index(e, length));
    (start, stop.max(start))
}
