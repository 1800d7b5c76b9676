use crate::builtins::arraybuffer::ArrayBuffer;
use crate::error::{BufferError, Result};

/// The `(buffer, byteOffset, byteLength)` window shared by every view kind.
///
/// Invariant: `byte_offset + byte_length <= buffer.byte_length()`.
#[derive(Clone, Debug)]
pub struct ViewRange {
    buffer: ArrayBuffer,
    byte_offset: usize,
    byte_length: usize,
}

impl ViewRange {
    /// Validate a window over `buffer`. A missing `byte_length` takes the
    /// rest of the buffer.
    pub fn new(buffer: &ArrayBuffer, byte_offset: i64, byte_length: Option<i64>) -> Result<Self> {
        let buffer_length = buffer.byte_length();
        let out_of_range = |length: i64| BufferError::OffsetOutOfRange {
            offset: byte_offset,
            length,
            buffer_length,
        };
        let offset = usize::try_from(byte_offset).map_err(|_| out_of_range(0))?;
        if offset > buffer_length {
            return Err(out_of_range(0));
        }
        let length = match byte_length {
            None => buffer_length - offset,
            Some(requested) => {
                let len = usize::try_from(requested)
                    .map_err(|_| BufferError::InvalidLength { length: requested })?;
                if len > buffer_length - offset {
                    return Err(out_of_range(requested));
                }
                len
            }
        };
        Ok(Self::from_parts(buffer.clone(), offset, length))
    }

    pub(crate) fn from_parts(buffer: ArrayBuffer, byte_offset: usize, byte_length: usize) -> Self {
        debug_assert!(byte_offset + byte_length <= buffer.byte_length());
        ViewRange {
            buffer,
            byte_offset,
            byte_length,
        }
    }

    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    // view-relative position of `width` bytes at `offset`, or a RangeError
    fn checked(&self, offset: i64, width: usize) -> Result<usize> {
        usize::try_from(offset)
            .ok()
            .filter(|&start| {
                start
                    .checked_add(width)
                    .is_some_and(|end| end <= self.byte_length)
            })
            .ok_or_else(|| {
                BufferError::range(format!(
                    "offset {offset} is outside the bounds of the view (length {}, access size {width})",
                    self.byte_length
                ))
            })
    }

    pub(crate) fn copy_bytes(&self) -> Vec<u8> {
        self.buffer
            .raw_bytes(self.byte_offset, self.byte_length)
            .to_vec()
    }
}

/// Bounds-checked byte access common to DataView and typed arrays.
///
/// Offsets are relative to the view. An access touches every requested byte
/// or fails with `RangeError` and touches none.
pub trait ByteView {
    fn view_range(&self) -> &ViewRange;

    fn buffer(&self) -> &ArrayBuffer {
        self.view_range().buffer()
    }

    fn byte_offset(&self) -> usize {
        self.view_range().byte_offset()
    }

    fn byte_length(&self) -> usize {
        self.view_range().byte_length()
    }

    /// Fill `out` from the bytes at `offset`.
    fn read_bytes(&self, offset: i64, out: &mut [u8]) -> Result<()> {
        let range = self.view_range();
        let start = range.checked(offset, out.len())?;
        out.copy_from_slice(
            &range
                .buffer
                .raw_bytes(range.byte_offset + start, out.len()),
        );
        Ok(())
    }

    fn write_bytes(&self, offset: i64, bytes: &[u8]) -> Result<()> {
        let range = self.view_range();
        let start = range.checked(offset, bytes.len())?;
        range
            .buffer
            .raw_bytes_mut(range.byte_offset + start, bytes.len())
            .copy_from_slice(bytes);
        Ok(())
    }
}

impl ByteView for ViewRange {
    fn view_range(&self) -> &ViewRange {
        self
    }
}
