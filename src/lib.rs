//! Binary data support for a JavaScript runtime: a fixed-length
//! `ArrayBuffer`, the byte-addressed `DataView`, and the fixed-width typed
//! arrays, all aliasing the same bytes.
//!
//! Every view holds a shared handle to its buffer, so a write through one
//! view is visible through every other view whose byte range overlaps it.
//! The only copying operations are `ArrayBuffer::slice` and
//! `TypedArray::slice`.
//!
//! The model is single-threaded: handles are `Rc`-based and are neither
//! `Send` nor `Sync`.

pub mod builtins;
pub mod error;
pub mod logging;
pub mod types;

pub use builtins::arraybuffer::ArrayBuffer;
pub use builtins::codec::{Element, ElementKind, U8Clamped};
pub use builtins::dataview::DataView;
pub use builtins::typedarray::{
    AnyTypedArray, BigInt64Array, BigUint64Array, ElementSource, Float32Array, Float64Array,
    Int8Array, Int16Array, Int32Array, TypedArray, Uint8Array, Uint8ClampedArray, Uint16Array,
    Uint32Array,
};
pub use builtins::view::{ByteView, ViewRange};
pub use error::{BufferError, Result};
pub use types::{JsValue, NumericValue};
