//! A deterministic, bit-exact serializer/deserializer for sequences
//! of immutable byte buffers, plus a sector-aligned variant that
//! prepends opaque metadata and pads to a sector multiple.
//!
//! Deserialization is zero-copy: every buffer reconstructed from an
//! image aliases the image's own backing storage via [`buffer::ConstBuffer`]'s
//! shared-ownership handle, so `deserialize` is O(1) in payload bytes.
//!
//! [`buffer`] and [`array`] provide the minimal immutable-buffer and
//! buffer-array container primitives this codec needs; they are not a
//! general-purpose buffer library.

pub mod array;
pub mod buffer;
mod error;
mod wire;

pub use array::ConstBufferArray;
pub use buffer::ConstBuffer;
pub use error::CodecError;
pub use wire::{deserialize, header_of, serialize, serialize_with_prepend};
