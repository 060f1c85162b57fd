//! Byte-view helpers for the serialization boundary.
//!
//! The level owns no persistence format; hosts that serialize a level capture
//! the raw arrays verbatim (compressed or not) to stay round-trippable. These
//! helpers convert between typed slices and little-endian byte buffers so a
//! host can do exactly that without reaching into the storage layout.

use bytemuck::Pod;
use num_traits::PrimInt;

use crate::error::DofPackError;

/// Converts a slice of primitive integers into a `Vec<u8>`.
/// This involves a copy. Assumes a little-endian target.
pub fn typed_slice_to_bytes<T: PrimInt + Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

/// Reinterprets a byte slice as a slice of a primitive integer type,
/// rejecting buffers whose length or alignment does not fit `T`.
/// This is a zero-copy view.
pub fn safe_bytes_to_typed_slice<T: PrimInt + Pod>(bytes: &[u8]) -> Result<&[T], DofPackError> {
    bytemuck::try_cast_slice(bytes)
        .map_err(|_| DofPackError::BufferMismatch(std::mem::size_of::<T>(), bytes.len()))
}
