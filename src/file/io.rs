//! Low-level byte order and safe reading/writing utilities for chunk and dex parsing.
//!
//! This module provides bounds-checked, little-endian reading and in-place patching of primitive
//! values inside byte buffers. Every binary encoding handled by this crate (resource table chunks,
//! compiled XML chunks and dex files) is little-endian, so no big-endian variants are offered.
//!
//! # Key Components
//!
//! ## Core Trait
//! - [`crate::file::io::ByteIO`] - Trait defining little-endian conversion for primitive types
//!
//! ## Reading Functions
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance the offset
//!
//! ## Writing Functions
//! - [`crate::file::io::write_le_at`] - Write a value at an offset and advance the offset
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use bundlescope::file::io::{read_le_at, write_le_at};
//!
//! let mut data = [0x34, 0x12, 0x00, 0x02];
//! let mut offset = 0;
//! let id: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!(id, 0x0200_1234);
//!
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 0x7F00_1234u32)?;
//! assert_eq!(data, [0x34, 0x12, 0x00, 0x7F]);
//! # Ok::<(), bundlescope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::OutOfBounds`] if there are insufficient bytes in the
//! buffer to complete the operation. Remappers rely on this to turn truncated structures into
//! errors instead of panics.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading and writing.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g. `[u8; 4]` for `u32`).
pub trait ByteIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_byte_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ByteIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_byte_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let end = offset.checked_add(type_len).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Safely writes a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes written.
///
/// # Arguments
///
/// * `data` - The mutable byte buffer to write to
/// * `offset` - Mutable reference to the offset position (will be advanced after writing)
/// * `value` - The value to write
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_le_at<T: ByteIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    let end = offset.checked_add(type_len).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(value.to_le_bytes().as_ref());
    *offset = end;

    Ok(())
}
