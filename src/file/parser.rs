//! Low-level byte stream parser for chunk and dex decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data parser
//! used to walk resource table chunks, compiled XML chunks and dex index tables. It offers
//! bounds-checked access to binary data and the ULEB128 encoding used by dex string data.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::peek_le`] - Read without advancing
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a slice of the input
//! - [`crate::file::parser::Parser::read_uleb128`] - Read an unsigned LEB128 value
//! - [`crate::file::parser::Parser::read_string_utf8`] - Read a NUL-terminated string
//!
//! # Usage Examples
//!
//! ```rust
//! use bundlescope::Parser;
//!
//! // A chunk header: type 0x0002, header size 12, total size 0x20
//! let data = [0x02, 0x00, 0x0C, 0x00, 0x20, 0x00, 0x00, 0x00];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_le::<u16>()?, 0x0002);
//! assert_eq!(parser.read_le::<u16>()?, 12);
//! assert_eq!(parser.read_le::<u32>()?, 0x20);
//! assert!(!parser.has_more_data());
//! # Ok::<(), bundlescope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, ByteIO},
    Error::OutOfBounds,
    Result,
};

/// A generic binary data parser for reading chunked binary structures.
///
/// `Parser` provides a cursor-based interface for reading little-endian binary data.
/// The parser maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated data.
///
/// # Examples
///
/// ```rust
/// use bundlescope::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// parser.seek(6)?;
/// let last_bytes = parser.read_le::<u16>()?;
/// assert_eq!(last_bytes, 0x0807);
/// # Ok::<(), bundlescope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// Seeking to exactly the end of the data is allowed, reads from there fail.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if moving would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(OutOfBounds),
        }
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes left between the cursor and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Read a value of type `T` at the current position without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are not enough bytes.
    pub fn peek_le<T: ByteIO>(&self) -> Result<T> {
        let mut offset = self.position;
        read_le_at::<T>(self.data, &mut offset)
    }

    /// Read a value of type `T` in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are not enough bytes.
    pub fn read_le<T: ByteIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Borrow `length` bytes from the current position and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are not enough bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(length)?;
        Ok(&self.data[start..self.position])
    }

    /// Read an unsigned LEB128 value of at most 5 bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data ends mid-value, or
    /// [`crate::Error::Malformed`] if the value does not fit into a `u32`.
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;

        loop {
            let byte = self.read_le::<u8>()?;

            value |= u32::from(byte & 0x7F) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                break;
            }

            if shift >= 32 {
                return Err(malformed_error!(
                    "LEB128 value overflow: exceeds u32 capacity after {} bits",
                    shift
                ));
            }
        }

        Ok(value)
    }

    /// Read a NUL-terminated string and advance past the terminator.
    ///
    /// Bytes that are not valid UTF-8 are replaced, which keeps modified UTF-8 (as used by dex
    /// files for supplementary characters) readable for name matching.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let Some(len) = self.data[start..].iter().position(|&b| b == 0) else {
            return Err(OutOfBounds);
        };

        let string_data = &self.data[start..start + len];
        self.position = start + len + 1;

        Ok(String::from_utf8_lossy(string_data).into_owned())
    }
}
