//! Chunk framing shared by resource tables and compiled XML documents.
//!
//! Both encodings are trees of chunks. Every chunk starts with the same 8 byte header:
//!
//! ```text
//! +--------+-------------+----------+
//! | type   | header_size | size     |
//! | u16    | u16         | u32      |
//! +--------+-------------+----------+
//! ```
//!
//! `header_size` covers the chunk specific header fields, `size` covers the whole chunk including
//! its children. Children of a container chunk start at `offset + header_size` and are laid out
//! back to back until `offset + size`.
//!
//! [`ChunkHeader::parse`] validates a header against the bounds of its parent, so a walker that
//! only ever descends through [`ChunkHeader::children`] can never step outside the input.
//! The value helpers at the bottom of this module patch packed resource ids in place.

use strum::{EnumCount, EnumIter, FromRepr};

use crate::{
    file::{
        io::{read_le_at, write_le_at},
        parser::Parser,
    },
    resources::{PackageIdRemap, ResourceId},
    Result,
};

/// Size of the common chunk header.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Size of a `Res_value` record.
pub const RES_VALUE_SIZE: usize = 8;

/// All chunk types this crate knows about.
///
/// Unknown chunk types are not an error: walkers skip them by their declared size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumIter, EnumCount, FromRepr)]
#[repr(u16)]
pub enum ChunkType {
    /// Padding / placeholder chunk
    Null = 0x0000,
    /// `ResStringPool_header`
    StringPool = 0x0001,
    /// `ResTable_header`, root of `resources.arsc`
    Table = 0x0002,
    /// `ResXMLTree_header`, root of a compiled XML document
    Xml = 0x0003,
    /// Namespace start node
    XmlStartNamespace = 0x0100,
    /// Namespace end node
    XmlEndNamespace = 0x0101,
    /// Element start node, carries the attributes
    XmlStartElement = 0x0102,
    /// Element end node
    XmlEndElement = 0x0103,
    /// Character data node
    XmlCdata = 0x0104,
    /// Attribute name to resource id map
    XmlResourceMap = 0x0180,
    /// `ResTable_package`
    TablePackage = 0x0200,
    /// `ResTable_type`, the entries of one configuration
    TableType = 0x0201,
    /// `ResTable_typeSpec`, configuration flags per entry
    TableTypeSpec = 0x0202,
    /// `ResTable_lib_header`, shared library package map
    TableLibrary = 0x0203,
    /// `ResTable_overlayable_header`
    TableOverlayable = 0x0204,
    /// `ResTable_overlayable_policy_header`
    TableOverlayablePolicy = 0x0205,
    /// `ResTable_staged_alias_header`
    TableStagedAlias = 0x0206,
}

impl ChunkType {
    /// Maps a raw chunk type to a known variant.
    #[must_use]
    pub fn from_u16(value: u16) -> Option<ChunkType> {
        ChunkType::from_repr(value)
    }
}

/// Data types of a `Res_value`.
///
/// Only the reference kinds carry a packed resource id; everything else is literal data that
/// must never be rewritten, even when its bits happen to look like an id.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ValueType {
    Null = 0x00,
    Reference = 0x01,
    Attribute = 0x02,
    String = 0x03,
    Float = 0x04,
    Dimension = 0x05,
    Fraction = 0x06,
    DynamicReference = 0x07,
    DynamicAttribute = 0x08,
    IntDec = 0x10,
    IntHex = 0x11,
    IntBoolean = 0x12,
    IntColorArgb8 = 0x1C,
    IntColorRgb8 = 0x1D,
    IntColorArgb4 = 0x1E,
    IntColorRgb4 = 0x1F,
}

impl ValueType {
    /// Returns `true` if values of this type hold a packed resource id.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ValueType::Reference
                | ValueType::Attribute
                | ValueType::DynamicReference
                | ValueType::DynamicAttribute
        )
    }
}

/// A validated chunk header and its absolute position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChunkHeader {
    /// Raw chunk type
    pub chunk_type: u16,
    /// Size of the chunk header including the common 8 bytes
    pub header_size: u16,
    /// Size of the whole chunk
    pub size: u32,
    /// Absolute offset of the chunk within the buffer
    pub offset: usize,
}

impl ChunkHeader {
    /// Reads the chunk header at `offset`, checking that the chunk ends at or before `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the header is truncated, declares a header smaller
    /// than 8 bytes or larger than the chunk, or the chunk extends past `limit`.
    pub fn parse(data: &[u8], offset: usize, limit: usize) -> Result<Self> {
        let limit = limit.min(data.len());
        if offset + CHUNK_HEADER_SIZE > limit {
            return Err(malformed_error!(
                "Truncated chunk header at offset {}, {} bytes available",
                offset,
                limit.saturating_sub(offset)
            ));
        }

        let mut parser = Parser::new(data);
        parser.seek(offset)?;
        let header = ChunkHeader {
            chunk_type: parser.read_le::<u16>()?,
            header_size: parser.read_le::<u16>()?,
            size: parser.read_le::<u32>()?,
            offset,
        };

        if (header.header_size as usize) < CHUNK_HEADER_SIZE {
            return Err(malformed_error!(
                "Chunk 0x{:04x} at offset {} has header size {}",
                header.chunk_type,
                offset,
                header.header_size
            ));
        }

        if u32::from(header.header_size) > header.size {
            return Err(malformed_error!(
                "Chunk 0x{:04x} at offset {} has header size {} larger than chunk size {}",
                header.chunk_type,
                offset,
                header.header_size,
                header.size
            ));
        }

        if header.end() > limit {
            return Err(malformed_error!(
                "Chunk 0x{:04x} at offset {} with size {} exceeds its parent ending at {}",
                header.chunk_type,
                offset,
                header.size,
                limit
            ));
        }

        Ok(header)
    }

    /// Returns the known chunk type, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ChunkType> {
        ChunkType::from_u16(self.chunk_type)
    }

    /// Returns `true` if this chunk is of the given type.
    #[must_use]
    pub fn is(&self, kind: ChunkType) -> bool {
        self.chunk_type == kind as u16
    }

    /// Absolute offset of the first byte after the chunk header.
    #[must_use]
    pub fn body_start(&self) -> usize {
        self.offset + self.header_size as usize
    }

    /// Absolute offset of the first byte after the chunk.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.size as usize
    }

    /// Fails unless the chunk header is at least `min` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the header is too small for its type.
    pub fn require_header_size(&self, min: usize) -> Result<()> {
        if (self.header_size as usize) < min {
            return Err(malformed_error!(
                "Chunk 0x{:04x} at offset {} needs a header of at least {} bytes, found {}",
                self.chunk_type,
                self.offset,
                min,
                self.header_size
            ));
        }
        Ok(())
    }

    /// Collects the headers of all direct children of this chunk.
    ///
    /// Headers are collected up front so callers can patch the buffer while visiting them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if any child header is inconsistent or trailing bytes
    /// too small for a chunk header remain.
    pub fn children(&self, data: &[u8]) -> Result<Vec<ChunkHeader>> {
        let mut children = Vec::new();
        let mut offset = self.body_start();
        let end = self.end();

        while offset < end {
            let child = ChunkHeader::parse(data, offset, end)?;
            if child.size == 0 {
                return Err(malformed_error!("Zero sized chunk at offset {}", offset));
            }
            offset = child.end();
            children.push(child);
        }

        Ok(children)
    }
}

/// Parses the root chunk of a buffer and checks its type.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the buffer is empty, or if the root chunk is
/// inconsistent or not of type `expected`.
pub fn root_chunk(data: &[u8], expected: ChunkType) -> Result<ChunkHeader> {
    if data.is_empty() {
        return Err(malformed_error!("Expected a {:?} chunk, found an empty buffer", expected));
    }

    let root = ChunkHeader::parse(data, 0, data.len())?;
    if !root.is(expected) {
        return Err(malformed_error!(
            "Expected a {:?} chunk, found type 0x{:04x}",
            expected,
            root.chunk_type
        ));
    }
    Ok(root)
}

/// Remaps the packed id stored at `offset` in place. Returns `true` if it changed.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the id does not fit into the buffer.
pub(crate) fn remap_id_at(data: &mut [u8], offset: usize, remap: &PackageIdRemap) -> Result<bool> {
    let mut cursor = offset;
    let id = ResourceId(read_le_at::<u32>(data, &mut cursor)?);

    match remap.remap(id) {
        Some(new_id) => {
            tracing::trace!(from = %id, to = %new_id, offset, "remapped resource id");
            let mut cursor = offset;
            write_le_at(data, &mut cursor, new_id.value())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Remaps the `Res_value` at `offset` in place if it holds a reference. Returns `true` if it
/// changed.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit into the buffer.
pub(crate) fn remap_value_at(
    data: &mut [u8],
    offset: usize,
    remap: &PackageIdRemap,
) -> Result<bool> {
    let mut cursor = offset + 3;
    let data_type = read_le_at::<u8>(data, &mut cursor)?;

    if ValueType::from_repr(data_type).is_some_and(|kind| kind.is_reference()) {
        remap_id_at(data, offset + 4, remap)
    } else {
        Ok(false)
    }
}
