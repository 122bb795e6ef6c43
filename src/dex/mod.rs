//! Dex file inspection and dex entry mutation.
//!
//! Only as much of the dex format is parsed as is needed to list the classes a file defines:
//! the header, the string and type id tables, and the class definitions.
//!
//! ```text
//! header (0x70 bytes)
//!   magic "dex\nNNN\0" | checksum | signature[20] | file_size | header_size | endian_tag | ...
//!   string_ids_size @0x38 | string_ids_off @0x3C | type_ids_size @0x40 | type_ids_off @0x44
//!   class_defs_size @0x60 | class_defs_off @0x64
//! string_id_item   string_data_off: u32 -> uleb128 utf16_size | MUTF-8 bytes | 0x00
//! type_id_item     descriptor_idx: u32 (index into string ids)
//! class_def_item   class_idx: u32 (index into type ids) | ... (32 bytes)
//! ```

mod mutator;

pub use mutator::{
    is_r_package_dex_entry, DexEntriesMutator, DexEntryMutation, EntryAction, EntryPredicate,
    EntryTransform, R_PACKAGE_CLASS_NAME, R_PACKAGE_DEX_ENTRY_REMOVER,
};

use crate::{file::parser::Parser, Result};

/// Leading bytes of every dex file; a three digit version and a NUL follow.
pub const DEX_FILE_MAGIC: &[u8; 4] = b"dex\n";

const HEADER_SIZE: usize = 0x70;
const ENDIAN_CONSTANT: u32 = 0x1234_5678;
const CLASS_DEF_SIZE: usize = 32;

/// A validated view of a dex file.
#[derive(Clone, Copy, Debug)]
pub struct DexFile<'a> {
    data: &'a [u8],
    version: [u8; 3],
    string_ids: (usize, usize),
    type_ids: (usize, usize),
    class_defs: (usize, usize),
}

impl<'a> DexFile<'a> {
    /// Parses and validates the dex header and id table bounds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for a bad magic, a big-endian file or id tables that
    /// do not fit into the file, and [`crate::Error::Empty`] for empty input.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }
        if data.len() < HEADER_SIZE {
            return Err(malformed_error!(
                "Dex file of {} bytes is smaller than its header",
                data.len()
            ));
        }

        let mut parser = Parser::new(data);
        let magic = parser.read_bytes(8)?;
        if &magic[..4] != DEX_FILE_MAGIC
            || magic[7] != 0
            || !magic[4..7].iter().all(u8::is_ascii_digit)
        {
            return Err(malformed_error!("Invalid dex magic {:02x?}", magic));
        }
        let version = [magic[4], magic[5], magic[6]];

        parser.seek(0x28)?;
        let endian_tag = parser.read_le::<u32>()?;
        if endian_tag != ENDIAN_CONSTANT {
            return Err(malformed_error!(
                "Unsupported dex endian tag 0x{:08x}",
                endian_tag
            ));
        }

        parser.seek(0x38)?;
        let string_ids = read_section(&mut parser, 4, "string_ids")?;
        let type_ids = read_section(&mut parser, 4, "type_ids")?;
        parser.seek(0x60)?;
        let class_defs = read_section(&mut parser, CLASS_DEF_SIZE, "class_defs")?;

        Ok(DexFile {
            data,
            version,
            string_ids,
            type_ids,
            class_defs,
        })
    }

    /// Format version, e.g. `035`.
    #[must_use]
    pub fn version(&self) -> &str {
        std::str::from_utf8(&self.version).unwrap_or("???")
    }

    /// Number of classes defined in this file.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.class_defs.0
    }

    /// Reads the string with index `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index or the string data is out of bounds.
    pub fn string(&self, index: u32) -> Result<String> {
        let offset = self.id_at(self.string_ids, index, "string")?;

        let mut parser = Parser::new(self.data);
        parser.seek(offset as usize)?;
        let _utf16_len = parser.read_uleb128()?;
        parser.read_string_utf8()
    }

    /// Reads the descriptor of the type with index `index`, e.g. `Lcom/example/Foo;`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index or the referenced string is out of bounds.
    pub fn type_descriptor(&self, index: u32) -> Result<String> {
        self.string(self.id_at(self.type_ids, index, "type")?)
    }

    /// Descriptors of all classes defined in this file, in definition order.
    ///
    /// # Errors
    ///
    /// Returns an error if any class definition references an invalid type or string.
    pub fn class_descriptors(&self) -> Result<Vec<String>> {
        let (count, offset) = self.class_defs;
        let mut parser = Parser::new(self.data);

        let mut descriptors = Vec::with_capacity(count);
        for index in 0..count {
            parser.seek(offset + index * CLASS_DEF_SIZE)?;
            let class_idx = parser.read_le::<u32>()?;
            descriptors.push(self.type_descriptor(class_idx)?);
        }
        Ok(descriptors)
    }

    fn id_at(&self, (count, offset): (usize, usize), index: u32, kind: &str) -> Result<u32> {
        if index as usize >= count {
            return Err(malformed_error!(
                "Dex {} index {} out of range ({} ids)",
                kind,
                index,
                count
            ));
        }

        let mut parser = Parser::new(self.data);
        parser.seek(offset + index as usize * 4)?;
        parser.read_le::<u32>()
    }
}

/// Reads a `(size, offset)` header pair and checks that the section fits.
fn read_section(parser: &mut Parser, item_size: usize, name: &str) -> Result<(usize, usize)> {
    let size = parser.read_le::<u32>()? as usize;
    let offset = parser.read_le::<u32>()? as usize;

    let fits = size
        .checked_mul(item_size)
        .and_then(|len| len.checked_add(offset))
        .is_some_and(|end| end <= parser.len());
    if size > 0 && !fits {
        return Err(malformed_error!(
            "Dex section {} ({} items at 0x{:x}) exceeds the file",
            name,
            size,
            offset
        ));
    }

    Ok((size, offset))
}
