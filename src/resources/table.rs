//! Resource table (`resources.arsc`) inspection and package id remapping.
//!
//! A resource table is a [`ChunkType::Table`] chunk holding a global string pool followed by one
//! or more [`ChunkType::TablePackage`] chunks. The ids a package *defines* are implicit: entry `e`
//! of type `t` in package `p` has id `0xPPTTEEEE`, where `p` comes from the package header. The
//! ids a package *references* (style parents, attribute names in bags, reference values) are
//! stored explicitly.
//!
//! [`ResourceTablePackageIdRemapper`] rewrites both: the package header id, and every referenced
//! id whose package field matches the table's original package, so that the table stays
//! self-consistent after the move.
//!
//! # Layout of the chunks that hold ids
//!
//! ```text
//! ResTable_package      id: u32 | name: [u16; 128] | typeStrings | lastPublicType | ...
//! ResTable_type         id: u8 | flags: u8 | reserved: u16 | entryCount | entriesStart | config
//!   offsets             [u32; entryCount] | [u16; entryCount] (OFFSET16) | [(u16, u16)] (SPARSE)
//!   ResTable_entry      size: u16 | flags: u16 | key: u32 [+ Res_value]
//!   ResTable_map_entry  size: u16 | flags: u16 | key: u32 | parent: u32 | count: u32
//!     ResTable_map      name: u32 | Res_value
//!   compact entry       key: u16 | flags: u16 (data type in high byte) | data: u32
//! ResTable_overlayable_policy   flags: u32 | count: u32 | [u32; count]
//! ResTable_staged_alias         count: u32 | [(staged: u32, finalized: u32); count]
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundlescope::resources::{PackageId, ResourceTable, ResourceTablePackageIdRemapper};
//!
//! # let arsc: Vec<u8> = Vec::new();
//! let table = ResourceTable::parse(&arsc)?;
//! println!("declared package: {:?}", table.primary_package_id());
//!
//! let remapper = ResourceTablePackageIdRemapper::new(PackageId::new(0x7F)?);
//! let remapped = remapper.remap_table(&arsc)?;
//! assert_eq!(ResourceTable::parse(&remapped)?.primary_package_id(), Some(0x7F));
//! # Ok::<(), bundlescope::Error>(())
//! ```

use bitflags::bitflags;
use widestring::U16Str;

use crate::{
    file::{
        io::{read_le_at, write_le_at},
        parser::Parser,
    },
    module::BundleModule,
    resources::{
        chunk::{
            remap_id_at, remap_value_at, root_chunk, ChunkHeader, ChunkType, ValueType,
            RES_VALUE_SIZE,
        },
        PackageId, PackageIdRemap,
    },
    Result,
};

/// Path of the resource table inside a module.
pub const RESOURCE_TABLE_PATH: &str = "resources.arsc";

/// Minimum header size of a table chunk (common header + package count).
const TABLE_HEADER_SIZE: usize = 12;

/// Minimum header size of a package chunk, up to and including `lastPublicKey`.
const PACKAGE_HEADER_MIN_SIZE: usize = 284;

/// Number of UTF-16 code units reserved for the package name.
const PACKAGE_NAME_LEN: usize = 128;

/// Minimum header size of a type chunk, up to and including `entriesStart`.
const TYPE_HEADER_MIN_SIZE: usize = 20;

/// Size of a full `ResTable_entry`.
const ENTRY_SIZE: usize = 8;

/// Size of a `ResTable_map_entry`.
const MAP_ENTRY_SIZE: usize = 16;

/// Size of a `ResTable_map`.
const MAP_SIZE: usize = 4 + RES_VALUE_SIZE;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    /// Flags of a `ResTable_type` chunk
    pub struct TypeFlags : u8 {
        /// Offsets are `(index, offset / 4)` pairs for the present entries only
        const SPARSE = 0x01;
        /// Offsets are `u16` values holding `offset / 4`
        const OFFSET16 = 0x02;
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    /// Flags of a `ResTable_entry`
    pub struct EntryFlags : u16 {
        /// The entry is a map (bag) with a parent and name/value pairs
        const COMPLEX = 0x0001;
        /// The entry is public
        const PUBLIC = 0x0002;
        /// The entry may be overridden by a strong definition
        const WEAK = 0x0004;
        /// The entry is stored in the 8 byte compact form
        const COMPACT = 0x0008;
    }
}

/// A package declared in a resource table.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TablePackage {
    /// Package id from the package header
    pub id: u8,
    /// Package name, e.g. `com.example.sdk`
    pub name: String,
    /// Absolute offset of the package chunk
    pub offset: usize,
}

/// Read-only summary of a resource table.
///
/// Parsing validates the table and package chunk framing. The orchestrator uses this to capture
/// the original package id before any stage rewrites it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ResourceTable {
    packages: Vec<TablePackage>,
}

impl ResourceTable {
    /// Parses the table and package headers of a resource table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the buffer is empty or the table or any package
    /// chunk is truncated or size-inconsistent.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let root = root_chunk(data, ChunkType::Table)?;
        root.require_header_size(TABLE_HEADER_SIZE)?;

        let mut packages = Vec::new();
        for child in root.children(data)? {
            if child.is(ChunkType::TablePackage) {
                packages.push(read_package(data, &child)?);
            }
        }

        Ok(ResourceTable { packages })
    }

    /// All packages in table order.
    #[must_use]
    pub fn packages(&self) -> &[TablePackage] {
        &self.packages
    }

    /// Ids of all packages in table order.
    #[must_use]
    pub fn package_ids(&self) -> Vec<u8> {
        self.packages.iter().map(|package| package.id).collect()
    }

    /// Id of the first package, the one the table was compiled for.
    #[must_use]
    pub fn primary_package_id(&self) -> Option<u8> {
        self.packages.first().map(|package| package.id)
    }
}

fn read_package(data: &[u8], chunk: &ChunkHeader) -> Result<TablePackage> {
    chunk.require_header_size(PACKAGE_HEADER_MIN_SIZE)?;

    let mut parser = Parser::new(data);
    parser.seek(chunk.offset + 8)?;

    let raw_id = parser.read_le::<u32>()?;
    let id = u8::try_from(raw_id).map_err(|_| {
        malformed_error!(
            "Package chunk at offset {} declares id 0x{:x} wider than a byte",
            chunk.offset,
            raw_id
        )
    })?;

    let mut units = Vec::with_capacity(PACKAGE_NAME_LEN);
    for _ in 0..PACKAGE_NAME_LEN {
        units.push(parser.read_le::<u16>()?);
    }
    let len = units.iter().position(|&unit| unit == 0).unwrap_or(units.len());
    let name = U16Str::from_slice(&units[..len]).to_string_lossy();

    Ok(TablePackage {
        id,
        name,
        offset: chunk.offset,
    })
}

/// Rewrites the package id of every identifier defined or referenced in a resource table.
///
/// The original package id is the one declared by the table's first package; identifiers of
/// other packages (framework `0x01` references, shared libraries) are never touched. Running the
/// remapper twice with the same target is a no-op the second time.
#[derive(Clone, Copy, Debug)]
pub struct ResourceTablePackageIdRemapper {
    target: PackageId,
}

impl ResourceTablePackageIdRemapper {
    /// Creates a remapper writing `target` as the new package id.
    #[must_use]
    pub fn new(target: PackageId) -> Self {
        ResourceTablePackageIdRemapper { target }
    }

    /// The package id this remapper writes.
    #[must_use]
    pub fn target(&self) -> PackageId {
        self.target
    }

    /// Returns a copy of `module` with its resource table remapped.
    ///
    /// A module without a resource table is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the table is structurally invalid.
    pub fn remap(&self, module: &BundleModule) -> Result<BundleModule> {
        let Some(entry) = module.resource_table() else {
            tracing::debug!(module = %module.name(), "no resource table, skipping table remap");
            return Ok(module.clone());
        };

        let remapped = self.remap_table(entry.content())?;
        module
            .to_builder()
            .replace_entry(RESOURCE_TABLE_PATH, remapped)
            .build()
    }

    /// Remaps a serialized resource table and returns the new bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the table is structurally invalid.
    pub fn remap_table(&self, data: &[u8]) -> Result<Vec<u8>> {
        let table = ResourceTable::parse(data)?;
        let mut output = data.to_vec();

        let Some(source) = table.primary_package_id() else {
            tracing::debug!("resource table declares no package");
            return Ok(output);
        };

        let remap = PackageIdRemap::new(source, self.target);
        let root = root_chunk(data, ChunkType::Table)?;

        let mut remapped = 0;
        for child in root.children(data)? {
            if child.is(ChunkType::TablePackage) {
                remapped += remap_package(&mut output, &child, &remap)?;
            }
        }

        tracing::debug!(
            source = format_args!("0x{:02x}", source),
            target = %self.target,
            remapped,
            "remapped resource table"
        );

        Ok(output)
    }
}

fn remap_package(data: &mut [u8], chunk: &ChunkHeader, remap: &PackageIdRemap) -> Result<usize> {
    chunk.require_header_size(PACKAGE_HEADER_MIN_SIZE)?;

    let mut remapped = 0;
    let id_offset = chunk.offset + 8;
    let mut cursor = id_offset;
    let id = read_le_at::<u32>(data, &mut cursor)?;
    if id == u32::from(remap.source()) && !remap.is_identity() {
        let mut cursor = id_offset;
        write_le_at(data, &mut cursor, u32::from(remap.target().value()))?;
        remapped += 1;
    }

    for child in chunk.children(data)? {
        match child.kind() {
            Some(ChunkType::TableType) => remapped += remap_type(data, &child, remap)?,
            Some(ChunkType::TableOverlayable) => {
                for policy in child.children(data)? {
                    if policy.is(ChunkType::TableOverlayablePolicy) {
                        remapped += remap_overlayable_policy(data, &policy, remap)?;
                    }
                }
            }
            Some(ChunkType::TableStagedAlias) => {
                remapped += remap_staged_alias(data, &child, remap)?;
            }
            _ => {}
        }
    }

    Ok(remapped)
}

fn remap_type(data: &mut [u8], chunk: &ChunkHeader, remap: &PackageIdRemap) -> Result<usize> {
    chunk.require_header_size(TYPE_HEADER_MIN_SIZE)?;

    let mut parser = Parser::new(data);
    parser.seek(chunk.offset + 8)?;
    let type_id = parser.read_le::<u8>()?;
    let flags = TypeFlags::from_bits_truncate(parser.read_le::<u8>()?);
    parser.advance_by(2)?;
    let entry_count = parser.read_le::<u32>()? as usize;
    let entries_start = parser.read_le::<u32>()? as usize;

    if type_id == 0 {
        return Err(malformed_error!(
            "Type chunk at offset {} has type id 0",
            chunk.offset
        ));
    }

    let end = chunk.end();
    let entries_base = chunk.offset + entries_start;
    if entries_start > chunk.size as usize {
        return Err(malformed_error!(
            "Type chunk at offset {} starts its entries at {} past its size {}",
            chunk.offset,
            entries_start,
            chunk.size
        ));
    }

    let offset_width = if flags.contains(TypeFlags::OFFSET16) && !flags.contains(TypeFlags::SPARSE)
    {
        2
    } else {
        4
    };
    let offsets_start = chunk.body_start();
    if offsets_start + entry_count * offset_width > entries_base {
        return Err(malformed_error!(
            "Type chunk at offset {} declares {} entries that overlap the entry data",
            chunk.offset,
            entry_count
        ));
    }

    let mut entry_offsets = Vec::with_capacity(entry_count);
    parser.seek(offsets_start)?;
    for _ in 0..entry_count {
        let offset = if flags.contains(TypeFlags::SPARSE) {
            let _index = parser.read_le::<u16>()?;
            Some(parser.read_le::<u16>()? as usize * 4)
        } else if flags.contains(TypeFlags::OFFSET16) {
            match parser.read_le::<u16>()? {
                0xFFFF => None,
                offset => Some(offset as usize * 4),
            }
        } else {
            match parser.read_le::<u32>()? {
                0xFFFF_FFFF => None,
                offset => Some(offset as usize),
            }
        };
        entry_offsets.extend(offset);
    }

    let mut remapped = 0;
    for offset in entry_offsets {
        remapped += remap_entry(data, entries_base + offset, end, remap)?;
    }

    Ok(remapped)
}

fn remap_entry(data: &mut [u8], pos: usize, end: usize, remap: &PackageIdRemap) -> Result<usize> {
    if pos + ENTRY_SIZE > end {
        return Err(malformed_error!(
            "Entry at offset {} exceeds its type chunk ending at {}",
            pos,
            end
        ));
    }

    let mut cursor = pos;
    let size = read_le_at::<u16>(data, &mut cursor)? as usize;
    let raw_flags = read_le_at::<u16>(data, &mut cursor)?;
    let flags = EntryFlags::from_bits_truncate(raw_flags);

    if flags.contains(EntryFlags::COMPACT) {
        let data_type = (raw_flags >> 8) as u8;
        let is_reference =
            ValueType::from_repr(data_type).is_some_and(|kind| kind.is_reference());
        return Ok(usize::from(is_reference && remap_id_at(data, pos + 4, remap)?));
    }

    if flags.contains(EntryFlags::COMPLEX) {
        if size < MAP_ENTRY_SIZE {
            return Err(malformed_error!(
                "Map entry at offset {} has size {}, expected at least {}",
                pos,
                size,
                MAP_ENTRY_SIZE
            ));
        }

        let mut cursor = pos + 12;
        let count = read_le_at::<u32>(data, &mut cursor)? as usize;
        let maps_start = pos + size;
        if maps_start + count * MAP_SIZE > end {
            return Err(malformed_error!(
                "Map entry at offset {} with {} items exceeds its type chunk ending at {}",
                pos,
                count,
                end
            ));
        }

        let mut remapped = usize::from(remap_id_at(data, pos + 8, remap)?);
        for index in 0..count {
            let map = maps_start + index * MAP_SIZE;
            remapped += usize::from(remap_id_at(data, map, remap)?);
            remapped += usize::from(remap_value_at(data, map + 4, remap)?);
        }
        return Ok(remapped);
    }

    if size < ENTRY_SIZE || pos + size + RES_VALUE_SIZE > end {
        return Err(malformed_error!(
            "Entry at offset {} with size {} exceeds its type chunk ending at {}",
            pos,
            size,
            end
        ));
    }

    Ok(usize::from(remap_value_at(data, pos + size, remap)?))
}

fn remap_overlayable_policy(
    data: &mut [u8],
    chunk: &ChunkHeader,
    remap: &PackageIdRemap,
) -> Result<usize> {
    chunk.require_header_size(16)?;

    let mut cursor = chunk.offset + 12;
    let count = read_le_at::<u32>(data, &mut cursor)? as usize;
    remap_id_array(data, chunk, count, 4, remap)
}

fn remap_staged_alias(
    data: &mut [u8],
    chunk: &ChunkHeader,
    remap: &PackageIdRemap,
) -> Result<usize> {
    chunk.require_header_size(12)?;

    let mut cursor = chunk.offset + 8;
    let count = read_le_at::<u32>(data, &mut cursor)? as usize;
    remap_id_array(data, chunk, count * 2, 4, remap)
}

/// Remaps `count` ids laid out every `stride` bytes from the chunk body start.
fn remap_id_array(
    data: &mut [u8],
    chunk: &ChunkHeader,
    count: usize,
    stride: usize,
    remap: &PackageIdRemap,
) -> Result<usize> {
    let start = chunk.body_start();
    if start + count * stride > chunk.end() {
        return Err(malformed_error!(
            "Chunk 0x{:04x} at offset {} declares {} ids but holds only {} bytes",
            chunk.chunk_type,
            chunk.offset,
            count,
            chunk.end() - start
        ));
    }

    let mut remapped = 0;
    for index in 0..count {
        remapped += usize::from(remap_id_at(data, start + index * stride, remap)?);
    }
    Ok(remapped)
}
