//! Byte-level builders for resource tables.
//!
//! Tables built here carry the chunks a real `resources.arsc` has around the ones that hold ids
//! (global and package string pools, type specs), so walkers are exercised on realistic framing.

/// Reads every 4 byte window of `data` as a little-endian `u32`, at any alignment.
pub fn u32_values(data: &[u8]) -> Vec<u32> {
    data.windows(4)
        .map(|window| u32::from_le_bytes([window[0], window[1], window[2], window[3]]))
        .collect()
}

fn header(data: &mut Vec<u8>, chunk_type: u16, header_size: u16) {
    data.extend_from_slice(&chunk_type.to_le_bytes());
    data.extend_from_slice(&header_size.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
}

fn finish(mut data: Vec<u8>) -> Vec<u8> {
    let size = data.len() as u32;
    data[4..8].copy_from_slice(&size.to_le_bytes());
    data
}

fn res_value(data: &mut Vec<u8>, data_type: u8, value: u32) {
    data.extend_from_slice(&8u16.to_le_bytes());
    data.push(0);
    data.push(data_type);
    data.extend_from_slice(&value.to_le_bytes());
}

/// An empty UTF-8 string pool chunk.
pub fn empty_string_pool() -> Vec<u8> {
    let mut data = Vec::new();
    header(&mut data, 0x0001, 28);
    // stringCount, styleCount, flags (UTF8), stringsStart, stylesStart
    for value in [0u32, 0, 0x100, 0, 0] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    finish(data)
}

/// Serialized bytes of one table entry.
#[derive(Clone, Debug)]
pub struct EntryFixture(Vec<u8>);

/// A `ResTable_entry` followed by a `Res_value`.
pub fn simple_entry(data_type: u8, value: u32) -> EntryFixture {
    let mut data = Vec::new();
    data.extend_from_slice(&8u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    res_value(&mut data, data_type, value);
    EntryFixture(data)
}

/// An 8 byte compact entry holding the data type in its flags.
pub fn compact_entry(data_type: u8, value: u32) -> EntryFixture {
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&(0x0008 | (u16::from(data_type) << 8)).to_le_bytes());
    data.extend_from_slice(&value.to_le_bytes());
    EntryFixture(data)
}

/// A map entry with a parent and `(name, data_type, value)` items.
pub fn complex_entry(parent: u32, maps: &[(u32, u8, u32)]) -> EntryFixture {
    let mut data = Vec::new();
    data.extend_from_slice(&16u16.to_le_bytes());
    data.extend_from_slice(&0x0001u16.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&parent.to_le_bytes());
    data.extend_from_slice(&(maps.len() as u32).to_le_bytes());
    for &(name, data_type, value) in maps {
        data.extend_from_slice(&name.to_le_bytes());
        res_value(&mut data, data_type, value);
    }
    EntryFixture(data)
}

/// Offset encoding of a type chunk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TypeLayout {
    /// `u32` offsets, `0xFFFFFFFF` for missing entries
    Offset32,
    /// `u16` offsets divided by 4, `0xFFFF` for missing entries
    Offset16,
    /// `(index, offset / 4)` pairs for present entries only
    Sparse,
}

#[derive(Clone, Debug)]
enum Slot {
    Entry(EntryFixture),
    Missing,
    Raw(u32),
}

/// Builder for a `ResTable_type` chunk.
#[derive(Clone, Debug)]
pub struct TypeFixture {
    id: u8,
    layout: TypeLayout,
    slots: Vec<Slot>,
}

impl TypeFixture {
    pub fn new(id: u8) -> Self {
        TypeFixture {
            id,
            layout: TypeLayout::Offset32,
            slots: Vec::new(),
        }
    }

    pub fn layout(mut self, layout: TypeLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn entry(mut self, entry: EntryFixture) -> Self {
        self.slots.push(Slot::Entry(entry));
        self
    }

    pub fn missing_entry(mut self) -> Self {
        self.slots.push(Slot::Missing);
        self
    }

    /// Adds an entry whose offset is written verbatim without any entry data behind it.
    pub fn raw_offset(mut self, offset: u32) -> Self {
        self.slots.push(Slot::Raw(offset));
        self
    }

    fn entry_count(&self) -> usize {
        match self.layout {
            TypeLayout::Sparse => self
                .slots
                .iter()
                .filter(|slot| !matches!(slot, Slot::Missing))
                .count(),
            _ => self.slots.len(),
        }
    }

    /// `ResTable_typeSpec` matching this type.
    pub fn build_spec(&self) -> Vec<u8> {
        let mut data = Vec::new();
        header(&mut data, 0x0202, 16);
        data.push(self.id);
        data.push(0);
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&(self.slots.len() as u32).to_le_bytes());
        for _ in &self.slots {
            data.extend_from_slice(&0u32.to_le_bytes());
        }
        finish(data)
    }

    pub fn build(&self) -> Vec<u8> {
        const CONFIG_SIZE: usize = 64;
        let header_size = 20 + CONFIG_SIZE;

        let mut offsets = Vec::new();
        let mut entries = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let offset = match slot {
                Slot::Entry(entry) => {
                    let offset = entries.len() as u32;
                    entries.extend_from_slice(&entry.0);
                    Some(offset)
                }
                Slot::Raw(offset) => Some(*offset),
                Slot::Missing => None,
            };

            match (self.layout, offset) {
                (TypeLayout::Offset32, Some(offset)) => {
                    offsets.extend_from_slice(&offset.to_le_bytes());
                }
                (TypeLayout::Offset32, None) => offsets.extend_from_slice(&u32::MAX.to_le_bytes()),
                (TypeLayout::Offset16, Some(offset)) => {
                    offsets.extend_from_slice(&((offset / 4) as u16).to_le_bytes());
                }
                (TypeLayout::Offset16, None) => offsets.extend_from_slice(&u16::MAX.to_le_bytes()),
                (TypeLayout::Sparse, Some(offset)) => {
                    offsets.extend_from_slice(&(index as u16).to_le_bytes());
                    offsets.extend_from_slice(&((offset / 4) as u16).to_le_bytes());
                }
                (TypeLayout::Sparse, None) => {}
            }
        }
        while offsets.len() % 4 != 0 {
            offsets.push(0);
        }

        let flags = match self.layout {
            TypeLayout::Offset32 => 0u8,
            TypeLayout::Sparse => 0x01,
            TypeLayout::Offset16 => 0x02,
        };

        let mut data = Vec::new();
        header(&mut data, 0x0201, header_size as u16);
        data.push(self.id);
        data.push(flags);
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&(self.entry_count() as u32).to_le_bytes());
        data.extend_from_slice(&((header_size + offsets.len()) as u32).to_le_bytes());
        data.extend_from_slice(&(CONFIG_SIZE as u32).to_le_bytes());
        data.resize(header_size, 0);
        data.extend_from_slice(&offsets);
        data.extend_from_slice(&entries);
        finish(data)
    }
}

/// Builder for a `ResTable_package` chunk.
#[derive(Clone, Debug)]
pub struct PackageFixture {
    id: u32,
    name: String,
    chunks: Vec<Vec<u8>>,
}

impl PackageFixture {
    pub fn new(id: u32, name: &str) -> Self {
        PackageFixture {
            id,
            name: name.to_string(),
            chunks: Vec::new(),
        }
    }

    /// Adds a type spec and its type chunk.
    pub fn type_chunk(mut self, fixture: TypeFixture) -> Self {
        self.chunks.push(fixture.build_spec());
        self.chunks.push(fixture.build());
        self
    }

    /// Adds an overlayable chunk with a single policy listing `ids`.
    pub fn overlayable_policy(mut self, ids: &[u32]) -> Self {
        let mut policy = Vec::new();
        header(&mut policy, 0x0205, 16);
        policy.extend_from_slice(&0x0000_0001u32.to_le_bytes());
        policy.extend_from_slice(&(ids.len() as u32).to_le_bytes());
        for id in ids {
            policy.extend_from_slice(&id.to_le_bytes());
        }
        let policy = finish(policy);

        // name and actor, 256 UTF-16 units each
        let header_size = 8 + 512 + 512;
        let mut data = Vec::new();
        header(&mut data, 0x0204, header_size as u16);
        data.resize(header_size, 0);
        data.extend_from_slice(&policy);
        self.chunks.push(finish(data));
        self
    }

    /// Adds a staged alias chunk with `(staged, finalized)` pairs.
    pub fn staged_alias(mut self, pairs: &[(u32, u32)]) -> Self {
        let mut data = Vec::new();
        header(&mut data, 0x0206, 12);
        data.extend_from_slice(&(pairs.len() as u32).to_le_bytes());
        for (staged, finalized) in pairs {
            data.extend_from_slice(&staged.to_le_bytes());
            data.extend_from_slice(&finalized.to_le_bytes());
        }
        self.chunks.push(finish(data));
        self
    }

    /// Adds a chunk of a type no walker knows, holding `words` after an 8 byte header.
    pub fn unknown_chunk(mut self, chunk_type: u16, words: &[u32]) -> Self {
        let mut data = Vec::new();
        header(&mut data, chunk_type, 8);
        for word in words {
            data.extend_from_slice(&word.to_le_bytes());
        }
        self.chunks.push(finish(data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const HEADER_SIZE: usize = 288;

        let mut data = Vec::new();
        header(&mut data, 0x0200, HEADER_SIZE as u16);
        data.extend_from_slice(&self.id.to_le_bytes());

        let mut name: Vec<u16> = self.name.encode_utf16().take(127).collect();
        name.resize(128, 0);
        for unit in name {
            data.extend_from_slice(&unit.to_le_bytes());
        }

        let type_strings = HEADER_SIZE as u32;
        let key_strings = type_strings + empty_string_pool().len() as u32;
        // typeStrings, lastPublicType, keyStrings, lastPublicKey, typeIdOffset
        for value in [type_strings, 0, key_strings, 0, 0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        assert_eq!(data.len(), HEADER_SIZE);

        data.extend_from_slice(&empty_string_pool());
        data.extend_from_slice(&empty_string_pool());
        for chunk in &self.chunks {
            data.extend_from_slice(chunk);
        }
        finish(data)
    }
}

/// Builder for a complete `resources.arsc`.
#[derive(Clone, Debug, Default)]
pub struct TableFixture {
    packages: Vec<PackageFixture>,
}

impl TableFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(mut self, package: PackageFixture) -> Self {
        self.packages.push(package);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        header(&mut data, 0x0002, 12);
        data.extend_from_slice(&(self.packages.len() as u32).to_le_bytes());
        data.extend_from_slice(&empty_string_pool());
        for package in &self.packages {
            data.extend_from_slice(&package.build());
        }
        finish(data)
    }
}
