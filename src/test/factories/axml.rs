//! Byte-level builder for compiled XML documents.

use crate::resources::chunk::ValueType;

const NO_INDEX: u32 = 0xFFFF_FFFF;

/// One attribute of a start element, identified only by its typed value.
#[derive(Clone, Copy, Debug)]
pub struct XmlAttribute {
    data_type: ValueType,
    data: u32,
}

impl XmlAttribute {
    pub fn typed(data_type: ValueType, data: u32) -> Self {
        XmlAttribute { data_type, data }
    }
}

/// Builder for a compiled XML document.
///
/// Node chunks are emitted in call order; nesting is whatever the start/end calls describe.
#[derive(Clone, Debug, Default)]
pub struct XmlFixture {
    strings: Vec<String>,
    resource_map: Vec<u32>,
    nodes: Vec<Vec<u8>>,
}

impl XmlFixture {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, value: &str) -> u32 {
        match self.strings.iter().position(|existing| existing == value) {
            Some(index) => index as u32,
            None => {
                self.strings.push(value.to_string());
                (self.strings.len() - 1) as u32
            }
        }
    }

    fn node(chunk_type: u16, ext: &[u8]) -> Vec<u8> {
        let size = (16 + ext.len()) as u32;
        let mut data = Vec::new();
        data.extend_from_slice(&chunk_type.to_le_bytes());
        data.extend_from_slice(&16u16.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
        // line number, comment
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&NO_INDEX.to_le_bytes());
        data.extend_from_slice(ext);
        data
    }

    pub fn resource_map(mut self, ids: &[u32]) -> Self {
        self.resource_map.extend_from_slice(ids);
        self
    }

    pub fn start_namespace(mut self) -> Self {
        let prefix = self.intern("android");
        let uri = self.intern("http://schemas.android.com/apk/res/android");
        let mut ext = Vec::new();
        ext.extend_from_slice(&prefix.to_le_bytes());
        ext.extend_from_slice(&uri.to_le_bytes());
        self.nodes.push(Self::node(0x0100, &ext));
        self
    }

    pub fn end_namespace(mut self) -> Self {
        let prefix = self.intern("android");
        let uri = self.intern("http://schemas.android.com/apk/res/android");
        let mut ext = Vec::new();
        ext.extend_from_slice(&prefix.to_le_bytes());
        ext.extend_from_slice(&uri.to_le_bytes());
        self.nodes.push(Self::node(0x0101, &ext));
        self
    }

    pub fn start_element(self, name: &str, attributes: &[XmlAttribute]) -> Self {
        let count = attributes.len() as u16;
        self.start_element_with_count(name, attributes, count)
    }

    /// Start element whose header declares `declared_count` attributes regardless of how many
    /// are actually written.
    pub fn start_element_with_count(
        mut self,
        name: &str,
        attributes: &[XmlAttribute],
        declared_count: u16,
    ) -> Self {
        let name = self.intern(name);

        let mut ext = Vec::new();
        ext.extend_from_slice(&NO_INDEX.to_le_bytes());
        ext.extend_from_slice(&name.to_le_bytes());
        // attributeStart, attributeSize, attributeCount, idIndex, classIndex, styleIndex
        for value in [20u16, 20, declared_count, 0, 0, 0] {
            ext.extend_from_slice(&value.to_le_bytes());
        }

        for (index, attribute) in attributes.iter().enumerate() {
            let attribute_name = self.intern(&format!("attr{index}"));
            ext.extend_from_slice(&NO_INDEX.to_le_bytes());
            ext.extend_from_slice(&attribute_name.to_le_bytes());
            ext.extend_from_slice(&NO_INDEX.to_le_bytes());
            ext.extend_from_slice(&8u16.to_le_bytes());
            ext.push(0);
            ext.push(attribute.data_type as u8);
            ext.extend_from_slice(&attribute.data.to_le_bytes());
        }

        self.nodes.push(Self::node(0x0102, &ext));
        self
    }

    pub fn end_element(mut self, name: &str) -> Self {
        let name = self.intern(name);
        let mut ext = Vec::new();
        ext.extend_from_slice(&NO_INDEX.to_le_bytes());
        ext.extend_from_slice(&name.to_le_bytes());
        self.nodes.push(Self::node(0x0103, &ext));
        self
    }

    pub fn cdata(mut self, data_type: ValueType, data: u32) -> Self {
        let text = self.intern("@ref");
        let mut ext = Vec::new();
        ext.extend_from_slice(&text.to_le_bytes());
        ext.extend_from_slice(&8u16.to_le_bytes());
        ext.push(0);
        ext.push(data_type as u8);
        ext.extend_from_slice(&data.to_le_bytes());
        self.nodes.push(Self::node(0x0104, &ext));
        self
    }

    /// Raw chunk of a type no walker knows, holding `words` after an 8 byte header.
    pub fn unknown_chunk(mut self, chunk_type: u16, words: &[u32]) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&chunk_type.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        data.extend_from_slice(&((8 + words.len() * 4) as u32).to_le_bytes());
        for word in words {
            data.extend_from_slice(&word.to_le_bytes());
        }
        self.nodes.push(data);
        self
    }

    fn string_pool(&self) -> Vec<u8> {
        let mut offsets = Vec::new();
        let mut bytes = Vec::new();
        for value in &self.strings {
            offsets.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            // utf16 length, utf8 length, bytes, terminator
            bytes.push(value.chars().count() as u8);
            bytes.push(value.len() as u8);
            bytes.extend_from_slice(value.as_bytes());
            bytes.push(0);
        }
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }

        let strings_start = 28 + offsets.len() as u32;
        let size = strings_start + bytes.len() as u32;

        let mut data = Vec::new();
        data.extend_from_slice(&0x0001u16.to_le_bytes());
        data.extend_from_slice(&28u16.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
        for value in [self.strings.len() as u32, 0, 0x100, strings_start, 0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&offsets);
        data.extend_from_slice(&bytes);
        data
    }

    pub fn build(&self) -> Vec<u8> {
        let mut body = self.string_pool();

        if !self.resource_map.is_empty() {
            let size = (8 + self.resource_map.len() * 4) as u32;
            body.extend_from_slice(&0x0180u16.to_le_bytes());
            body.extend_from_slice(&8u16.to_le_bytes());
            body.extend_from_slice(&size.to_le_bytes());
            for id in &self.resource_map {
                body.extend_from_slice(&id.to_le_bytes());
            }
        }

        for node in &self.nodes {
            body.extend_from_slice(node);
        }

        let mut data = Vec::new();
        data.extend_from_slice(&0x0003u16.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        data.extend_from_slice(&((8 + body.len()) as u32).to_le_bytes());
        data.extend_from_slice(&body);
        data
    }
}
