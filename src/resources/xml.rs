//! Package id remapping inside compiled (binary) XML documents.
//!
//! A compiled XML document is a [`ChunkType::Xml`] chunk whose children are a string pool, an
//! optional resource map and a flat sequence of tree nodes. Nesting is expressed by matching
//! start/end element nodes, so visiting every child chunk visits every element regardless of
//! depth.
//!
//! Packed resource ids appear in three places:
//!
//! - the resource map, one attribute id per attribute name string
//! - the typed value of every attribute of a start element node
//! - the typed value of a CDATA node
//!
//! Typed values are only rewritten when their data type is a reference kind. String, integer,
//! boolean, color and dimension values keep their bits, and raw string values are never looked at.
//!
//! ```text
//! ResXMLTree_node      header | lineNumber: u32 | comment: u32
//! ResXMLTree_attrExt   ns | name | attributeStart: u16 | attributeSize: u16 | attributeCount: u16 | ...
//! ResXMLTree_attribute ns: u32 | name: u32 | rawValue: u32 | typedValue: Res_value
//! ResXMLTree_cdataExt  data: u32 | typedValue: Res_value
//! ```

use crate::{
    file::parser::Parser,
    module::BundleModule,
    resources::{
        chunk::{remap_id_at, remap_value_at, root_chunk, ChunkHeader, ChunkType, RES_VALUE_SIZE},
        PackageId, PackageIdRemap, APP_PACKAGE_ID,
    },
    Result,
};

/// Size of a tree node header (common header + line number + comment).
const NODE_HEADER_SIZE: usize = 16;

/// Size of a `ResXMLTree_attrExt`.
const ATTR_EXT_SIZE: usize = 20;

/// Size of a `ResXMLTree_attribute`.
const ATTRIBUTE_SIZE: usize = 12 + RES_VALUE_SIZE;

/// Rewrites resource references in every compiled XML document of a module.
///
/// The source package defaults to [`APP_PACKAGE_ID`]. The orchestrator overrides it with the id
/// declared by the module's resource table, captured before the table itself is remapped, so
/// both stages apply the same [`PackageIdRemap`].
///
/// # Examples
///
/// ```rust,no_run
/// use bundlescope::resources::{PackageId, XmlPackageIdRemapper};
///
/// # let layout: Vec<u8> = Vec::new();
/// let remapper = XmlPackageIdRemapper::new(PackageId::new(0x7F)?).with_source_package_id(0x02);
/// let once = remapper.remap_document(&layout)?;
/// let twice = remapper.remap_document(&once)?;
/// assert_eq!(once, twice);
/// # Ok::<(), bundlescope::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct XmlPackageIdRemapper {
    remap: PackageIdRemap,
}

impl XmlPackageIdRemapper {
    /// Creates a remapper moving ids of the application package to `target`.
    #[must_use]
    pub fn new(target: PackageId) -> Self {
        XmlPackageIdRemapper {
            remap: PackageIdRemap::new(APP_PACKAGE_ID, target),
        }
    }

    /// Sets the original package id whose references are rewritten.
    #[must_use]
    pub fn with_source_package_id(self, source: u8) -> Self {
        XmlPackageIdRemapper {
            remap: PackageIdRemap::new(source, self.remap.target()),
        }
    }

    /// The rule applied to every reference.
    #[must_use]
    pub fn package_id_remap(&self) -> PackageIdRemap {
        self.remap
    }

    /// Returns a copy of `module` with every compiled XML document remapped.
    ///
    /// Entries other than compiled XML documents are shared with the input unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if any document is structurally invalid. No partially
    /// remapped module is returned.
    pub fn remap(&self, module: &BundleModule) -> Result<BundleModule> {
        let mut builder = module.to_builder();
        let mut documents = 0;

        for entry in module.compiled_xml_entries() {
            let remapped = self.remap_document(entry.content()).map_err(|error| {
                tracing::debug!(path = %entry.path(), %error, "failed to remap compiled xml");
                error
            })?;
            builder = builder.replace_entry(entry.path(), remapped);
            documents += 1;
        }

        tracing::debug!(
            module = %module.name(),
            documents,
            source = format_args!("0x{:02x}", self.remap.source()),
            target = %self.remap.target(),
            "remapped compiled xml"
        );

        builder.build()
    }

    /// Remaps a single compiled XML document and returns the new bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the document is empty or structurally invalid.
    pub fn remap_document(&self, data: &[u8]) -> Result<Vec<u8>> {
        let root = root_chunk(data, ChunkType::Xml)?;
        let mut output = data.to_vec();

        for child in root.children(data)? {
            match child.kind() {
                Some(ChunkType::XmlResourceMap) => {
                    let count = (child.end() - child.body_start()) / 4;
                    for index in 0..count {
                        remap_id_at(&mut output, child.body_start() + index * 4, &self.remap)?;
                    }
                }
                Some(ChunkType::XmlStartElement) => {
                    remap_start_element(&mut output, &child, &self.remap)?;
                }
                Some(ChunkType::XmlCdata) => {
                    child.require_header_size(NODE_HEADER_SIZE)?;
                    if child.body_start() + 4 + RES_VALUE_SIZE > child.end() {
                        return Err(malformed_error!(
                            "CDATA node at offset {} is truncated",
                            child.offset
                        ));
                    }
                    remap_value_at(&mut output, child.body_start() + 4, &self.remap)?;
                }
                _ => {}
            }
        }

        Ok(output)
    }
}

fn remap_start_element(data: &mut [u8], chunk: &ChunkHeader, remap: &PackageIdRemap) -> Result<()> {
    chunk.require_header_size(NODE_HEADER_SIZE)?;

    let ext = chunk.body_start();
    if ext + ATTR_EXT_SIZE > chunk.end() {
        return Err(malformed_error!(
            "Start element at offset {} is too small for its attribute header",
            chunk.offset
        ));
    }

    let mut parser = Parser::new(data);
    parser.seek(ext + 8)?;
    let attribute_start = parser.read_le::<u16>()? as usize;
    let attribute_size = parser.read_le::<u16>()? as usize;
    let attribute_count = parser.read_le::<u16>()? as usize;

    if attribute_count == 0 {
        return Ok(());
    }

    if attribute_size < ATTRIBUTE_SIZE {
        return Err(malformed_error!(
            "Start element at offset {} declares attribute size {}, expected at least {}",
            chunk.offset,
            attribute_size,
            ATTRIBUTE_SIZE
        ));
    }

    let first = ext + attribute_start;
    if first + attribute_count * attribute_size > chunk.end() {
        return Err(malformed_error!(
            "Start element at offset {} declares {} attributes past its end",
            chunk.offset,
            attribute_count
        ));
    }

    for index in 0..attribute_count {
        let attribute = first + index * attribute_size;
        remap_value_at(data, attribute + 12, remap)?;
    }

    Ok(())
}
