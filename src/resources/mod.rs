//! Resource table and compiled XML handling.
//!
//! Resources of a module are addressed by packed resource ids ([`ResourceId`]). The same id shows
//! up in two independent binary encodings: the resource table that defines it and the compiled
//! XML documents that reference it. Moving a module to a new package id means rewriting both
//! encodings with one [`PackageIdRemap`], otherwise a layout would point at a resource that no
//! longer exists at runtime.
//!
//! # Key Components
//!
//! - [`ResourceId`] / [`PackageId`] / [`PackageIdRemap`] - id layout and the remapping rule
//! - [`chunk`] - chunk framing shared by both encodings
//! - [`ResourceTable`] / [`ResourceTablePackageIdRemapper`] - `resources.arsc`
//! - [`XmlPackageIdRemapper`] - compiled XML documents under `res/`
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundlescope::resources::{
//!     PackageId, ResourceTable, ResourceTablePackageIdRemapper, XmlPackageIdRemapper,
//! };
//!
//! # let module: bundlescope::module::BundleModule = unimplemented!();
//! let target = PackageId::new(0x7F)?;
//! let source = module
//!     .resource_table()
//!     .map(|entry| ResourceTable::parse(entry.content()))
//!     .transpose()?
//!     .and_then(|table| table.primary_package_id());
//!
//! let module = ResourceTablePackageIdRemapper::new(target).remap(&module)?;
//! let xml = XmlPackageIdRemapper::new(target);
//! let xml = match source {
//!     Some(source) => xml.with_source_package_id(source),
//!     None => xml,
//! };
//! let module = xml.remap(&module)?;
//! # Ok::<(), bundlescope::Error>(())
//! ```

pub mod chunk;
mod id;
mod table;
mod xml;

pub use id::{PackageId, PackageIdRemap, ResourceId, APP_PACKAGE_ID, FRAMEWORK_PACKAGE_ID};
pub use table::{
    EntryFlags, ResourceTable, ResourceTablePackageIdRemapper, TablePackage, TypeFlags,
    RESOURCE_TABLE_PATH,
};
pub use xml::XmlPackageIdRemapper;
