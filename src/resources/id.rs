//! Packed resource identifiers and the package id remapping rule.
//!
//! A resource id is a `u32` laid out as `0xPPTTEEEE`: the package id in the most significant
//! byte, the type id in the next byte and the entry index in the low 16 bits. Every encoding this
//! crate rewrites (resource tables, compiled XML, the generated registration class) embeds ids in
//! this exact layout, which is what makes a single [`PackageIdRemap`] applicable to all of them.
//!
//! # Examples
//!
//! ```rust
//! use bundlescope::resources::{PackageId, PackageIdRemap, ResourceId};
//!
//! let remap = PackageIdRemap::new(0x02, PackageId::new(0x7F)?);
//! let id = ResourceId::new(0x0200_1234);
//!
//! assert_eq!(remap.remap(id), Some(ResourceId::new(0x7F00_1234)));
//! // ids of other packages are left alone
//! assert_eq!(remap.remap(ResourceId::new(0x0101_0000)), None);
//! # Ok::<(), bundlescope::Error>(())
//! ```

use std::fmt;

use crate::{Error, Result};

/// The package id aapt assigns to application resources.
pub const APP_PACKAGE_ID: u8 = 0x7F;

/// The package id of the Android platform resources.
pub const FRAMEWORK_PACKAGE_ID: u8 = 0x01;

/// A packed resource identifier (`0xPPTTEEEE`).
///
/// # Examples
///
/// ```rust
/// use bundlescope::resources::ResourceId;
///
/// let id = ResourceId::new(0x7F02_0001);
/// assert_eq!(id.package_id(), 0x7F);
/// assert_eq!(id.type_id(), 0x02);
/// assert_eq!(id.entry_id(), 0x0001);
/// assert_eq!(id.to_string(), "0x7f020001");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// Creates a new `ResourceId` from a raw value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        ResourceId(value)
    }

    /// Assembles an id from its three fields.
    #[must_use]
    pub fn from_parts(package_id: u8, type_id: u8, entry_id: u16) -> Self {
        ResourceId(u32::from(package_id) << 24 | u32::from(type_id) << 16 | u32::from(entry_id))
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the package field (most significant byte).
    #[must_use]
    pub fn package_id(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns the type field.
    #[must_use]
    pub fn type_id(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Returns the entry field.
    #[must_use]
    pub fn entry_id(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Returns a copy of this id with the package field replaced. Type and entry are preserved.
    #[must_use]
    pub fn with_package_id(&self, package_id: u8) -> Self {
        ResourceId((self.0 & 0x00FF_FFFF) | u32::from(package_id) << 24)
    }

    /// Returns `true` for the null reference (`0x00000000`).
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for ResourceId {
    fn from(value: u32) -> Self {
        ResourceId(value)
    }
}

impl From<ResourceId> for u32 {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ResourceId(0x{:08x}, package: 0x{:02x}, type: 0x{:02x}, entry: 0x{:04x})",
            self.0,
            self.package_id(),
            self.type_id(),
            self.entry_id()
        )
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// A validated resource package id in the legal 1..=255 range.
///
/// Dependency configurations carry the package id as a plain integer, so it is checked once
/// when converted into this type and can be trusted by every remapping stage afterwards.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PackageId(u8);

impl PackageId {
    /// Validates and wraps a package id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPackageId`] for `0` and anything above `0xFF`.
    pub fn new(value: u32) -> Result<Self> {
        match u8::try_from(value) {
            Ok(id) if id != 0 => Ok(PackageId(id)),
            _ => Err(Error::InvalidPackageId(value)),
        }
    }

    /// Returns the package id byte.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for PackageId {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        PackageId::new(value)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// The rule applied to every packed id during one conversion.
///
/// Ids whose package field equals `source` get `target` as their package field; everything else,
/// including the null id, is returned unchanged. Holding one value of this type for both the
/// resource table and the compiled XML stage is what keeps the two encodings consistent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PackageIdRemap {
    source: u8,
    target: PackageId,
}

impl PackageIdRemap {
    /// Creates a remap from the original package id to the new one.
    #[must_use]
    pub fn new(source: u8, target: PackageId) -> Self {
        PackageIdRemap { source, target }
    }

    /// The package id being replaced.
    #[must_use]
    pub fn source(&self) -> u8 {
        self.source
    }

    /// The package id written in its place.
    #[must_use]
    pub fn target(&self) -> PackageId {
        self.target
    }

    /// Returns `true` if applying this remap can never change an id.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.source == self.target.value()
    }

    /// Returns the remapped id, or `None` when the id is left untouched.
    #[must_use]
    pub fn remap(&self, id: ResourceId) -> Option<ResourceId> {
        if id.is_null() || id.package_id() != self.source || self.is_identity() {
            return None;
        }
        Some(id.with_package_id(self.target.value()))
    }

    /// Applies the rule to a raw value.
    #[must_use]
    pub fn apply(&self, value: u32) -> u32 {
        self.remap(ResourceId(value)).map_or(value, |id| id.value())
    }
}
