//! # bundlescope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! bundlescope library. Import it to get quick access to everything a conversion needs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all bundlescope operations
pub use crate::Error;

/// The result type used throughout bundlescope
pub use crate::Result;

/// Low-level parsing utilities
pub use crate::Parser;

// ================================================================================================
// Conversion
// ================================================================================================

/// Conversion entry point, its settings and the dependency it is configured from
pub use crate::sdk::{
    derive_module_name, ConversionConfig, RuntimeEnabledSdk, RuntimeEnabledSdkBuilder,
    SdkModuleConverter,
};

// ================================================================================================
// Module Model
// ================================================================================================

/// Modules, their entries and builder
pub use crate::module::{BundleModule, BundleModuleBuilder, ModuleEntry, ModuleName, ModuleType};

/// Manifest model and editing
pub use crate::manifest::{AndroidManifest, ManifestEditor, MissingElementPolicy};

// ================================================================================================
// Resources and Dex
// ================================================================================================

/// Resource ids and remapping stages
pub use crate::resources::{
    PackageId, PackageIdRemap, ResourceId, ResourceTable, ResourceTablePackageIdRemapper,
    XmlPackageIdRemapper, APP_PACKAGE_ID,
};

/// Dex inspection and entry mutation
pub use crate::dex::{
    DexEntriesMutator, DexEntryMutation, DexFile, EntryAction, R_PACKAGE_DEX_ENTRY_REMOVER,
};
