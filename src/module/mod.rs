//! In-memory model of an app bundle module.
//!
//! A [`BundleModule`] is an immutable value: a name, a type, a parsed manifest and an ordered
//! list of [`ModuleEntry`] files. Every transformation produces a new module through
//! [`BundleModule::to_builder`], sharing the content of all entries it does not rewrite.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundlescope::manifest::AndroidManifest;
//! use bundlescope::module::{BundleModule, ModuleEntry, ModuleName, ModuleType};
//!
//! let manifest = AndroidManifest::parse(r#"<manifest package="com.example.sdk"/>"#)?;
//! let module = BundleModule::builder()
//!     .name(ModuleName::new("base")?)
//!     .module_type(ModuleType::FeatureModule)
//!     .manifest(manifest)
//!     .add_entry(ModuleEntry::new("dex/classes.dex", vec![0u8; 4]))
//!     .build()?;
//!
//! assert_eq!(module.dex_entries().count(), 1);
//! # Ok::<(), bundlescope::Error>(())
//! ```

mod entry;

pub use entry::{ModuleEntry, DEX_DIRECTORY, RAW_RESOURCES_DIRECTORY, RESOURCES_DIRECTORY};

use std::{collections::HashSet, fmt, sync::Arc};

use strum::{AsRefStr, Display, EnumString};

use crate::{manifest::AndroidManifest, resources::RESOURCE_TABLE_PATH, Error, Result};

/// Role of a module inside an app bundle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleType {
    /// Regular feature split, the kind every module starts as
    #[default]
    FeatureModule,
    /// Asset-only module
    AssetModule,
    /// Module carrying a runtime-enabled SDK the app depends on
    SdkDependencyModule,
}

/// Non-empty name of a module.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModuleName(String);

impl ModuleName {
    /// Creates a module name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleInvalid`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::ModuleInvalid("module name must not be empty".to_string()));
        }
        Ok(ModuleName(name))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An app bundle module.
///
/// Cloning is cheap: entry contents are shared.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BundleModule {
    name: ModuleName,
    module_type: ModuleType,
    manifest: AndroidManifest,
    entries: Vec<ModuleEntry>,
}

impl BundleModule {
    /// Starts building a new module.
    #[must_use]
    pub fn builder() -> BundleModuleBuilder {
        BundleModuleBuilder::new()
    }

    /// Name of the module.
    #[must_use]
    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    /// Type of the module.
    #[must_use]
    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    /// Parsed manifest of the module.
    #[must_use]
    pub fn manifest(&self) -> &AndroidManifest {
        &self.manifest
    }

    /// All entries in module order.
    #[must_use]
    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    /// Looks up an entry by path.
    #[must_use]
    pub fn entry(&self, path: &str) -> Option<&ModuleEntry> {
        self.entries.iter().find(|entry| entry.path() == path)
    }

    /// The `resources.arsc` entry, if the module has resources.
    #[must_use]
    pub fn resource_table(&self) -> Option<&ModuleEntry> {
        self.entry(RESOURCE_TABLE_PATH)
    }

    /// Compiled XML documents: every `.xml` under `res/` except `res/raw/`.
    pub fn compiled_xml_entries(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter().filter(|entry| entry.is_compiled_xml())
    }

    /// Dex files under `dex/`.
    pub fn dex_entries(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter().filter(|entry| entry.is_dex())
    }

    /// Returns a builder pre-populated with this module, for copy-on-write edits.
    #[must_use]
    pub fn to_builder(&self) -> BundleModuleBuilder {
        BundleModuleBuilder {
            name: Some(self.name.clone()),
            module_type: self.module_type,
            manifest: Some(self.manifest.clone()),
            entries: self.entries.clone(),
        }
    }
}

/// Builder for [`BundleModule`].
///
/// A name and a manifest are required. Entries keep the order in which they were added;
/// [`BundleModuleBuilder::replace_entry`] keeps the position of the entry it replaces.
#[derive(Clone, Debug, Default)]
pub struct BundleModuleBuilder {
    name: Option<ModuleName>,
    module_type: ModuleType,
    manifest: Option<AndroidManifest>,
    entries: Vec<ModuleEntry>,
}

impl BundleModuleBuilder {
    /// Creates an empty builder for a [`ModuleType::FeatureModule`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module name.
    #[must_use]
    pub fn name(mut self, name: ModuleName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the module type.
    #[must_use]
    pub fn module_type(mut self, module_type: ModuleType) -> Self {
        self.module_type = module_type;
        self
    }

    /// Sets the manifest.
    #[must_use]
    pub fn manifest(mut self, manifest: AndroidManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Appends an entry.
    #[must_use]
    pub fn add_entry(mut self, entry: ModuleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Replaces the content of the entry at `path`, appending a new entry if there is none.
    #[must_use]
    pub fn replace_entry(mut self, path: &str, content: impl Into<Arc<[u8]>>) -> Self {
        match self.entries.iter_mut().find(|entry| entry.path() == path) {
            Some(entry) => *entry = entry.with_content(content),
            None => self.entries.push(ModuleEntry::new(path, content)),
        }
        self
    }

    /// Removes the entry at `path`, if present.
    #[must_use]
    pub fn remove_entry(mut self, path: &str) -> Self {
        self.entries.retain(|entry| entry.path() != path);
        self
    }

    /// Replaces all entries.
    #[must_use]
    pub fn entries(mut self, entries: Vec<ModuleEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Builds the module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleInvalid`] if the name or manifest is missing or two entries share
    /// a path.
    pub fn build(self) -> Result<BundleModule> {
        let name = self
            .name
            .ok_or_else(|| Error::ModuleInvalid("module name is required".to_string()))?;
        let manifest = self.manifest.ok_or_else(|| {
            Error::ModuleInvalid(format!("module '{name}' has no manifest"))
        })?;

        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.path()) {
                return Err(Error::ModuleInvalid(format!(
                    "module '{name}' contains duplicate entry '{}'",
                    entry.path()
                )));
            }
        }

        Ok(BundleModule {
            name,
            module_type: self.module_type,
            manifest,
            entries: self.entries,
        })
    }
}
