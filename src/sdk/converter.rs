//! Conversion of an SDK module into a module of the consuming app's bundle.

use rayon::prelude::*;

use crate::{
    dex::{DexEntriesMutator, R_PACKAGE_DEX_ENTRY_REMOVER},
    module::{BundleModule, ModuleName, ModuleType},
    resources::{PackageId, ResourceTable, ResourceTablePackageIdRemapper, XmlPackageIdRemapper},
    sdk::{ConversionConfig, RuntimeEnabledSdk},
    Result,
};

/// Derives the module name of an SDK from its package name by dropping every `.`.
///
/// ```rust
/// assert_eq!(bundlescope::sdk::derive_module_name("com.example.sdk"), "comexamplesdk");
/// ```
#[must_use]
pub fn derive_module_name(sdk_package_name: &str) -> String {
    sdk_package_name.replace('.', "")
}

/// Converts an SDK module into an SDK dependency module of an app bundle.
///
/// The conversion runs four stages in a fixed order, each producing a new module from the
/// previous one:
///
/// 1. rewrite the package id of every id in the resource table
/// 2. rewrite the same ids wherever compiled XML references them
/// 3. drop the dex file carrying the `RPackage` class
/// 4. rename the module, retag it and rewrite its manifest
///
/// The original package id is read from the resource table before stage 1, so stage 2 matches
/// the same ids even though the table has already moved by then.
///
/// # Examples
///
/// ```rust,no_run
/// use bundlescope::prelude::*;
///
/// # let sdk_module: BundleModule = unimplemented!();
/// let dependency = RuntimeEnabledSdk::builder()
///     .package_name("com.example.sdk")
///     .resources_package_id(0x82)
///     .build()?;
///
/// let converted = SdkModuleConverter::new("com.example.sdk", sdk_module, &dependency)?.convert()?;
/// assert_eq!(converted.name().as_str(), "comexamplesdk");
/// assert_eq!(converted.module_type(), ModuleType::SdkDependencyModule);
/// # Ok::<(), bundlescope::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct SdkModuleConverter {
    sdk_package_name: String,
    sdk_module: BundleModule,
    target: PackageId,
    config: ConversionConfig,
}

impl SdkModuleConverter {
    /// Creates a converter for `sdk_module`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPackageId`] if the dependency's resources package id is
    /// outside 1..=255. No stage has run at that point.
    pub fn new(
        sdk_package_name: impl Into<String>,
        sdk_module: BundleModule,
        dependency: &RuntimeEnabledSdk,
    ) -> Result<Self> {
        let target = PackageId::new(dependency.resources_package_id)?;
        Ok(SdkModuleConverter {
            sdk_package_name: sdk_package_name.into(),
            sdk_module,
            target,
            config: ConversionConfig::default(),
        })
    }

    /// Replaces the conversion settings.
    #[must_use]
    pub fn with_config(mut self, config: ConversionConfig) -> Self {
        self.config = config;
        self
    }

    /// The package id resources are moved to.
    #[must_use]
    pub fn target_package_id(&self) -> PackageId {
        self.target
    }

    /// Name the converted module will carry.
    #[must_use]
    pub fn module_name(&self) -> String {
        derive_module_name(&self.sdk_package_name)
    }

    /// Runs the conversion.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the resource table or a compiled XML document is
    /// structurally invalid, [`crate::Error::MissingManifestElement`] under
    /// [`ConversionConfig::strict`] when the manifest has no `<uses-sdk>`, and
    /// [`crate::Error::ModuleInvalid`] if the derived module name is empty.
    pub fn convert(&self) -> Result<BundleModule> {
        let span = tracing::info_span!(
            "convert_sdk_module",
            sdk = %self.sdk_package_name,
            target = %self.target
        );
        let _guard = span.enter();

        let source = self.original_package_id()?;

        let module = ResourceTablePackageIdRemapper::new(self.target).remap(&self.sdk_module)?;
        let module = XmlPackageIdRemapper::new(self.target)
            .with_source_package_id(source)
            .remap(&module)?;
        let module =
            DexEntriesMutator::new().apply_mutation(&module, &R_PACKAGE_DEX_ENTRY_REMOVER)?;
        let module = self.convert_name_type_and_manifest(&module)?;

        tracing::info!(
            module = %module.name(),
            entries = module.entries().len(),
            "converted sdk module"
        );
        Ok(module)
    }

    /// Converts several SDK modules in parallel.
    ///
    /// Results are returned in input order. If any conversion fails, the first error in input
    /// order is returned and no module is.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed conversion.
    pub fn convert_all(converters: &[SdkModuleConverter]) -> Result<Vec<BundleModule>> {
        let results: Vec<Result<BundleModule>> =
            converters.par_iter().map(SdkModuleConverter::convert).collect();
        results.into_iter().collect()
    }

    /// Package id the module was compiled for.
    fn original_package_id(&self) -> Result<u8> {
        let declared = match self.sdk_module.resource_table() {
            Some(entry) => ResourceTable::parse(entry.content())?.primary_package_id(),
            None => None,
        };

        Ok(declared.unwrap_or_else(|| {
            tracing::debug!(
                fallback = format_args!("0x{:02x}", self.config.fallback_source_package_id),
                "no declared package id, using fallback"
            );
            self.config.fallback_source_package_id
        }))
    }

    fn convert_name_type_and_manifest(&self, module: &BundleModule) -> Result<BundleModule> {
        let name = ModuleName::new(self.module_name())?;
        let manifest = self
            .sdk_module
            .manifest()
            .to_editor()
            .with_missing_element_policy(self.config.missing_element_policy)
            .remove_uses_sdk_element()
            .set_split_id_for_feature_split(name.as_str())
            .set_delivery_options_for_runtime_enabled_sdk_module()
            .save()?;

        tracing::debug!(module = %name, "rewrote module identity and manifest");

        module
            .to_builder()
            .name(name)
            .module_type(ModuleType::SdkDependencyModule)
            .manifest(manifest)
            .build()
    }
}
