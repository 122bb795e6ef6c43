//! Dependency configuration and conversion settings.

use crate::{manifest::MissingElementPolicy, resources::APP_PACKAGE_ID, Error, Result};

/// An app's declared dependency on a runtime-enabled SDK.
///
/// Only [`RuntimeEnabledSdk::resources_package_id`] drives the conversion; the remaining fields
/// identify the SDK and are carried along for callers.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RuntimeEnabledSdk {
    /// Package name of the SDK, e.g. `com.example.sdk`
    pub package_name: String,
    /// Major version
    pub version_major: u32,
    /// Minor version
    pub version_minor: u32,
    /// Patch version the app was built against
    pub build_time_version_patch: u32,
    /// Digest of the SDK signing certificate
    pub certificate_digest: String,
    /// Package id assigned to the SDK's resources inside the app, 1..=255
    pub resources_package_id: u32,
}

impl RuntimeEnabledSdk {
    /// Starts building a dependency entry.
    #[must_use]
    pub fn builder() -> RuntimeEnabledSdkBuilder {
        RuntimeEnabledSdkBuilder::new()
    }
}

/// Builder for [`RuntimeEnabledSdk`].
///
/// # Examples
///
/// ```rust
/// use bundlescope::sdk::RuntimeEnabledSdk;
///
/// let sdk = RuntimeEnabledSdk::builder()
///     .package_name("com.example.sdk")
///     .version(1, 2)
///     .build_time_version_patch(3)
///     .resources_package_id(0x82)
///     .build()?;
///
/// assert_eq!(sdk.resources_package_id, 0x82);
/// # Ok::<(), bundlescope::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct RuntimeEnabledSdkBuilder {
    package_name: Option<String>,
    version_major: u32,
    version_minor: u32,
    build_time_version_patch: u32,
    certificate_digest: String,
    resources_package_id: Option<u32>,
}

impl RuntimeEnabledSdkBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the SDK package name.
    #[must_use]
    pub fn package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    /// Sets the major and minor version.
    #[must_use]
    pub fn version(mut self, major: u32, minor: u32) -> Self {
        self.version_major = major;
        self.version_minor = minor;
        self
    }

    /// Sets the patch version the app was built against.
    #[must_use]
    pub fn build_time_version_patch(mut self, patch: u32) -> Self {
        self.build_time_version_patch = patch;
        self
    }

    /// Sets the signing certificate digest.
    #[must_use]
    pub fn certificate_digest(mut self, digest: impl Into<String>) -> Self {
        self.certificate_digest = digest.into();
        self
    }

    /// Sets the resource package id the SDK is moved to.
    #[must_use]
    pub fn resources_package_id(mut self, package_id: u32) -> Self {
        self.resources_package_id = Some(package_id);
        self
    }

    /// Builds the dependency entry.
    ///
    /// The package id is range checked by the converter, not here, so that a configuration
    /// read from elsewhere can be represented as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleInvalid`] if the package name or the resource package id is
    /// missing.
    pub fn build(self) -> Result<RuntimeEnabledSdk> {
        let package_name = self
            .package_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::ModuleInvalid("SDK package name is required".to_string()))?;
        let resources_package_id = self.resources_package_id.ok_or_else(|| {
            Error::ModuleInvalid(format!(
                "SDK '{package_name}' has no resources package id"
            ))
        })?;

        Ok(RuntimeEnabledSdk {
            package_name,
            version_major: self.version_major,
            version_minor: self.version_minor,
            build_time_version_patch: self.build_time_version_patch,
            certificate_digest: self.certificate_digest,
            resources_package_id,
        })
    }
}

/// Settings of an SDK module conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionConfig {
    /// How a manifest without `<uses-sdk>` is handled
    pub missing_element_policy: MissingElementPolicy,

    /// Package id whose references compiled XML remapping rewrites when the module has no
    /// resource table to read the original id from
    pub fallback_source_package_id: u8,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            missing_element_policy: MissingElementPolicy::Ignore,
            fallback_source_package_id: APP_PACKAGE_ID,
        }
    }
}

impl ConversionConfig {
    /// Tolerates manifests that were already converted. Same as the default.
    #[must_use]
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Requires the manifest to carry every element the conversion edits.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            missing_element_policy: MissingElementPolicy::Error,
            ..Self::default()
        }
    }
}
