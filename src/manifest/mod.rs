//! Android manifest model and editor.
//!
//! The manifest of a module is kept as a parsed [`XmlElement`] tree rooted at `<manifest>`.
//! Reads go through [`AndroidManifest`]; writes go through a [`ManifestEditor`], which works on
//! its own copy and only hands back a new manifest from [`ManifestEditor::save`].
//!
//! Attributes are looked up by qualified name. The prefix bound to a namespace URI is taken from
//! the `xmlns:*` declarations on the root element, so a manifest that binds the Android namespace
//! to an unusual prefix is still understood.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundlescope::manifest::AndroidManifest;
//!
//! let manifest = AndroidManifest::parse(
//!     r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
//!                  package="com.example.sdk">
//!            <uses-sdk android:minSdkVersion="21"/>
//!        </manifest>"#,
//! )?;
//!
//! let edited = manifest
//!     .to_editor()
//!     .remove_uses_sdk_element()
//!     .set_split_id_for_feature_split("comexamplesdk")
//!     .save()?;
//!
//! assert!(!edited.has_uses_sdk());
//! assert_eq!(edited.split_id(), Some("comexamplesdk"));
//! assert!(manifest.has_uses_sdk());
//! # Ok::<(), bundlescope::Error>(())
//! ```

mod editor;
mod element;

pub use editor::{ManifestEditor, MissingElementPolicy};
pub use element::{XmlElement, XmlNode};

use crate::{Error, Result};

/// Namespace of the `android:` attributes.
pub const ANDROID_NAMESPACE_URI: &str = "http://schemas.android.com/apk/res/android";

/// Namespace of the `dist:` delivery elements.
pub const DISTRIBUTION_NAMESPACE_URI: &str = "http://schemas.android.com/apk/distribution";

/// Root element name.
pub const MANIFEST_ELEMENT: &str = "manifest";

/// Element declaring SDK version constraints.
pub const USES_SDK_ELEMENT: &str = "uses-sdk";

/// Prefix used when the manifest does not bind the Android namespace yet.
pub(crate) const DEFAULT_ANDROID_PREFIX: &str = "android";

/// Prefix used when the manifest does not bind the distribution namespace yet.
pub(crate) const DEFAULT_DISTRIBUTION_PREFIX: &str = "dist";

/// A parsed module manifest.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AndroidManifest {
    root: XmlElement,
}

impl AndroidManifest {
    /// Parses a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`] for syntax errors and [`Error::Manifest`] if the root element is
    /// not `<manifest>`.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::from_root(XmlElement::parse(xml)?)
    }

    /// Wraps an already built element tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if `root` is not a `<manifest>` element.
    pub fn from_root(root: XmlElement) -> Result<Self> {
        if root.name() != MANIFEST_ELEMENT {
            return Err(Error::Manifest(format!(
                "root element is <{}>, expected <{}>",
                root.name(),
                MANIFEST_ELEMENT
            )));
        }
        Ok(AndroidManifest { root })
    }

    /// The `<manifest>` element.
    #[must_use]
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// The `package` attribute.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.root.attribute("package")
    }

    /// The `split` attribute naming this module.
    #[must_use]
    pub fn split_id(&self) -> Option<&str> {
        self.root.attribute("split")
    }

    /// Returns `true` if `android:isFeatureSplit` is set to `true`.
    #[must_use]
    pub fn is_feature_split(&self) -> bool {
        self.android_attribute(&self.root, "isFeatureSplit") == Some("true")
    }

    /// Returns `true` if a `<uses-sdk>` element is present.
    #[must_use]
    pub fn has_uses_sdk(&self) -> bool {
        self.root.child(USES_SDK_ELEMENT).is_some()
    }

    /// The `<dist:module>` element, if any.
    #[must_use]
    pub fn distribution_module(&self) -> Option<&XmlElement> {
        let prefix = self.namespace_prefix(DISTRIBUTION_NAMESPACE_URI)?;
        self.root.child(&format!("{prefix}:module"))
    }

    /// Prefix bound to `uri` on the root element.
    #[must_use]
    pub fn namespace_prefix(&self, uri: &str) -> Option<&str> {
        namespace_prefix(&self.root, uri)
    }

    /// Serializes the manifest. Equal manifests produce identical output.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML writer fails.
    pub fn to_xml_string(&self) -> Result<String> {
        self.root.to_document()
    }

    /// Starts an edit with the default [`MissingElementPolicy`].
    #[must_use]
    pub fn to_editor(&self) -> ManifestEditor {
        ManifestEditor::new(self.root.clone())
    }

    fn android_attribute<'a>(&self, element: &'a XmlElement, local: &str) -> Option<&'a str> {
        let prefix = self.namespace_prefix(ANDROID_NAMESPACE_URI)?;
        element.attribute(&format!("{prefix}:{local}"))
    }
}

pub(crate) fn namespace_prefix<'a>(root: &'a XmlElement, uri: &str) -> Option<&'a str> {
    root.attributes()
        .iter()
        .find(|(key, value)| key.starts_with("xmlns:") && value == uri)
        .map(|(key, _)| &key["xmlns:".len()..])
}
