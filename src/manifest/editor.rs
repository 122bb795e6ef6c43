//! Fluent manifest editing.

use crate::{
    manifest::{
        namespace_prefix, AndroidManifest, XmlElement, ANDROID_NAMESPACE_URI,
        DEFAULT_ANDROID_PREFIX, DEFAULT_DISTRIBUTION_PREFIX, DISTRIBUTION_NAMESPACE_URI,
        USES_SDK_ELEMENT,
    },
    Error, Result,
};

/// What to do when an edit targets an element the manifest does not have.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MissingElementPolicy {
    /// Treat the edit as already applied
    #[default]
    Ignore,
    /// Fail [`ManifestEditor::save`] with [`Error::MissingManifestElement`]
    Error,
}

/// Accumulates edits on a private copy of a manifest.
///
/// Edits are applied in call order. The first failing edit is remembered and every later edit
/// is skipped; [`ManifestEditor::save`] then reports that error. The manifest the editor was
/// created from is never modified.
#[derive(Debug)]
pub struct ManifestEditor {
    root: XmlElement,
    policy: MissingElementPolicy,
    error: Option<Error>,
}

impl ManifestEditor {
    pub(crate) fn new(root: XmlElement) -> Self {
        ManifestEditor {
            root,
            policy: MissingElementPolicy::default(),
            error: None,
        }
    }

    /// Sets how removals of absent elements are handled.
    #[must_use]
    pub fn with_missing_element_policy(mut self, policy: MissingElementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Removes every `<uses-sdk>` element.
    #[must_use]
    pub fn remove_uses_sdk_element(self) -> Self {
        self.edit(|editor| {
            let removed = editor.root.remove_children(USES_SDK_ELEMENT);
            if removed == 0 {
                tracing::debug!(policy = ?editor.policy, "manifest has no <uses-sdk> element");
                if editor.policy == MissingElementPolicy::Error {
                    return Err(Error::MissingManifestElement(USES_SDK_ELEMENT.to_string()));
                }
            }
            Ok(())
        })
    }

    /// Names the module `split_id` and marks it as a feature split.
    ///
    /// Sets the `split` attribute and `android:isFeatureSplit="true"` on the root element,
    /// declaring the Android namespace if the manifest lacks it.
    #[must_use]
    pub fn set_split_id_for_feature_split(self, split_id: &str) -> Self {
        self.edit(|editor| {
            editor.root.set_attribute("split", split_id);
            let android = editor.bind_namespace(ANDROID_NAMESPACE_URI, DEFAULT_ANDROID_PREFIX)?;
            editor
                .root
                .set_attribute(format!("{android}:isFeatureSplit"), "true");
            Ok(())
        })
    }

    /// Installs the delivery options of a runtime-enabled SDK module.
    ///
    /// Replaces any `<dist:module>` element with one that delivers the module at install time,
    /// allows it to be removed and fuses it into standalone APKs:
    ///
    /// ```text
    /// <dist:module>
    ///     <dist:delivery>
    ///         <dist:install-time>
    ///             <dist:removable dist:value="true"/>
    ///         </dist:install-time>
    ///     </dist:delivery>
    ///     <dist:fusing dist:include="true"/>
    /// </dist:module>
    /// ```
    #[must_use]
    pub fn set_delivery_options_for_runtime_enabled_sdk_module(self) -> Self {
        self.edit(|editor| {
            let dist =
                editor.bind_namespace(DISTRIBUTION_NAMESPACE_URI, DEFAULT_DISTRIBUTION_PREFIX)?;
            let element = |local: &str| XmlElement::new(format!("{dist}:{local}"));

            let module = element("module")
                .with_child(
                    element("delivery").with_child(
                        element("install-time").with_child(
                            element("removable").with_attribute(format!("{dist}:value"), "true"),
                        ),
                    ),
                )
                .with_child(element("fusing").with_attribute(format!("{dist}:include"), "true"));

            editor.root.remove_children(module.name());
            editor.root.push_child(module);
            Ok(())
        })
    }

    /// Finishes editing and returns the new manifest.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an edit.
    pub fn save(self) -> Result<AndroidManifest> {
        match self.error {
            Some(error) => Err(error),
            None => AndroidManifest::from_root(self.root),
        }
    }

    fn edit(mut self, apply: impl FnOnce(&mut Self) -> Result<()>) -> Self {
        if self.error.is_none() {
            if let Err(error) = apply(&mut self) {
                self.error = Some(error);
            }
        }
        self
    }

    /// Returns the prefix bound to `uri`, declaring `xmlns:{default_prefix}` if needed.
    fn bind_namespace(&mut self, uri: &str, default_prefix: &str) -> Result<String> {
        if let Some(prefix) = namespace_prefix(&self.root, uri) {
            return Ok(prefix.to_string());
        }

        let declaration = format!("xmlns:{default_prefix}");
        if let Some(other) = self.root.attribute(&declaration) {
            return Err(Error::Manifest(format!(
                "prefix '{default_prefix}' is bound to '{other}', cannot bind it to '{uri}'"
            )));
        }

        self.root.set_attribute(declaration, uri);
        Ok(default_prefix.to_string())
    }
}
