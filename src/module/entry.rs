//! Named entries of a module.

use std::sync::Arc;

/// Directory holding the dex files of a module.
pub const DEX_DIRECTORY: &str = "dex";

/// Directory holding the resource files of a module.
pub const RESOURCES_DIRECTORY: &str = "res";

/// Resource directory whose files are stored verbatim and never compiled.
pub const RAW_RESOURCES_DIRECTORY: &str = "res/raw";

/// A single file of a module: a relative path and its content.
///
/// The content is reference counted, so cloning an entry (and therefore cloning a whole module
/// for a copy-on-write stage) never copies file data. Only entries a stage rewrites get new
/// content.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleEntry {
    path: String,
    content: Arc<[u8]>,
}

impl ModuleEntry {
    /// Creates a new entry.
    ///
    /// # Arguments
    ///
    /// * `path` - Path relative to the module root, using `/` as separator
    /// * `content` - File content
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        ModuleEntry {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Path relative to the module root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Last path component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns `true` if the entry lives below `directory` at any depth.
    #[must_use]
    pub fn is_under(&self, directory: &str) -> bool {
        self.path
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Returns `true` for `res/**/*.xml` files outside `res/raw`.
    #[must_use]
    pub fn is_compiled_xml(&self) -> bool {
        self.is_under(RESOURCES_DIRECTORY)
            && !self.is_under(RAW_RESOURCES_DIRECTORY)
            && self.path.ends_with(".xml")
    }

    /// Returns `true` for `dex/*.dex` files.
    #[must_use]
    pub fn is_dex(&self) -> bool {
        self.is_under(DEX_DIRECTORY) && self.path.ends_with(".dex")
    }

    /// Returns a copy of this entry with different content.
    #[must_use]
    pub fn with_content(&self, content: impl Into<Arc<[u8]>>) -> Self {
        ModuleEntry {
            path: self.path.clone(),
            content: content.into(),
        }
    }

    /// Returns `true` if both entries share the same content allocation.
    #[must_use]
    pub fn shares_content_with(&self, other: &ModuleEntry) -> bool {
        Arc::ptr_eq(&self.content, &other.content)
    }
}
