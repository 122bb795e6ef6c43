//! Predicate driven removal and rewriting of dex entries.

use crate::{
    dex::DexFile,
    module::{BundleModule, ModuleEntry},
    Result,
};

/// Simple name of the generated class that holds the runtime package id of SDK resources.
pub const R_PACKAGE_CLASS_NAME: &str = "RPackage";

/// Selects the entries a mutation applies to.
pub type EntryPredicate = fn(&ModuleEntry) -> bool;

/// Produces the replacement of a selected entry.
pub type EntryTransform = fn(&ModuleEntry) -> Result<ModuleEntry>;

/// What happens to an entry selected by a [`DexEntryMutation`].
#[derive(Clone, Copy, Debug)]
pub enum EntryAction {
    /// Drop the entry
    Remove,
    /// Replace the entry with the transform's result
    Transform(EntryTransform),
}

/// A named predicate and action over dex entries.
#[derive(Clone, Copy, Debug)]
pub struct DexEntryMutation {
    name: &'static str,
    predicate: EntryPredicate,
    action: EntryAction,
}

impl DexEntryMutation {
    /// Creates a mutation.
    #[must_use]
    pub const fn new(name: &'static str, predicate: EntryPredicate, action: EntryAction) -> Self {
        DexEntryMutation {
            name,
            predicate,
            action,
        }
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the mutation applies to `entry`.
    #[must_use]
    pub fn matches(&self, entry: &ModuleEntry) -> bool {
        (self.predicate)(entry)
    }

    /// The action applied to matching entries.
    #[must_use]
    pub fn action(&self) -> EntryAction {
        self.action
    }
}

/// Removes the dex file that only holds the `RPackage` class.
///
/// That class is regenerated for the app that consumes the SDK, so the SDK's own copy must not
/// ship in the converted module.
pub const R_PACKAGE_DEX_ENTRY_REMOVER: DexEntryMutation = DexEntryMutation::new(
    "r-package-dex-entry-remover",
    is_r_package_dex_entry,
    EntryAction::Remove,
);

/// Returns `true` if `entry` is a dex file whose classes are all named `RPackage`.
///
/// Files that do not parse as dex never match.
#[must_use]
pub fn is_r_package_dex_entry(entry: &ModuleEntry) -> bool {
    let descriptors = match DexFile::parse(entry.content()).and_then(|dex| dex.class_descriptors()) {
        Ok(descriptors) => descriptors,
        Err(error) => {
            tracing::trace!(path = %entry.path(), %error, "not a parseable dex file");
            return false;
        }
    };

    !descriptors.is_empty()
        && descriptors
            .iter()
            .all(|descriptor| simple_class_name(descriptor) == Some(R_PACKAGE_CLASS_NAME))
}

/// `Lcom/example/Foo;` -> `Foo`
fn simple_class_name(descriptor: &str) -> Option<&str> {
    descriptor
        .strip_prefix('L')?
        .strip_suffix(';')?
        .rsplit('/')
        .next()
}

/// Applies [`DexEntryMutation`]s to the dex entries of a module.
#[derive(Clone, Copy, Debug, Default)]
pub struct DexEntriesMutator;

impl DexEntriesMutator {
    /// Creates a mutator.
    #[must_use]
    pub fn new() -> Self {
        DexEntriesMutator
    }

    /// Returns a copy of `module` with `mutation` applied to every matching dex entry.
    ///
    /// Non-dex entries are never offered to the mutation. Entry order is preserved, and a module
    /// without matching entries comes back unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an [`EntryAction::Transform`].
    pub fn apply_mutation(
        &self,
        module: &BundleModule,
        mutation: &DexEntryMutation,
    ) -> Result<BundleModule> {
        let before = module.entries().len();
        let select = |entry: &ModuleEntry| entry.is_dex() && mutation.matches(entry);
        let entries = Self::mutate_entries(module.entries(), select, mutation.action())?;

        tracing::debug!(
            module = %module.name(),
            mutation = mutation.name(),
            removed = before - entries.len(),
            "applied dex entry mutation"
        );

        module.to_builder().entries(entries).build()
    }

    /// Filters and transforms an ordered entry list.
    ///
    /// Entries rejected by `select` are kept as they are; selected entries are dropped or
    /// replaced according to `action`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an [`EntryAction::Transform`].
    pub fn mutate_entries(
        entries: &[ModuleEntry],
        select: impl Fn(&ModuleEntry) -> bool,
        action: EntryAction,
    ) -> Result<Vec<ModuleEntry>> {
        let mut output = Vec::with_capacity(entries.len());
        for entry in entries {
            if !select(entry) {
                output.push(entry.clone());
                continue;
            }

            match action {
                EntryAction::Remove => {
                    tracing::debug!(path = %entry.path(), "removing entry");
                }
                EntryAction::Transform(transform) => output.push(transform(entry)?),
            }
        }
        Ok(output)
    }
}
