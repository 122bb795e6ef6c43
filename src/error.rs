use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every stage of a conversion is a pure, deterministic transformation, so none of these errors
/// are transient: retrying a failed conversion with the same input fails the same way. A failed
/// stage never yields a partially converted module.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::Malformed`] - Truncated or size-inconsistent chunks in a resource table or compiled XML
/// - [`Error::OutOfBounds`] - Attempted to read or write beyond a buffer boundary
/// - [`Error::Empty`] - Empty input provided where a dex file was expected
///
/// ## Conversion Errors
/// - [`Error::InvalidPackageId`] - Remap target outside the legal 1..=255 range
/// - [`Error::ModuleInvalid`] - Module builder invariants violated
///
/// ## Manifest Errors
/// - [`Error::Manifest`] - The manifest fragment is not a usable `<manifest>` document
/// - [`Error::MissingManifestElement`] - A required element was absent under the strict policy
/// - [`Error::Xml`] - Errors from the underlying XML reader/writer
/// - [`Error::Io`] - I/O errors raised while serializing
///
/// # Examples
///
/// ```rust
/// use bundlescope::{Error, resources::ResourceTable};
///
/// match ResourceTable::parse(&[0x02, 0x00, 0x0C, 0x00]) {
///     Ok(table) => println!("Primary package: {:?}", table.primary_package_id()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed table: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// Raised when a chunk header is inconsistent (header larger than the chunk, chunk larger
    /// than its parent) or a nested structure points outside its chunk. The error includes the
    /// source location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing or patching a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The remap target is not a legal resource package id.
    ///
    /// Package ids are a single byte and `0x00` is reserved for shared libraries, so only
    /// 1..=255 is accepted. Raised at converter construction, before any stage runs.
    #[error("Invalid resource package id {0:#x}, expected a value in 1..=255")]
    InvalidPackageId(u32),

    /// The module could not be built.
    ///
    /// Raised by [`crate::module::BundleModuleBuilder::build`] for missing fields or duplicate
    /// entry paths.
    #[error("Invalid module - {0}")]
    ModuleInvalid(String),

    /// The manifest fragment is structurally unusable.
    #[error("Invalid manifest - {0}")]
    Manifest(String),

    /// An element that the manifest editor was asked to remove does not exist.
    ///
    /// Only raised with [`crate::manifest::MissingElementPolicy::Error`].
    #[error("Manifest element <{0}> is missing")]
    MissingManifestElement(String),

    /// Error from the quick-xml reader or writer.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
