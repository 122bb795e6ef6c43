// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # bundlescope
//!
//! Converts a runtime-enabled SDK module into a module of an Android app bundle.
//!
//! An app that depends on a runtime-enabled SDK can embed the SDK as an extra module for devices
//! that lack SDK runtime support. The SDK was compiled on its own, so every resource it defines
//! or references carries a package id the app may already use. `bundlescope` moves the SDK to
//! the package id the app assigned to it, consistently across the resource table and all
//! compiled XML, drops the generated `RPackage` dex file, and rewrites the module's name, type
//! and manifest.
//!
//! ## Features
//!
//! - **Byte-exact remapping** - Only the package byte of reference ids changes; literals that
//!   happen to look like ids are left alone
//! - **Copy-on-write modules** - Every stage returns a new module and shares untouched entries
//! - **Strict structural checks** - Truncated or size-inconsistent chunks abort the conversion
//! - **Parallel batches** - Independent conversions run concurrently
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bundlescope::prelude::*;
//!
//! # let sdk_module: BundleModule = unimplemented!();
//! let dependency = RuntimeEnabledSdk::builder()
//!     .package_name("com.example.sdk")
//!     .resources_package_id(0x7F)
//!     .build()?;
//!
//! let module = SdkModuleConverter::new("com.example.sdk", sdk_module, &dependency)?
//!     .with_config(ConversionConfig::strict())
//!     .convert()?;
//!
//! println!("{} ({})", module.name(), module.module_type());
//! # Ok::<(), bundlescope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`sdk`] - The conversion pipeline and its configuration
//! - [`resources`] - Resource ids, chunk framing, resource table and compiled XML remapping
//! - [`dex`] - Dex inspection and dex entry mutation
//! - [`manifest`] - Manifest model and editor
//! - [`module`] - The immutable module model
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: one span per conversion, a debug
//! event per stage and a trace event per rewritten id. Install any subscriber to see them.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run remap --release
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;


/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use bundlescope::prelude::*;
///
/// let target = PackageId::new(0x7F)?;
/// assert_eq!(ResourceId(0x0200_1234).with_package_id(target.value()).value(), 0x7F00_1234);
/// # Ok::<(), bundlescope::Error>(())
/// ```
pub mod prelude;

pub mod dex;
pub mod manifest;
pub mod module;
pub mod resources;
pub mod sdk;

/// `bundlescope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `bundlescope` Error type
///
/// One enum covers every failure of the crate; see its variants for the taxonomy.
pub use error::Error;

/// Bounds-checked cursor over a byte slice.
///
/// # Example
///
/// ```rust
/// use bundlescope::Parser;
///
/// let mut parser = Parser::new(&[0x02, 0x00, 0x0C, 0x00]);
/// assert_eq!(parser.read_le::<u16>()?, 0x0002);
/// assert_eq!(parser.read_le::<u16>()?, 0x000C);
/// # Ok::<(), bundlescope::Error>(())
/// ```
pub use file::parser::Parser;

pub use module::BundleModule;
pub use sdk::SdkModuleConverter;
