//! Runtime-enabled SDK module conversion.
//!
//! An app that depends on a runtime-enabled SDK can ship that SDK inside its own bundle, as an
//! extra module, for devices without SDK runtime support. The SDK was compiled on its own, so
//! its resources use a package id that may clash with the app's. [`SdkModuleConverter`] moves
//! the SDK's resources to the package id the app assigned to it and turns the module into an
//! install-time, removable [`crate::module::ModuleType::SdkDependencyModule`].

mod config;
mod converter;

pub use config::{ConversionConfig, RuntimeEnabledSdk, RuntimeEnabledSdkBuilder};
pub use converter::{derive_module_name, SdkModuleConverter};
