//! Fixture builders producing the binary and textual inputs of a module.

pub mod arsc;
pub mod axml;
pub mod dex;
pub mod module;
