//! Bounds-checked access to in-memory binary data.
//!
//! Module entries are held fully in memory, so this layer only deals with byte slices:
//! [`crate::file::parser::Parser`] walks structures with a cursor and [`crate::file::io`]
//! reads and patches individual little-endian values at known offsets.

pub mod io;
pub mod parser;
