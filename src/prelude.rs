//! Prelude module for album_validators.
//!
//! Re-exports the derive macros shared by the date types.

pub use derive_more::Display;
