//! Configuration constants
//!
//! Compile-time defaults and well-known locations. Runtime settings that a
//! user can override live in [`crate::core::settings`].

pub mod defaults;
pub mod urls;
