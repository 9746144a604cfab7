//! xapian-bootstrap - Build Xapian and its Python bindings into a virtualenv
//!
//! Downloads the `xapian-core` and `xapian-bindings` source releases,
//! builds them with the autotools toolchain into the active virtual
//! environment, clones haystack alongside, and checks that the bindings
//! import.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Bootstrap steps and their sequencing
//! - [`infra`] - Infrastructure layer (network, filesystem, processes, git)
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
