//! Core bootstrap logic
//!
//! Each step of the install lives in its own module; [`pipeline`] chains
//! them. Process spawning, downloads and archive handling are delegated to
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`environment`] - Virtualenv guard and install layout
//! - [`settings`] - Layered settings (flags, env, config file, defaults)
//! - [`release`] - Archive names and URLs for a release
//! - [`haystack`] - Idempotent haystack checkout
//! - [`fetch`] - Archive downloads
//! - [`extract`] - Archive extraction
//! - [`build_env`] - Per-package configure/make environment
//! - [`builder`] - Build orchestration logic
//! - [`verify`] - Import check
//! - [`pipeline`] - Step sequencing
//! - [`doctor`] - Host tool checks
//! - [`clean`] - Scratch area removal

pub mod build_env;
pub mod builder;
pub mod clean;
pub mod doctor;
pub mod environment;
pub mod extract;
pub mod fetch;
pub mod haystack;
pub mod pipeline;
pub mod release;
pub mod settings;
pub mod verify;
