//! Platform-specific directory management
//!
//! Provides the location of the user configuration file. Follows the XDG Base
//! Directory Specification on Linux and standard locations on macOS.
//!
//! `XAPIAN_BOOTSTRAP_CONFIG_DIR` overrides the platform default.

use std::env;
use std::path::PathBuf;

use crate::config::defaults::env::CONFIG_DIR;

/// Application name used in directory paths
const APP_NAME: &str = "xapian-bootstrap";

/// Config file name inside the config directory
const CONFIG_FILE: &str = "config.toml";

/// Platform-specific directory provider
#[derive(Debug, Clone)]
pub struct BootstrapDirs {
    config_dir: PathBuf,
}

impl BootstrapDirs {
    /// Resolve directories from the environment, then platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/xapian-bootstrap` or `~/.config/xapian-bootstrap`
    /// - macOS: `~/Library/Application Support/xapian-bootstrap`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the config file path
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        match env::var(CONFIG_DIR) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::platform_config_dir(),
        }
    }

    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for BootstrapDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_under_config_dir() {
        let dirs = BootstrapDirs::new();
        assert!(dirs.config_path().starts_with(dirs.config_dir()));
        assert!(dirs.config_path().ends_with("config.toml"));
    }
}
