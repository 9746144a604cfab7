//! Default configuration values

/// Xapian release installed when `XAPIAN_VERSION` is not set
pub const XAPIAN_VERSION: &str = "1.2.8";

/// Number of download attempts for the built-in HTTP client (1 = no retry)
pub const DOWNLOAD_ATTEMPTS: u32 = 1;

/// Configure flag that enables the Python bindings target
pub const BINDINGS_FLAG: &str = "--with-python";

/// Make program used for the compile and install stages
pub const MAKE: &str = "make";

/// Branch checked out when cloning haystack
pub const HAYSTACK_BRANCH: &str = "master";

/// Working directory under the environment root for archives and sources
pub const PACKAGES_SUBDIR: &str = "packages";

/// Directory under the working directory holding per-stage build logs
pub const LOGS_SUBDIR: &str = "logs";

/// Number of log lines shown when a build stage fails
pub const FAILURE_LOG_TAIL: usize = 20;

/// Environment variable names
pub mod env {
    /// Install root of the active virtual environment
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    /// Xapian release override
    pub const XAPIAN_VERSION: &str = "XAPIAN_VERSION";
    /// Archive base URL override
    pub const XAPIAN_BASE_URL: &str = "XAPIAN_BASE_URL";
    /// Transfer tool override (curl, wget, builtin)
    pub const XAPIAN_TRANSFER: &str = "XAPIAN_TRANSFER";
    /// Parallel make jobs
    pub const XAPIAN_JOBS: &str = "XAPIAN_JOBS";
    /// Make program override
    pub const XAPIAN_MAKE: &str = "XAPIAN_MAKE";
    /// Haystack repository URL override
    pub const HAYSTACK_REPO: &str = "HAYSTACK_REPO";
    /// Config directory override
    pub const CONFIG_DIR: &str = "XAPIAN_BOOTSTRAP_CONFIG_DIR";
    /// Dynamic linker search path exported between the two builds
    pub const LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";
    /// Location of the installed `xapian-config` for the bindings build
    pub const XAPIAN_CONFIG: &str = "XAPIAN_CONFIG";
}
