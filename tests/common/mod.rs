//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a scratch
//! virtualenv, an isolated config directory, fake build tools and release
//! archives served over HTTP.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Release version used by the fixtures
pub const VERSION: &str = "1.2.8";

/// Variables the binary reads; cleared so the host environment cannot leak in
const ISOLATED_VARS: &[&str] = &[
    "VIRTUAL_ENV",
    "XAPIAN_VERSION",
    "XAPIAN_BASE_URL",
    "XAPIAN_TRANSFER",
    "XAPIAN_JOBS",
    "XAPIAN_MAKE",
    "HAYSTACK_REPO",
    "RUST_LOG",
];

/// Test environment context
///
/// Holds a temporary virtualenv root, a private config directory and a
/// directory of fake tools.
pub struct TestEnv {
    /// Stands in for `$VIRTUAL_ENV`
    pub venv: TempDir,
    /// Passed as `XAPIAN_BOOTSTRAP_CONFIG_DIR`
    pub config: TempDir,
    /// Fake `make` and release archives
    pub fixtures: TempDir,
}

impl TestEnv {
    /// Create a new environment with a fake `make`
    pub fn new() -> Self {
        let env = Self {
            venv: TempDir::new().expect("Failed to create temp directory"),
            config: TempDir::new().expect("Failed to create temp directory"),
            fixtures: TempDir::new().expect("Failed to create temp directory"),
        };
        write_script(
            &env.make_path(),
            r#"echo "$@" >> make.calls"#,
        );
        env
    }

    /// Get the path to the virtualenv root
    pub fn root(&self) -> PathBuf {
        self.venv.path().to_path_buf()
    }

    /// Path of the fake `make`
    pub fn make_path(&self) -> PathBuf {
        self.fixtures.path().join("bin/make")
    }

    /// Command for the binary, isolated from the host and with
    /// `VIRTUAL_ENV` set
    pub fn command(&self) -> tokio::process::Command {
        let mut cmd = self.bare_command();
        cmd.env("VIRTUAL_ENV", self.venv.path());
        cmd
    }

    /// Command for the binary without `VIRTUAL_ENV`
    pub fn bare_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_xapian-bootstrap"));
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.env("XAPIAN_BOOTSTRAP_CONFIG_DIR", self.config.path());
        cmd.env("XAPIAN_MAKE", self.make_path());
        cmd.env("XAPIAN_TRANSFER", "builtin");
        cmd.current_dir(self.fixtures.path());
        cmd
    }

    /// Run the binary with `args`
    pub async fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .await
            .expect("Failed to execute xapian-bootstrap")
    }

    /// Create a file under the virtualenv root
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.venv.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory under the virtualenv root
    pub fn create_dir(&self, name: &str) {
        std::fs::create_dir_all(self.venv.path().join(name)).expect("Failed to create directory");
    }

    /// Check if a path exists under the virtualenv root
    pub fn exists(&self, name: &str) -> bool {
        self.venv.path().join(name).exists()
    }

    /// Read a file under the virtualenv root
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.venv.path().join(name)).expect("Failed to read file")
    }

    /// Install a fake interpreter at `<root>/bin/python`
    pub fn fake_python(&self, body: &str) {
        write_script(&self.venv.path().join("bin/python"), body);
    }

    /// Serve a release whose `configure` scripts run the given shell bodies
    pub async fn serve_release(
        &self,
        version: &str,
        core_configure: &str,
        bindings_configure: &str,
    ) -> MockServer {
        let server = MockServer::start().await;
        for (name, configure) in [
            ("xapian-core", core_configure),
            ("xapian-bindings", bindings_configure),
        ] {
            let top = format!("{name}-{version}");
            let body = release_archive(&top, configure);
            Mock::given(method("GET"))
                .and(path(format!("/{version}/{top}.tar.gz")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
                .mount(&server)
                .await;
        }
        server
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an executable shell script
pub fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to set permissions");
}

/// Gzipped tarball holding `<top>/configure`
pub fn release_archive(top: &str, configure: &str) -> Vec<u8> {
    let script = format!("#!/bin/sh\n{configure}\n");
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut header = tar::Header::new_gnu();
    header.set_size(script.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, format!("{top}/configure"), script.as_bytes())
        .expect("Failed to append to archive");

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .expect("Failed to finish archive")
}

/// Stdout as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
