//! Build environment setup
//!
//! Describes the `configure` / `make` / `make install` invocations for each
//! package, including the environment the bindings build needs to find the
//! freshly installed core library.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::defaults::{env, MAKE as DEFAULT_MAKE};
use crate::core::environment::EnvironmentRoot;
use crate::core::release::Package;
use crate::error::EnvironmentError;
use crate::infra::process::CommandSpec;

/// One stage of an autotools build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Configure,
    Make,
    Install,
}

impl BuildStage {
    /// Stages in execution order
    pub const ALL: [Self; 3] = [Self::Configure, Self::Make, Self::Install];

    /// Short label used in messages and log file names
    pub fn label(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Make => "make",
            Self::Install => "make install",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Make => "make",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build environment for a package.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvironment {
    /// Which package this builds
    pub package: Package,
    /// Extracted source directory
    pub srcdir: PathBuf,
    /// Install prefix, the environment root
    pub prefix: PathBuf,
    /// Parallel make jobs
    pub jobs: usize,
    /// Make program (`make`, or `gmake` on BSDs)
    pub make: String,
    /// Extra `./configure` arguments
    pub configure_flags: Vec<String>,
    /// Environment variables set for every stage
    pub extra_env: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Core library: plain `configure --prefix=<root>`
    pub fn for_core(root: &EnvironmentRoot, srcdir: PathBuf, jobs: usize) -> Self {
        Self {
            package: Package::Core,
            srcdir,
            prefix: root.path().to_path_buf(),
            jobs,
            make: DEFAULT_MAKE.to_string(),
            configure_flags: Vec::new(),
            extra_env: BTreeMap::new(),
        }
    }

    /// Bindings: binding flags plus the core's library path and `xapian-config`
    ///
    /// `inherited_library_path` is the caller's `LD_LIBRARY_PATH`, kept after
    /// `<root>/lib`.
    pub fn for_bindings(
        root: &EnvironmentRoot,
        srcdir: PathBuf,
        jobs: usize,
        flags: &[String],
        inherited_library_path: Option<&OsStr>,
    ) -> Result<Self, EnvironmentError> {
        let mut extra_env = BTreeMap::new();
        extra_env.insert(
            env::LD_LIBRARY_PATH.to_string(),
            library_search_path(&root.lib_dir(), inherited_library_path)?,
        );
        extra_env.insert(
            env::XAPIAN_CONFIG.to_string(),
            root.xapian_config().display().to_string(),
        );

        Ok(Self {
            package: Package::Bindings,
            srcdir,
            prefix: root.path().to_path_buf(),
            jobs,
            make: DEFAULT_MAKE.to_string(),
            configure_flags: flags.to_vec(),
            extra_env,
        })
    }

    /// Use a different make program
    #[must_use]
    pub fn with_make(mut self, make: &str) -> Self {
        self.make = make.to_string();
        self
    }

    /// Command for one stage
    pub fn command(&self, stage: BuildStage) -> CommandSpec {
        let cmd = match stage {
            BuildStage::Configure => {
                let script = self.srcdir.join("configure");
                let mut cmd = CommandSpec::new(&script.display().to_string(), &self.srcdir)
                    .arg(format!("--prefix={}", self.prefix.display()));
                for flag in &self.configure_flags {
                    cmd = cmd.arg(flag.clone());
                }
                cmd
            }
            BuildStage::Make => {
                CommandSpec::new(&self.make, &self.srcdir).arg(format!("-j{}", self.jobs))
            }
            BuildStage::Install => CommandSpec::new(&self.make, &self.srcdir).arg("install"),
        };
        cmd.envs(&self.extra_env)
    }

    /// Log file for one stage inside `logs_dir`
    pub fn log_path(&self, logs_dir: &Path, stage: BuildStage) -> PathBuf {
        logs_dir.join(format!("{}-{}.log", self.package.name(), stage.slug()))
    }
}

/// `<lib_dir>` prepended to an existing search path
///
/// Fails when `lib_dir` itself contains the path-list separator.
pub fn library_search_path(
    lib_dir: &Path,
    inherited: Option<&OsStr>,
) -> Result<String, EnvironmentError> {
    let mut paths = vec![lib_dir.to_path_buf()];
    if let Some(inherited) = inherited {
        paths.extend(std::env::split_paths(inherited).filter(|p| !p.as_os_str().is_empty()));
    }
    std::env::join_paths(paths)
        .map(|joined| joined.to_string_lossy().into_owned())
        .map_err(|e| EnvironmentError::UnusableLibraryPath {
            path: lib_dir.to_path_buf(),
            error: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn root() -> (TempDir, EnvironmentRoot) {
        let temp = TempDir::new().unwrap();
        let root = EnvironmentRoot::from_value(Some(temp.path().to_path_buf())).unwrap();
        (temp, root)
    }

    #[test]
    fn test_core_configure_uses_root_prefix() {
        let (temp, root) = root();
        let env = BuildEnvironment::for_core(&root, temp.path().join("xapian-core-1.2.8"), 4);

        let configure = env.command(BuildStage::Configure);
        assert_eq!(
            configure.program,
            temp.path().join("xapian-core-1.2.8/configure").display().to_string()
        );
        assert_eq!(
            configure.args,
            vec![format!("--prefix={}", temp.path().display())]
        );
        assert_eq!(configure.cwd, temp.path().join("xapian-core-1.2.8"));
        assert!(configure.env.is_empty());
    }

    #[test]
    fn test_make_and_install_commands() {
        let (temp, root) = root();
        let env = BuildEnvironment::for_core(&root, temp.path().join("src"), 6);

        assert_eq!(env.command(BuildStage::Make).display(), "make -j6");
        assert_eq!(env.command(BuildStage::Install).display(), "make install");
    }

    #[test]
    fn test_bindings_environment() {
        let (temp, root) = root();
        let env = BuildEnvironment::for_bindings(
            &root,
            temp.path().join("xapian-bindings-1.2.8"),
            2,
            &["--with-python".to_string()],
            Some(OsStr::new("/opt/lib")),
        )
        .unwrap();

        let configure = env.command(BuildStage::Configure);
        assert!(configure.args.contains(&"--with-python".to_string()));

        let lib = temp.path().join("lib");
        let expected = format!("{}:/opt/lib", lib.display());
        for stage in BuildStage::ALL {
            let cmd = env.command(stage);
            assert_eq!(cmd.env.get("LD_LIBRARY_PATH"), Some(&expected));
            assert_eq!(
                cmd.env.get("XAPIAN_CONFIG"),
                Some(&temp.path().join("bin/xapian-config").display().to_string())
            );
        }
    }

    #[test]
    fn test_library_search_path_without_inherited() {
        assert_eq!(
            library_search_path(Path::new("/venv/lib"), None).unwrap(),
            "/venv/lib"
        );
        assert_eq!(
            library_search_path(Path::new("/venv/lib"), Some(OsStr::new(""))).unwrap(),
            "/venv/lib"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_library_search_path_rejects_separator_in_root() {
        let err = library_search_path(Path::new("/tmp/a:b/lib"), Some(OsStr::new("/opt/lib")))
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::UnusableLibraryPath { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_bindings_environment_rejects_separator_in_root() {
        let temp = TempDir::new().unwrap();
        let odd = temp.path().join("venv:1");
        std::fs::create_dir(&odd).unwrap();
        let root = EnvironmentRoot::from_value(Some(odd.clone())).unwrap();

        let result =
            BuildEnvironment::for_bindings(&root, odd.join("src"), 1, &[], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_paths_are_per_package_and_stage() {
        let (temp, root) = root();
        let env = BuildEnvironment::for_core(&root, temp.path().join("src"), 1);
        assert_eq!(
            env.log_path(Path::new("/logs"), BuildStage::Install),
            PathBuf::from("/logs/xapian-core-install.log")
        );
    }

    #[test]
    fn test_with_make_replaces_program() {
        let (temp, root) = root();
        let env = BuildEnvironment::for_core(&root, temp.path().join("src"), 3).with_make("gmake");
        assert_eq!(env.command(BuildStage::Make).display(), "gmake -j3");
        assert_eq!(env.command(BuildStage::Install).display(), "gmake install");
        assert!(env.command(BuildStage::Configure).program.ends_with("/configure"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The environment's lib dir always comes first, and nothing inherited is lost
        #[test]
        fn prop_library_path_prepends(
            inherited in proptest::collection::vec("/[a-z]{1,8}(/[a-z]{1,8}){0,2}", 0..4),
        ) {
            let joined = inherited.join(":");
            let result = library_search_path(Path::new("/venv/lib"), Some(OsStr::new(&joined))).unwrap();
            let parts: Vec<&str> = result.split(':').collect();
            prop_assert_eq!(parts[0], "/venv/lib");
            let expected: Vec<&str> = inherited.iter().map(String::as_str).collect();
            prop_assert_eq!(&parts[1..], expected.as_slice());
        }

        /// Jobs always reach make
        #[test]
        fn prop_jobs_reach_make(jobs in 1usize..=64) {
            let temp = TempDir::new().unwrap();
            let root = EnvironmentRoot::from_value(Some(temp.path().to_path_buf())).unwrap();
            let env = BuildEnvironment::for_core(&root, temp.path().join("src"), jobs);
            prop_assert_eq!(env.command(BuildStage::Make).args, vec![format!("-j{jobs}")]);
        }
    }
}
