//! Release archives
//!
//! A Xapian release is two source tarballs published side by side:
//! `<base>/<version>/xapian-core-<version>.tar.gz` and the matching
//! `xapian-bindings` archive.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The two packages built from a release, in install order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    /// The search engine library
    Core,
    /// Language bindings, built against the installed core
    Bindings,
}

impl Package {
    /// Install order; bindings need the core's library and `xapian-config`
    pub const ALL: [Self; 2] = [Self::Core, Self::Bindings];

    /// Upstream package name
    pub fn name(self) -> &'static str {
        match self {
            Self::Core => "xapian-core",
            Self::Bindings => "xapian-bindings",
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One downloadable source archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSpec {
    pub package: Package,
    pub version: String,
    pub url: String,
}

impl ArchiveSpec {
    /// `<package>-<version>`, the top-level directory inside the tarball
    pub fn source_dir_name(&self) -> String {
        format!("{}-{}", self.package.name(), self.version)
    }

    /// `<package>-<version>.tar.gz`
    pub fn file_name(&self) -> String {
        format!("{}.tar.gz", self.source_dir_name())
    }

    /// Where the archive is saved inside `work_dir`
    pub fn archive_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(self.file_name())
    }

    /// Where the archive unpacks inside `work_dir`
    pub fn source_dir(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(self.source_dir_name())
    }
}

/// A release version published under a base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    version: String,
    base_url: String,
}

impl Release {
    /// Create a release; a trailing slash on `base_url` is ignored
    pub fn new(version: &str, base_url: &str) -> Self {
        Self {
            version: version.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Release version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Archive for one package
    pub fn archive(&self, package: Package) -> ArchiveSpec {
        ArchiveSpec {
            package,
            version: self.version.clone(),
            url: format!(
                "{}/{}/{}-{}.tar.gz",
                self.base_url,
                self.version,
                package.name(),
                self.version
            ),
        }
    }

    /// Both archives, core first
    pub fn archives(&self) -> Vec<ArchiveSpec> {
        Package::ALL.iter().map(|p| self.archive(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_style_urls() {
        let release = Release::new("1.2.8", "http://oligarchy.co.uk/xapian");
        let urls: Vec<String> = release.archives().into_iter().map(|a| a.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://oligarchy.co.uk/xapian/1.2.8/xapian-core-1.2.8.tar.gz",
                "http://oligarchy.co.uk/xapian/1.2.8/xapian-bindings-1.2.8.tar.gz",
            ]
        );
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let release = Release::new("1.2.8", "http://mirror/");
        assert_eq!(
            release.archive(Package::Core).url,
            "http://mirror/1.2.8/xapian-core-1.2.8.tar.gz"
        );
    }

    #[test]
    fn test_core_comes_first() {
        let release = Release::new("1.2.8", "http://mirror");
        let order: Vec<Package> = release.archives().iter().map(|a| a.package).collect();
        assert_eq!(order, vec![Package::Core, Package::Bindings]);
    }

    #[test]
    fn test_paths_inside_work_dir() {
        let archive = Release::new("1.2.8", "http://mirror").archive(Package::Bindings);
        let work = Path::new("/venv/packages");
        assert_eq!(
            archive.archive_path(work),
            PathBuf::from("/venv/packages/xapian-bindings-1.2.8.tar.gz")
        );
        assert_eq!(
            archive.source_dir(work),
            PathBuf::from("/venv/packages/xapian-bindings-1.2.8")
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Changing the version changes every URL, and each URL names it twice
        #[test]
        fn prop_version_flows_into_urls(
            major in 0u32..5,
            minor in 0u32..10,
            patch in 0u32..40,
        ) {
            let version = format!("{major}.{minor}.{patch}");
            let release = Release::new(&version, "http://mirror");
            for archive in release.archives() {
                prop_assert!(archive.url.matches(version.as_str()).count() >= 2);
                let expected_suffix = format!("/{}-{version}.tar.gz", archive.package.name());
                prop_assert!(archive.url.ends_with(&expected_suffix));
            }
        }
    }
}
