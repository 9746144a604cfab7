//! Archive fetch logic
//!
//! Downloads the core and bindings archives of a release into the working
//! directory. Any failure stops the fetch; nothing is retried unless the
//! built-in client was configured with retries.

use std::path::PathBuf;

use crate::core::environment::EnvironmentRoot;
use crate::core::release::{ArchiveSpec, Release};
use crate::error::BootstrapError;
use crate::infra::filesystem;
use crate::infra::transfer::Transfer;

/// An archive saved to disk
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    /// What was downloaded
    pub spec: ArchiveSpec,
    /// Where it was saved
    pub path: PathBuf,
}

/// Download both archives of `release` into `<root>/packages`
///
/// Archives are fetched in install order and the first failure is returned
/// without touching the second archive.
pub async fn fetch_archives(
    root: &EnvironmentRoot,
    release: &Release,
    transfer: &Transfer,
) -> Result<Vec<FetchedArchive>, BootstrapError> {
    let work_dir = root.work_dir();
    filesystem::create_dir_all(&work_dir)?;

    let mut fetched = Vec::new();
    for spec in release.archives() {
        let path = spec.archive_path(&work_dir);
        tracing::info!("Downloading {} with {}", spec.url, transfer.tool());

        transfer.fetch(&spec.url, &path).await?;

        fetched.push(FetchedArchive { spec, path });
    }

    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::release::Package;
    use crate::error::DownloadError;
    use crate::infra::transfer::TransferTool;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn root() -> (TempDir, EnvironmentRoot) {
        let temp = TempDir::new().unwrap();
        let root = EnvironmentRoot::from_value(Some(temp.path().to_path_buf())).unwrap();
        (temp, root)
    }

    #[tokio::test]
    async fn test_fetches_both_archives() {
        let server = MockServer::start().await;
        for name in ["xapian-core", "xapian-bindings"] {
            Mock::given(method("GET"))
                .and(path(format!("/1.2.8/{name}-1.2.8.tar.gz")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
                .mount(&server)
                .await;
        }

        let (temp, root) = root();
        let release = Release::new("1.2.8", &server.uri());
        let transfer = Transfer::select(Some(TransferTool::Builtin), 1).unwrap();

        let fetched = fetch_archives(&root, &release, &transfer).await.unwrap();

        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].spec.package, Package::Core);
        assert_eq!(
            fetched[0].path,
            temp.path().join("packages/xapian-core-1.2.8.tar.gz")
        );
        assert_eq!(
            std::fs::read(&fetched[1].path).unwrap(),
            b"xapian-bindings".to_vec()
        );
    }

    #[tokio::test]
    async fn test_first_failure_stops_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/9.9.9/xapian-core-9.9.9.tar.gz"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/9.9.9/xapian-bindings-9.9.9.tar.gz"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (temp, root) = root();
        let release = Release::new("9.9.9", &server.uri());
        let transfer = Transfer::select(Some(TransferTool::Builtin), 1).unwrap();

        let err = fetch_archives(&root, &release, &transfer).await.unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Download(DownloadError::NetworkError { .. })
        ));
        assert!(!temp.path().join("packages/xapian-core-9.9.9.tar.gz").exists());
    }
}
