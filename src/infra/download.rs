//! Built-in HTTP download
//!
//! Streams a URL to disk with reqwest, reporting the size and SHA-256 of
//! what was written. Used when neither curl nor wget is available, or when
//! forced with `XAPIAN_TRANSFER=builtin`.

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::error::DownloadError;

/// Download result containing file path and metadata
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA256 checksum of the downloaded content
    pub checksum: String,
}

/// Download manager for fetching files over HTTP
#[derive(Debug, Clone)]
pub struct DownloadManager {
    client: reqwest::Client,
    /// Total attempts per URL (1 means no retry)
    max_attempts: u32,
    /// Base delay between attempts (in milliseconds), doubled each time
    base_delay_ms: u64,
}

impl DownloadManager {
    /// Create a download manager that tries each URL once
    pub fn new() -> Self {
        Self::with_config(defaults::DOWNLOAD_ATTEMPTS, 1000)
    }

    /// Create a download manager with custom settings
    pub fn with_config(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(600))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    /// Get max attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Download `url` to `dest`
    ///
    /// A partially written file is removed when the last attempt fails.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<DownloadResult, DownloadError> {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_attempts {
            attempts += 1;

            match self.download_once(url, dest).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::debug!("Attempt {attempts} for {url} failed: {e}");
                    last_error = Some(e);

                    if attempts < self.max_attempts {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
            }
        }

        let _ = tokio::fs::remove_file(dest).await;

        match last_error {
            Some(e) if self.max_attempts == 1 => Err(e),
            _ => Err(DownloadError::MaxRetriesExceeded {
                url: url.to_string(),
                retries: self.max_attempts,
            }),
        }
    }

    async fn download_once(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<DownloadResult, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::IoError {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                })?;

            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            checksum: hex::encode(hasher.finalize()),
        })
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_does_not_retry() {
        assert_eq!(DownloadManager::new().max_attempts(), 1);
        assert_eq!(DownloadManager::with_config(0, 10).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_download_success() {
        let mock_server = MockServer::start().await;
        let content = b"archive bytes";

        Mock::given(method("GET"))
            .and(path("/1.2.8/xapian-core-1.2.8.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("xapian-core-1.2.8.tar.gz");
        let result = DownloadManager::new()
            .download(
                &format!("{}/1.2.8/xapian-core-1.2.8.tar.gz", mock_server.uri()),
                &dest,
            )
            .await
            .unwrap();

        assert_eq!(result.size, content.len() as u64);
        assert_eq!(result.checksum, hex::encode(Sha256::digest(content)));
        assert_eq!(std::fs::read(&dest).unwrap(), content);
    }

    #[tokio::test]
    async fn test_http_error_is_fatal_without_retry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.tar.gz"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.tar.gz");
        let err = DownloadManager::new()
            .download(&format!("{}/missing.tar.gz", mock_server.uri()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::NetworkError { .. }));
        assert!(err.to_string().contains("404"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_configured_retries_recover() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky.tar.gz"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/flaky.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let result = DownloadManager::with_config(2, 10)
            .download(
                &format!("{}/flaky.tar.gz", mock_server.uri()),
                &temp.path().join("flaky.tar.gz"),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/down.tar.gz"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = DownloadManager::with_config(3, 10)
            .download(
                &format!("{}/down.tar.gz", mock_server.uri()),
                &temp.path().join("down.tar.gz"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DownloadError::MaxRetriesExceeded { retries: 3, .. }
        ));
    }
}
