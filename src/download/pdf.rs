//! Streaming PDF bodies to disk.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::filename::output_path;
use crate::http::{FetchError, HttpClient};
use crate::model::DownloadTarget;

/// Writes PDF responses to an output directory without buffering whole bodies.
#[derive(Debug, Clone)]
pub struct PdfDownloader {
    client: HttpClient,
    chunk_size: usize,
}

impl PdfDownloader {
    /// Creates a downloader writing through a buffer of `chunk_size` bytes.
    #[must_use]
    pub fn new(client: HttpClient, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Fetches `target.pdf_url` and streams it to `output_dir/target.filename`.
    ///
    /// Empty body chunks are skipped. A partially written file is removed if
    /// the stream fails midway.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the request fails, the status is not 2xx,
    /// the file name would leave `output_dir`, or writing to disk fails.
    #[instrument(skip(self, identity), fields(url = %target.pdf_url, file = %target.filename))]
    pub async fn download(
        &self,
        target: &DownloadTarget,
        identity: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let url = target.pdf_url.as_str();
        let file_path = output_path(output_dir, &target.filename).ok_or_else(|| {
            FetchError::io(
                output_dir.join(&target.filename),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file name is not a single path segment",
                ),
            )
        })?;

        let response = self.client.fetch(url, identity).await?;

        let file = File::create(&file_path)
            .await
            .map_err(|e| FetchError::io(file_path.clone(), e))?;

        match stream_to_file(file, response, url, &file_path, self.chunk_size).await {
            Ok(bytes) => {
                info!(path = %file_path.display(), bytes, "pdf saved");
                Ok(file_path)
            }
            Err(error) => {
                debug!(path = %file_path.display(), "removing partial file after error");
                let _ = tokio::fs::remove_file(&file_path).await;
                Err(error)
            }
        }
    }
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    chunk_size: usize,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::with_capacity(chunk_size, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;
        if chunk.is_empty() {
            continue;
        }

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n";

    fn target(server: &MockServer, route: &str, title: &str) -> DownloadTarget {
        let url = Url::parse(&format!("{}{route}", server.uri())).unwrap();
        DownloadTarget::new(url, title)
    }

    #[tokio::test]
    async fn test_download_writes_body_verbatim() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/12345.full.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES.to_vec()))
            .mount(&mock_server)
            .await;
        let temp_dir = TempDir::new().unwrap();

        let downloader = PdfDownloader::new(HttpClient::new(), 1024);
        let target = target(&mock_server, "/content/12345.full.pdf", "Article 1");
        let saved = downloader
            .download(&target, "agent", temp_dir.path())
            .await
            .unwrap();

        assert_eq!(saved, temp_dir.path().join("Article 1.pdf"));
        assert_eq!(std::fs::read(&saved).unwrap(), PDF_BYTES);
    }

    #[tokio::test]
    async fn test_download_large_body_with_small_chunks() {
        let mock_server = MockServer::start().await;
        let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        Mock::given(method("GET"))
            .and(path("/big.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&mock_server)
            .await;
        let temp_dir = TempDir::new().unwrap();

        let downloader = PdfDownloader::new(HttpClient::new(), 16);
        let target = target(&mock_server, "/big.pdf", "Big");
        let saved = downloader
            .download(&target, "agent", temp_dir.path())
            .await
            .unwrap();

        assert_eq!(std::fs::read(saved).unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_404_creates_no_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        let temp_dir = TempDir::new().unwrap();

        let downloader = PdfDownloader::new(HttpClient::new(), 1024);
        let target = target(&mock_server, "/gone.pdf", "Gone");
        let result = downloader.download(&target, "agent", temp_dir.path()).await;

        assert!(matches!(result, Err(FetchError::HttpStatus { status: 404, .. })));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_missing_output_dir_is_io_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES.to_vec()))
            .mount(&mock_server)
            .await;
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let downloader = PdfDownloader::new(HttpClient::new(), 1024);
        let target = target(&mock_server, "/a.pdf", "A");
        let result = downloader.download(&target, "agent", &missing).await;

        assert!(matches!(result, Err(FetchError::Io { .. })));
    }
}
