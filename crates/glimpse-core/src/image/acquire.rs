//! Image acquisition from URLs and local files with a size ceiling.

use super::encode::sniff_media_type;
use super::ImageInput;
use crate::error::RecognitionError;
use crate::types::ImageRef;
use futures_util::stream::{Stream, StreamExt};
use std::fmt::Display;
use std::path::Path;

/// Media type assumed when neither the server nor the bytes say otherwise.
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Default payload ceiling: 20 MB.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Raw image bytes plus their media type.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Fetches image bytes and enforces the payload ceiling.
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ImageAcquirer {
    pub fn new(client: reqwest::Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }

    /// Acquire and base64-encode the referenced image.
    pub async fn acquire(&self, image: &ImageRef) -> Result<ImageInput, RecognitionError> {
        let fetched = match image {
            ImageRef::Url(url) => self.fetch_image(url).await?,
            ImageRef::Local(path) => self.read_local(path).await?,
        };
        tracing::debug!(
            "Acquired {} ({} bytes, {})",
            image,
            fetched.bytes.len(),
            fetched.content_type
        );
        Ok(ImageInput::from_bytes(&fetched.bytes, &fetched.content_type))
    }

    /// Download an image over HTTP(S).
    ///
    /// A declared `Content-Length` over the limit fails before the body is
    /// read; the streamed body is bounded as well. A non-success status is
    /// an answer from the server, so it is not treated as transient.
    pub async fn fetch_image(&self, url: &str) -> Result<FetchedImage, RecognitionError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RecognitionError::ImageDownloadFailed {
                source_ref: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RecognitionError::ImageDownloadRejected {
                source_ref: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(declared) = resp.content_length() {
            self.check_size(declared)?;
        }

        let header_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());

        let bytes = self.read_bounded(resp.bytes_stream(), url).await?;

        let content_type = match header_type {
            Some(t) if t.starts_with("image/") => t,
            Some(t) => {
                let sniffed = sniff_media_type(&bytes).unwrap_or(DEFAULT_MEDIA_TYPE);
                tracing::debug!("Non-image content type '{t}' for {url}, using {sniffed}");
                sniffed.to_string()
            }
            None => DEFAULT_MEDIA_TYPE.to_string(),
        };

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }

    /// Read an image from the local filesystem.
    pub async fn read_local(&self, path: &Path) -> Result<FetchedImage, RecognitionError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RecognitionError::ImageNotFound(path.to_path_buf())
            } else {
                RecognitionError::ImageDownloadFailed {
                    source_ref: path.display().to_string(),
                    message: format!("Cannot read metadata: {e}"),
                }
            }
        })?;
        if !metadata.is_file() {
            return Err(RecognitionError::ImageNotFound(path.to_path_buf()));
        }
        self.check_size(metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RecognitionError::ImageDownloadFailed {
                source_ref: path.display().to_string(),
                message: format!("Cannot read file: {e}"),
            })?;

        let content_type = sniff_media_type(&bytes)
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }

    /// Collect a body stream, failing as soon as the running total passes
    /// the ceiling. Servers may omit `Content-Length` or understate it.
    async fn read_bounded<S, B, E>(
        &self,
        stream: S,
        source_ref: &str,
    ) -> Result<Vec<u8>, RecognitionError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let mut stream = std::pin::pin!(stream);
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| RecognitionError::ImageDownloadFailed {
                source_ref: source_ref.to_string(),
                message: e.to_string(),
            })?;
            let chunk = chunk.as_ref();
            self.check_size((bytes.len() + chunk.len()) as u64)?;
            bytes.extend_from_slice(chunk);
        }
        Ok(bytes)
    }

    fn check_size(&self, size_bytes: u64) -> Result<(), RecognitionError> {
        if size_bytes > self.max_bytes {
            return Err(RecognitionError::ImageTooLarge {
                size_bytes,
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn acquirer(max_bytes: u64) -> ImageAcquirer {
        ImageAcquirer::new(reqwest::Client::new(), max_bytes)
    }

    fn temp_image(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[tokio::test]
    async fn test_read_local_sniffs_media_type() {
        let file = temp_image(&PNG_HEADER);
        let fetched = acquirer(1024).read_local(file.path()).await.unwrap();
        assert_eq!(fetched.content_type, "image/png");
        assert_eq!(fetched.bytes, PNG_HEADER);
    }

    #[tokio::test]
    async fn test_read_local_unknown_defaults_to_jpeg() {
        let file = temp_image(b"plain text, not an image");
        let fetched = acquirer(1024).read_local(file.path()).await.unwrap();
        assert_eq!(fetched.content_type, DEFAULT_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_read_local_missing_file() {
        let err = acquirer(1024)
            .read_local(Path::new("/nonexistent/path/ghost.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::ImageNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_read_local_too_large() {
        let file = temp_image(&[0u8; 64]);
        let err = acquirer(63).read_local(file.path()).await.unwrap_err();
        match err {
            RecognitionError::ImageTooLarge {
                size_bytes,
                max_bytes,
            } => {
                assert_eq!(size_bytes, 64);
                assert_eq!(max_bytes, 63);
            }
            other => panic!("Expected ImageTooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_acquire_encodes_local_file() {
        let file = temp_image(&PNG_HEADER);
        let input = acquirer(1024)
            .acquire(&ImageRef::Local(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(input.media_type, "image/png");
        assert_eq!(input.size_bytes, 8);
        assert!(input.data_url().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_fetch_uses_content_type_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.webp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"RIFF\0\0\0\0WEBPVP8 ".to_vec())
                    .insert_header("content-type", "image/webp; charset=binary"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/cat.webp", server.uri());
        let fetched = acquirer(1024).fetch_image(&url).await.unwrap();
        assert_eq!(fetched.content_type, "image/webp");
        assert_eq!(fetched.bytes.len(), 16);
    }

    #[tokio::test]
    async fn test_fetch_defaults_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let url = format!("{}/raw", server.uri());
        let fetched = acquirer(1024).fetch_image(&url).await.unwrap();
        assert_eq!(fetched.content_type, DEFAULT_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/missing.jpg", server.uri());
        let err = acquirer(1024).fetch_image(&url).await.unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::ImageDownloadRejected { status: 404, .. }
        ));
        assert!(err.to_string().contains("404"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
            .mount(&server)
            .await;

        let url = format!("{}/big.jpg", server.uri());
        let err = acquirer(1024).fetch_image(&url).await.unwrap_err();
        assert!(matches!(err, RecognitionError::ImageTooLarge { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_streamed_body_capped_without_length() {
        let chunks = vec![
            Ok::<_, std::io::Error>(vec![0u8; 600]),
            Ok(vec![0u8; 600]),
            Ok(vec![0u8; 600]),
        ];
        let err = acquirer(1024)
            .read_bounded(futures_util::stream::iter(chunks), "https://cdn.test/big.jpg")
            .await
            .unwrap_err();
        match err {
            RecognitionError::ImageTooLarge {
                size_bytes,
                max_bytes,
            } => {
                assert_eq!(size_bytes, 1200);
                assert_eq!(max_bytes, 1024);
            }
            other => panic!("Expected ImageTooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_streamed_body_error_is_download_failure() {
        let chunks = vec![
            Ok(vec![1u8; 16]),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];
        let err = acquirer(1024)
            .read_bounded(futures_util::stream::iter(chunks), "https://cdn.test/a.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::ImageDownloadFailed { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_streamed_body_within_limit() {
        let chunks = vec![Ok::<_, std::io::Error>(vec![1u8; 512]), Ok(vec![2u8; 512])];
        let bytes = acquirer(1024)
            .read_bounded(futures_util::stream::iter(chunks), "https://cdn.test/ok.jpg")
            .await
            .unwrap();
        assert_eq!(bytes.len(), 1024);
        assert_eq!(bytes[600], 2);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_retryable() {
        // Port 9 (discard) on loopback is essentially never listening.
        let err = acquirer(1024)
            .fetch_image("http://127.0.0.1:9/image.jpg")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
