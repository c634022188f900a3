//! Photo downloads.

use std::io::Read;
use std::time::Duration;

use crate::error::MirrorError;

/// Largest body accepted for one photo.
pub const MAX_PHOTO_BYTES: u64 = 64 * 1024 * 1024;

/// Retrieves the bytes behind a URL.
pub trait Downloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, MirrorError>;
}

/// Blocking `GET` over `ureq`.
pub struct HttpDownloader {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Self {
        Self::with_limit(timeout, MAX_PHOTO_BYTES)
    }

    /// Bodies longer than `max_bytes` are rejected, never truncated.
    pub fn with_limit(timeout: Duration, max_bytes: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            max_bytes,
        }
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(MirrorError::Network(format!("HTTP {code} for {url}")))
            }
            Err(ureq::Error::Transport(t)) => return Err(MirrorError::Network(t.to_string())),
        };

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| MirrorError::Network(format!("failed to read {url}: {e}")))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(MirrorError::Network(format!(
                "{url} exceeds limit of {} bytes",
                self.max_bytes
            )));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinker_core::testing::serve;

    #[test]
    fn fetch_returns_body_bytes() {
        let (url, server) = serve(vec![("200 OK", "JPEGDATA".to_string())]);
        let downloader = HttpDownloader::new(Duration::from_secs(5));
        let bytes = downloader.fetch(&format!("{url}/7365/1_a_z.jpg")).unwrap();
        assert_eq!(bytes, b"JPEGDATA");
        let requests = server.join().unwrap();
        assert!(requests[0].line.starts_with("GET /7365/1_a_z.jpg"));
    }

    #[test]
    fn fetch_maps_http_error_to_network() {
        let (url, server) = serve(vec![("404 Not Found", String::new())]);
        let downloader = HttpDownloader::new(Duration::from_secs(5));
        let err = downloader.fetch(&format!("{url}/gone.jpg")).unwrap_err();
        assert!(matches!(err, MirrorError::Network(ref m) if m.contains("404")), "got: {err}");
        server.join().unwrap();
    }

    #[test]
    fn body_at_limit_is_accepted() {
        let (url, server) = serve(vec![("200 OK", "12345678".to_string())]);
        let downloader = HttpDownloader::with_limit(Duration::from_secs(5), 8);
        assert_eq!(downloader.fetch(&format!("{url}/exact.jpg")).unwrap().len(), 8);
        server.join().unwrap();
    }

    #[test]
    fn oversized_body_is_rejected_not_truncated() {
        let (url, server) = serve(vec![("200 OK", "123456789".to_string())]);
        let downloader = HttpDownloader::with_limit(Duration::from_secs(5), 8);
        let err = downloader.fetch(&format!("{url}/huge.jpg")).unwrap_err();
        assert!(
            matches!(err, MirrorError::Network(ref m) if m.contains("exceeds limit")),
            "got: {err}"
        );
        server.join().unwrap();
    }
}
