//! Media downloading.
//!
//! A [`Downloader`] opens one URL through a [`MediaFetcher`] and streams the
//! body into a file with a collision-free name. Network problems are logged
//! and skipped; failing to create or write the file is fatal.

use crate::error::{Result, ScrapeError};
use chrono::Utc;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Name used when a URL has no usable last path segment
const FALLBACK_NAME: &str = "media";

/// Attempts at finding an unused file name before giving up
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Longest file name most filesystems accept, in bytes
const MAX_NAME_BYTES: usize = 255;

/// Room for `-` plus the decimal nanosecond stamp
const STAMP_BYTES: usize = 21;

/// Longer "extensions" are treated as part of the stem
const MAX_EXT_BYTES: usize = 16;

/// Per-download failures; always recoverable
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server answered HTTP {0}")]
    Status(u16),
}

/// A response body read chunk by chunk
pub trait MediaBody: Send + 'static {
    /// The next chunk, or `None` once the body is exhausted
    fn next_chunk(
        &mut self,
    ) -> impl Future<Output = std::result::Result<Option<Vec<u8>>, FetchError>> + Send;
}

/// Opens the body behind a URL
pub trait MediaFetcher: Send + Sync + 'static {
    type Body: MediaBody;

    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Self::Body, FetchError>> + Send;
}

/// [`MediaFetcher`] over plain HTTP GET with a request timeout
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> std::result::Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Streaming body of a successful HTTP response
pub struct HttpBody(reqwest::Response);

impl MediaBody for HttpBody {
    async fn next_chunk(&mut self) -> std::result::Result<Option<Vec<u8>>, FetchError> {
        self.0
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

impl MediaFetcher for HttpFetcher {
    type Body = HttpBody;

    async fn fetch(&self, url: &str) -> std::result::Result<HttpBody, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(HttpBody(response))
    }
}

/// Saves media into a directory, one file per call
pub struct Downloader<F> {
    fetcher: Arc<F>,
}

impl<F> Clone for Downloader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F: MediaFetcher> Downloader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Download `url` into `dir`.
    ///
    /// The body is streamed to disk as it arrives. Returns the written path,
    /// or `None` when the transfer failed and was skipped. Errors only for
    /// filesystem failures.
    pub async fn download(&self, url: &str, dir: &Path) -> Result<Option<PathBuf>> {
        let mut body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to download {}: {}", url, e);
                return Ok(None);
            }
        };

        let (path, mut file) = create_unique(dir, url).await?;
        let mut written = 0usize;

        loop {
            match body.next_chunk().await {
                Ok(Some(chunk)) => {
                    file.write_all(&chunk)
                        .await
                        .map_err(ScrapeError::fs("write", &path))?;
                    written += chunk.len();
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to download {}: {}", url, e);
                    drop(file);
                    if let Err(e) = fs::remove_file(&path).await {
                        warn!("Could not remove partial file {}: {}", path.display(), e);
                    }
                    return Ok(None);
                }
            }
        }
        file.flush().await.map_err(ScrapeError::fs("write", &path))?;

        debug!("Saved {} ({} bytes) to {}", url, written, path.display());
        Ok(Some(path))
    }
}

/// Create `<stem>-<nanos><ext>` in `dir`, bumping the stamp on collision
async fn create_unique(dir: &Path, url: &str) -> Result<(PathBuf, File)> {
    let (stem, ext) = name_parts(url);
    let mut stamp = now_nanos();

    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(format!("{stem}-{stamp}{ext}"));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        match file {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                stamp = now_nanos().max(stamp + 1);
            }
            Err(e) => return Err(ScrapeError::fs("create", &path)(e)),
        }
    }

    Err(ScrapeError::fs("create", &dir.join(format!("{stem}-*{ext}")))(
        ErrorKind::AlreadyExists.into(),
    ))
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Stem and extension for files saved from `url`, short enough that the
/// stamped name stays within [`MAX_NAME_BYTES`]
fn name_parts(url: &str) -> (String, String) {
    let basename = url_basename(url);
    let (stem, ext) = match split_name(&basename) {
        (stem, ext) if ext.len() <= MAX_EXT_BYTES => (stem, ext),
        _ => (basename.as_str(), ""),
    };
    let budget = MAX_NAME_BYTES - STAMP_BYTES - ext.len();
    (truncate_at_boundary(stem, budget).to_string(), ext.to_string())
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Last path segment of `url`, ignoring query and fragment
fn url_basename(url: &str) -> String {
    let segment = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    match segment {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => FALLBACK_NAME.to_string(),
    }
}

/// Split at the last dot; the extension keeps its dot
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}
