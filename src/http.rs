//! Shared HTTP client facade
//!
//! One connection-pooled [`reqwest::Client`] serves every worker. The facade fails
//! fast: a non-2xx answer becomes [`Error::Http`], a transport failure becomes
//! [`Error::Network`], and nothing is retried here.

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Cloneable handle to the pooled client (clones share the pool)
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build the client from the pool bound, timeout and user agent in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {}", e),
            key: None,
        })?;
        Ok(Self { client })
    }

    /// Validate that `url` is an absolute http(s) URL
    pub fn parse_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(parsed)
    }

    /// GET `url` and return the whole body
    pub async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        let body = response.bytes().await.map_err(|e| network(url, e))?;
        Ok(body.to_vec())
    }

    /// GET `url` and decode the body as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        response.text().await.map_err(|e| network(url, e))
    }

    /// GET `url` and stream the body into `dest`, overwriting it
    ///
    /// The body is written to a `.part` sibling that is renamed onto `dest` once the
    /// whole body is flushed, so `dest` only ever holds a complete document. Nothing is
    /// created for a non-2xx answer. The `.part` file is removed when the body fails
    /// or the future is dropped mid-stream. Returns the number of bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.send(url).await?;

        let partial = PartialFile::new(dest);
        let mut file = tokio::fs::File::create(partial.path())
            .await
            .map_err(|e| Error::filesystem(partial.path(), e))?;
        let written = write_body(&mut response, &mut file, url, partial.path()).await?;
        drop(file);

        partial.commit(dest).await?;
        tracing::trace!(url, path = %dest.display(), bytes = written, "Downloaded file");
        Ok(written)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let parsed = Self::parse_url(url)?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

async fn write_body(
    response: &mut reqwest::Response,
    file: &mut tokio::fs::File,
    url: &str,
    dest: &Path,
) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| network(url, e))? {
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::filesystem(dest, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| Error::filesystem(dest, e))?;
    Ok(written)
}

/// In-progress download target; removed on drop unless committed
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(dest: &Path) -> Self {
        let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".part");
        Self {
            path: dest.with_file_name(name),
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn commit(mut self, dest: &Path) -> Result<()> {
        tokio::fs::rename(&self.path, dest)
            .await
            .map_err(|e| Error::filesystem(dest, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Drop cannot await
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::debug!(path = %self.path.display(), error = %e, "Could not remove partial download");
        }
    }
}

fn network(url: &str, source: reqwest::Error) -> Error {
    Error::Network {
        url: url.to_string(),
        source,
    }
}
