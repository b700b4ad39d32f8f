use crate::core::error::{Error, Result};
use crate::core::VideoRecord;
use crate::utils::output_filename;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Upper bound on the delay between attempts.
const MAX_BACKOFF_SECS: u64 = 60;

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2_u64.saturating_pow(attempt).min(MAX_BACKOFF_SECS))
}

/// Fetches the selected variant of a record to disk.
pub struct Downloader {
    client: reqwest::Client,
    pub retries: u32,
}

impl Downloader {
    pub fn new(user_agent: &str, timeout: Duration, retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| Error::Download(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retries: retries.max(1),
        })
    }

    /// Download into `output_dir` and return the written path. `from_library` picks
    /// the `saved-video-` file prefix.
    pub async fn download(
        &self,
        record: &VideoRecord,
        output_dir: &Path,
        from_library: bool,
    ) -> Result<PathBuf> {
        let variant = record
            .selected_variant
            .as_ref()
            .ok_or_else(|| Error::Download(format!("video {} has no playable variant", record.id)))?;

        let output_path = output_dir.join(output_filename(record, from_library));
        info!("Downloading video {} ({})", record.id, record.quality_label());
        info!("URL: {}", variant.link);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let request = self.client.get(&variant.link).header("Accept", "*/*");
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempt >= self.retries {
                        return Err(Error::Download(e.to_string()));
                    }
                    warn!("Request failed (attempt {}): {}", attempt, e);
                    tokio::time::sleep(backoff(attempt)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                if let Err(e) = self.write_body(response, &output_path).await {
                    // Leave no truncated file behind.
                    if let Err(remove_err) = tokio::fs::remove_file(&output_path).await {
                        warn!("Could not remove partial {}: {}", output_path.display(), remove_err);
                    }
                    return Err(e);
                }
                return Ok(output_path);
            } else if status.is_server_error() && attempt < self.retries {
                let delay = backoff(attempt);
                warn!("HTTP {} (attempt {}), retrying in {:?}...", status, attempt, delay);
                tokio::time::sleep(delay).await;
                continue;
            } else {
                return Err(Error::Download(format!(
                    "giving up after {} attempts: HTTP {}",
                    attempt, status
                )));
            }
        }
    }

    async fn write_body(&self, response: reqwest::Response, output_path: &Path) -> Result<()> {
        let total = response.content_length();
        let mut written: u64 = 0;
        let mut file = File::create(output_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Download(e.to_string()))?;
            written += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if let Some(total) = total {
            if written != total {
                warn!("Expected {} bytes, wrote {}", total, written);
            }
        }
        info!("Downloaded {} bytes to {}", written, output_path.display());
        Ok(())
    }
}
