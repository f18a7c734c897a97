use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::utils::error::{ExtError, Result};
use crate::utils::validation::validate_url;

const DEFAULT_FILENAME: &str = "index.html";
const DEFAULT_SCHEME: &str = "https://";

/// Parses a download URL. Input without a `scheme://` prefix is taken as
/// https, so `example.com/a.txt` means `https://example.com/a.txt`.
pub fn parse_download_url(url: &str) -> Result<Url> {
    if url.is_empty() || url.contains("://") {
        validate_url("url", url)
    } else {
        validate_url("url", &format!("{}{}", DEFAULT_SCHEME, url))
    }
}

/// File name a download of `url` is saved under when no destination is
/// given: whatever follows the last `/` of the path, or `index.html` when
/// that is empty.
pub fn download_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Downloads `url` to `dest`, or to [`download_name`] in the working
/// directory. Returns the path written.
///
/// A non-success status is an error and nothing is written. A transfer
/// that fails midway removes the partial file.
pub async fn http_get(url: &str, dest: Option<&Path>, timeout: Duration) -> Result<PathBuf> {
    let url = parse_download_url(url)?;
    let dest = match dest {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(download_name(&url)),
    };

    let client = Client::builder().timeout(timeout).build()?;
    tracing::debug!("GET {} -> {}", url, dest.display());
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut file = File::create(&dest).await?;
    match write_body(response, &mut file).await {
        Ok(bytes) => {
            tracing::info!("downloaded {} bytes from {}", bytes, url);
            Ok(dest)
        }
        Err(e) => {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(&dest).await {
                tracing::warn!("could not remove partial download {}: {}", dest.display(), remove_err);
            }
            Err(e)
        }
    }
}

async fn write_body(mut response: reqwest::Response, file: &mut File) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
