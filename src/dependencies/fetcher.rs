use std::path::Path;
use tokio::fs;
use tokio::io::{self, AsyncWriteExt};
use anyhow::Result;

/// Streams `url` into `destination`, creating parent directories first.
///
/// A single unauthenticated GET with no retry and no integrity check. Any failure
/// is logged with the stage it happened in and returned; a partially written file
/// may be left behind.
pub async fn fetch(client: &reqwest::Client, url: &str, destination: &Path) -> Result<()> {
    log::debug!("Downloading from {} to {:?}", url, destination);

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await.map_err(|e| {
            log::error!("Failed to create directories {:?}: {}", parent, e);
            anyhow::anyhow!("Failed to create directories {:?}: {}", parent, e)
        })?;
    }

    let mut response = client.get(url).send().await.map_err(|e| {
        log::error!("Failed to send GET request to {}: {}", url, e);
        anyhow::anyhow!("Failed to send GET request to {}: {}", url, e)
    })?;

    if !response.status().is_success() {
        log::error!("Download failed for {}: HTTP status {}", url, response.status());
        return Err(anyhow::anyhow!("Download failed for {}: HTTP status {}", url, response.status()));
    }

    let mut file = fs::File::create(destination).await.map_err(|e| {
        log::error!("Failed to create file {:?}: {}", destination, e);
        anyhow::anyhow!("Failed to create file {:?}: {}", destination, e)
    })?;

    // Chunks go straight to disk, the body is never held in memory as a whole.
    while let Some(chunk) = response.chunk().await.map_err(|e| {
        log::error!("Failed to read chunk from response for {}: {}", url, e);
        anyhow::anyhow!("Failed to read chunk from response for {}: {}", url, e)
    })? {
        io::copy(&mut chunk.as_ref(), &mut file).await.map_err(|e| {
            log::error!("Failed to write chunk to file {:?}: {}", destination, e);
            anyhow::anyhow!("Failed to write chunk to file {:?}: {}", destination, e)
        })?;
    }

    file.flush().await.map_err(|e| {
        log::error!("Failed to write file {:?}: {}", destination, e);
        anyhow::anyhow!("Failed to write file {:?}: {}", destination, e)
    })?;

    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| destination.display().to_string());
    log::info!("Finished downloading {}", name);
    Ok(())
}
