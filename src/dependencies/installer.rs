use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::dependencies::descriptor::{DependencyDescriptor, Packaging};
use crate::dependencies::extractor::extract_archive;
use crate::dependencies::fetcher::fetch;

/// Downloads (and unpacks, for archives) one dependency under `install_root`.
/// Returns the path the executable is expected at.
pub async fn install(
    client: &reqwest::Client,
    descriptor: &DependencyDescriptor,
    install_root: &Path,
) -> Result<PathBuf> {
    let executable_path = descriptor.executable_path(install_root);
    let download_path = descriptor.download_path(install_root);

    let source_url = descriptor.source_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("No download available for {} on this platform", descriptor.dependency)
    })?;

    log::info!("Downloading {}, please wait...", descriptor.dependency);
    fetch(client, source_url, &download_path).await?;

    match &descriptor.packaging {
        Packaging::Executable => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = tokio::fs::metadata(&executable_path).await?.permissions();
                perms.set_mode(0o755); // Make executable
                tokio::fs::set_permissions(&executable_path, perms).await?;
            }
        }
        Packaging::ZipArchive { skipped_entries, .. } => {
            log::info!("Extracting {}, please wait...", descriptor.dependency);
            let install_dir = descriptor.install_dir(install_root);
            let skipped_entries = skipped_entries.clone();
            tokio::task::spawn_blocking(move || {
                extract_archive(&download_path, &install_dir, &skipped_entries)
            })
            .await??;
        }
    }

    Ok(executable_path)
}
