use std::path::PathBuf;
use anyhow::Result;

use crate::dependencies::descriptor::{Dependency, DependencyDescriptor, default_descriptors};

pub const HOME_VAR: &str = "MPV_LAUNCHER_HOME";
pub const YT_DLP_URL_VAR: &str = "YTDLP_DOWNLOAD_URL";
pub const MPV_URL_VAR: &str = "MPV_DOWNLOAD_URL";

/// Directory the running executable lives in. Tools are installed under it by default.
pub fn program_dir() -> Result<PathBuf> {
    let current_exe = std::env::current_exe()?;
    current_exe
        .parent()
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Executable path {:?} has no parent directory", current_exe))
}

pub fn find_dotenv() -> Result<Option<PathBuf>> {
    // 1. Check directory where the executable is located
    if let Ok(exe_dir) = program_dir() {
        let exe_dir_dotenv = exe_dir.join(".env");
        if exe_dir_dotenv.exists() {
            return Ok(Some(exe_dir_dotenv));
        }
    }

    // 2. Check current working directory (for cargo run compatibility)
    let current_dir = std::env::current_dir()?;
    let current_dotenv = current_dir.join(".env");
    if current_dotenv.exists() {
        return Ok(Some(current_dotenv));
    }

    Ok(None)
}

pub fn load_environment() -> Result<()> {
    match find_dotenv()? {
        Some(path) => {
            dotenv::from_path(&path)?;
            log::info!("Loaded environment variables from {:?}", path);
        },
        None => {
            log::warn!("No .env file found. Using system environment variables.");
        }
    }
    Ok(())
}

/// Launcher settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Overrides the executable's directory as the install root.
    pub install_root: Option<PathBuf>,
    pub yt_dlp_url: Option<String>,
    pub mpv_url: Option<String>,
}

impl LauncherConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        Self {
            install_root: read(HOME_VAR).map(PathBuf::from),
            yt_dlp_url: read(YT_DLP_URL_VAR),
            mpv_url: read(MPV_URL_VAR),
        }
    }

    /// The dependency table with configured source overrides applied.
    pub fn descriptors(&self) -> Vec<DependencyDescriptor> {
        default_descriptors()
            .into_iter()
            .map(|descriptor| {
                let source_override = match descriptor.dependency {
                    Dependency::StreamDownloader => self.yt_dlp_url.clone(),
                    Dependency::Player => self.mpv_url.clone(),
                };
                match source_override {
                    Some(url) => descriptor.with_source_url(url),
                    None => descriptor,
                }
            })
            .collect()
    }
}
