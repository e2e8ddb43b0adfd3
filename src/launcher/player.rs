use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use anyhow::Result;

use crate::dependencies::descriptor::Dependency;
use crate::dependencies::outcome::Resolution;
use crate::launcher::options::PlaybackOptions;

/// Program to spawn for `dependency`: the resolved executable, or its bare name as a last resort.
pub fn program_for(resolution: &Resolution, dependency: Dependency) -> PathBuf {
    resolution
        .executable(dependency)
        .map(|path| path.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(dependency.name()))
}

/// Builds the player command with the resolved search path as its `PATH`, so the
/// player finds the stream downloader by name.
pub fn player_command(
    resolution: &Resolution,
    search_path: OsString,
    options: &PlaybackOptions,
    url: &str,
) -> Command {
    let mut cmd = Command::new(program_for(resolution, Dependency::Player));
    cmd.args(options.player_args(url))
        .env("PATH", search_path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

pub async fn play(resolution: &Resolution, options: &PlaybackOptions, url: &str) -> Result<()> {
    let search_path = resolution.search_path()?;
    let mut cmd = player_command(resolution, search_path, options, url);

    let status = cmd.status().await.map_err(|e| {
        log::error!("Failed to start {}: {}", Dependency::Player, e);
        anyhow::anyhow!("Failed to start {}: {}", Dependency::Player, e)
    })?;

    if !status.success() {
        log::error!("{} exited with {}", Dependency::Player, status);
        return Err(anyhow::anyhow!("{} exited with {}", Dependency::Player, status));
    }
    Ok(())
}
