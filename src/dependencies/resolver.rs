use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{LauncherConfig, program_dir};
use crate::dependencies::descriptor::{Dependency, DependencyDescriptor};
use crate::dependencies::installer::install;
use crate::dependencies::outcome::{InstallOutcome, Resolution};
use crate::dependencies::utils::is_executable_present;
use crate::utils::task_manager::TaskManager;

/// Makes sure every dependency is resolvable before the player is launched.
///
/// Each dependency is looked up under the install root first, then on the search
/// path read at construction. Whatever is still missing is installed, all missing
/// dependencies concurrently, and `resolve` returns once every install finished.
/// There is no timeout: a stalled download stalls the pass.
pub struct Resolver {
    client: reqwest::Client,
    install_root: Option<PathBuf>,
    descriptors: Vec<DependencyDescriptor>,
    search_path: Option<OsString>,
}

impl Resolver {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            install_root: config.install_root.clone(),
            descriptors: config.descriptors(),
            search_path: env::var_os("PATH"),
        }
    }

    #[cfg(test)]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[cfg(test)]
    pub fn with_descriptors(mut self, descriptors: Vec<DependencyDescriptor>) -> Self {
        self.descriptors = descriptors;
        self
    }

    #[cfg(test)]
    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    /// The configured root, or the directory holding the running executable.
    pub fn install_root(&self) -> Result<PathBuf> {
        match &self.install_root {
            Some(root) => Ok(root.clone()),
            None => program_dir().map_err(|e| {
                log::error!("Failed to get current executable path: {}", e);
                e
            }),
        }
    }

    /// Runs one resolution pass.
    ///
    /// Only failing to locate the install root is an error. Failed installs are
    /// logged and reported as [`InstallOutcome::Failed`] in the returned resolution.
    pub async fn resolve(&self) -> Result<Resolution> {
        let install_root = self.install_root()?;
        let cwd = env::current_dir().unwrap_or_else(|_| install_root.clone());
        let mut resolution = Resolution::new(self.search_path.clone());
        let mut tasks = TaskManager::new();
        let mut pending = Vec::new();

        for descriptor in &self.descriptors {
            let dependency = descriptor.dependency;
            let local_path = descriptor.executable_path(&install_root);

            if is_executable_present(&local_path) {
                log::info!("{} already exists at {:?}", dependency, local_path);
                resolution.record(dependency, InstallOutcome::AlreadyLocal(local_path));
                continue;
            }

            let search_path = self.search_path.as_deref();
            if let Some(system_path) = find_on_search_path(&descriptor.lookup_name, search_path, &cwd) {
                log::info!("{} found on the search path at {:?}", dependency, system_path);
                resolution.record(dependency, InstallOutcome::OnSystemPath(system_path));
                continue;
            }

            if descriptor.source_url.is_none() {
                log::warn!("{} not found and no download is available for this platform", dependency);
                resolution.record(
                    dependency,
                    InstallOutcome::Failed("no download available for this platform".to_string()),
                );
                continue;
            }

            log::info!("{} not found, downloading latest version...", dependency);
            let client = self.client.clone();
            let descriptor = descriptor.clone();
            let install_root = install_root.clone();
            pending.push(dependency);
            tasks.spawn(async move {
                let outcome = install_one(&client, &descriptor, &install_root).await;
                (descriptor.dependency, outcome)
            });
        }

        for (dependency, outcome) in tasks.join_all().await {
            resolution.record(dependency, outcome);
        }
        for dependency in pending {
            if resolution.outcome(dependency).is_none() {
                resolution.record(
                    dependency,
                    InstallOutcome::Failed("installation task did not complete".to_string()),
                );
            }
        }

        Ok(resolution)
    }
}

/// Relative entries of `search_path` are resolved against `cwd`.
fn find_on_search_path(lookup_name: &str, search_path: Option<&OsStr>, cwd: &Path) -> Option<PathBuf> {
    let anchored = env::join_paths(env::split_paths(search_path?).map(|dir| cwd.join(dir))).ok()?;
    which::which_in(lookup_name, Some(anchored), cwd).ok()
}

async fn install_one(
    client: &reqwest::Client,
    descriptor: &DependencyDescriptor,
    install_root: &Path,
) -> InstallOutcome {
    let dependency: Dependency = descriptor.dependency;
    match install(client, descriptor, install_root).await {
        Ok(executable) if is_executable_present(&executable) => {
            log::info!("{} installed at {:?}", dependency, executable);
            InstallOutcome::FreshlyInstalled(executable)
        }
        Ok(executable) => {
            log::error!("{} was not found at {:?} after installation", dependency, executable);
            InstallOutcome::Failed(format!("{:?} missing after installation", executable))
        }
        Err(e) => {
            log::error!("Failed to install {}: {}", dependency, e);
            InstallOutcome::Failed(e.to_string())
        }
    }
}
