use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::dependencies::descriptor::Dependency;
use crate::dependencies::utils::executable_dir;

/// What one resolution pass did for a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Found under the install root, nothing fetched.
    AlreadyLocal(PathBuf),
    /// Found on the startup search path; the install root was left alone.
    OnSystemPath(PathBuf),
    FreshlyInstalled(PathBuf),
    Failed(String),
}

impl InstallOutcome {
    pub fn executable(&self) -> Option<&Path> {
        match self {
            InstallOutcome::AlreadyLocal(path)
            | InstallOutcome::OnSystemPath(path)
            | InstallOutcome::FreshlyInstalled(path) => Some(path),
            InstallOutcome::Failed(_) => None,
        }
    }

    /// Directory that has to be prepended to the search path for the tool to resolve by name.
    pub fn published_dir(&self) -> Option<PathBuf> {
        match self {
            InstallOutcome::AlreadyLocal(path) | InstallOutcome::FreshlyInstalled(path) => {
                executable_dir(path)
            }
            InstallOutcome::OnSystemPath(_) | InstallOutcome::Failed(_) => None,
        }
    }

    #[cfg(test)]
    pub fn is_failed(&self) -> bool {
        matches!(self, InstallOutcome::Failed(_))
    }
}

/// Result of a resolution pass: one outcome per dependency plus the search path read at startup.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    outcomes: BTreeMap<Dependency, InstallOutcome>,
    startup_search_path: Option<OsString>,
}

impl Resolution {
    pub fn new(startup_search_path: Option<OsString>) -> Self {
        Self {
            outcomes: BTreeMap::new(),
            startup_search_path,
        }
    }

    pub fn record(&mut self, dependency: Dependency, outcome: InstallOutcome) {
        self.outcomes.insert(dependency, outcome);
    }

    pub fn outcome(&self, dependency: Dependency) -> Option<&InstallOutcome> {
        self.outcomes.get(&dependency)
    }

    #[cfg(test)]
    pub fn outcomes(&self) -> impl Iterator<Item = (Dependency, &InstallOutcome)> {
        self.outcomes.iter().map(|(dependency, outcome)| (*dependency, outcome))
    }

    pub fn executable(&self, dependency: Dependency) -> Option<&Path> {
        self.outcome(dependency).and_then(InstallOutcome::executable)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Dependency, &str)> {
        self.outcomes.iter().filter_map(|(dependency, outcome)| match outcome {
            InstallOutcome::Failed(reason) => Some((*dependency, reason.as_str())),
            _ => None,
        })
    }

    /// Directories of locally installed tools, each listed once, in dependency order.
    pub fn published_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in self.outcomes.values().filter_map(InstallOutcome::published_dir) {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    /// The startup search path with every published directory prepended.
    ///
    /// Independent of the order installation tasks finished in.
    pub fn search_path(&self) -> Result<OsString> {
        let startup = self
            .startup_search_path
            .as_deref()
            .map(|path| env::split_paths(path).collect::<Vec<_>>())
            .unwrap_or_default();

        let joined = env::join_paths(self.published_dirs().into_iter().chain(startup))?;
        Ok(joined)
    }
}
