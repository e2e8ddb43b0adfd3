use std::fmt;
use std::path::{Path, PathBuf};

use crate::dependencies::utils::executable_file_name;

/// Windows-only build; other platforms have no default mpv source.
pub const MPV_ARCHIVE_URL: &str =
    "https://nightly.link/mpv-player/mpv/workflows/build/master/mpv-x86_64-windows-msvc.zip";

/// Console helper shipped next to `mpv.exe` in the Windows builds. Not needed to play anything.
pub const MPV_CONSOLE_WRAPPER: &str = "mpv.com";

pub fn get_latest_yt_dlp_url() -> String {
    let asset = if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else if cfg!(target_os = "linux") {
        "yt-dlp_linux"
    } else if cfg!(target_os = "macos") {
        "yt-dlp_macos"
    } else {
        "yt-dlp" // fallback
    };

    format!("https://github.com/yt-dlp/yt-dlp/releases/latest/download/{}", asset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dependency {
    StreamDownloader,
    Player,
}

impl Dependency {
    pub fn name(&self) -> &'static str {
        match self {
            Dependency::StreamDownloader => "yt-dlp",
            Dependency::Player => "mpv",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packaging {
    /// The download is the executable itself.
    Executable,
    /// The download is a zip archive unpacked into the install directory.
    ZipArchive {
        archive_name: String,
        skipped_entries: Vec<String>,
    },
}

/// Everything needed to find or provision one dependency.
#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    pub dependency: Dependency,
    /// Directory under the install root, e.g. `mpv`.
    pub install_subdir: PathBuf,
    pub executable_name: String,
    /// Name looked up on the system search path.
    pub lookup_name: String,
    /// `None` when nothing can be downloaded for the current platform.
    pub source_url: Option<String>,
    pub packaging: Packaging,
}

impl DependencyDescriptor {
    pub fn install_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join(&self.install_subdir)
    }

    pub fn executable_path(&self, install_root: &Path) -> PathBuf {
        self.install_dir(install_root).join(&self.executable_name)
    }

    /// Where the fetched payload lands: the executable itself, or the archive to unpack.
    pub fn download_path(&self, install_root: &Path) -> PathBuf {
        match &self.packaging {
            Packaging::Executable => self.executable_path(install_root),
            Packaging::ZipArchive { archive_name, .. } => {
                self.install_dir(install_root).join(archive_name)
            }
        }
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }
}

pub fn yt_dlp_descriptor() -> DependencyDescriptor {
    let executable_name = executable_file_name("yt-dlp");
    DependencyDescriptor {
        dependency: Dependency::StreamDownloader,
        install_subdir: PathBuf::from("yt-dlp"),
        lookup_name: executable_name.clone(),
        executable_name,
        source_url: Some(get_latest_yt_dlp_url()),
        packaging: Packaging::Executable,
    }
}

pub fn mpv_descriptor() -> DependencyDescriptor {
    let executable_name = executable_file_name("mpv");
    DependencyDescriptor {
        dependency: Dependency::Player,
        install_subdir: PathBuf::from("mpv"),
        lookup_name: executable_name.clone(),
        executable_name,
        source_url: cfg!(target_os = "windows").then(|| MPV_ARCHIVE_URL.to_string()),
        packaging: Packaging::ZipArchive {
            archive_name: "mpv.zip".to_string(),
            skipped_entries: vec![MPV_CONSOLE_WRAPPER.to_string()],
        },
    }
}

/// The fixed set of tools the launcher needs, in resolution order.
pub fn default_descriptors() -> Vec<DependencyDescriptor> {
    vec![yt_dlp_descriptor(), mpv_descriptor()]
}
