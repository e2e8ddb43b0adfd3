use std::path::{Path, PathBuf};

pub fn is_executable_present(path: &Path) -> bool {
    path.is_file() && is_executable(path)
}

pub fn is_executable(path: &Path) -> bool {
    #[cfg(windows)]
    {
        path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("exe"))
    }
    #[cfg(not(windows))]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).map_or(false, |metadata| {
            let permissions = metadata.permissions();
            permissions.mode() & 0o111 != 0
        })
    }
}

/// File name of an executable on the current platform (`yt-dlp` -> `yt-dlp.exe` on Windows).
pub fn executable_file_name(stem: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", stem)
    } else {
        stem.to_string()
    }
}

/// Directory holding `executable`, used when publishing a tool to the search path.
pub fn executable_dir(executable: &Path) -> Option<PathBuf> {
    executable
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
