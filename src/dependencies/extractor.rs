use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use zip::ZipArchive;

/// An archive entry that would land outside the extraction directory (zip-slip).
#[derive(Debug, thiserror::Error)]
#[error("{}: illegal file path", .0.display())]
pub struct IllegalFilePath(pub PathBuf);

/// Lexically normalizes `path`: drops `.` and folds `..` into its parent.
/// Never touches the filesystem, so symlinks are not followed.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Resolves `entry_name` under `target_dir`, rejecting anything that does not stay strictly inside it.
pub fn enclosed_destination(target_dir: &Path, entry_name: &str) -> Result<PathBuf, IllegalFilePath> {
    let root = clean_path(target_dir);
    let destination = clean_path(&target_dir.join(entry_name));
    if destination == root || !destination.starts_with(&root) {
        return Err(IllegalFilePath(destination));
    }
    Ok(destination)
}

/// Unpacks the zip at `archive_path` into `target_dir`, then deletes the archive.
///
/// Entries are processed in archive order. The first entry escaping `target_dir`
/// aborts with [`IllegalFilePath`]; entries extracted before it stay on disk.
/// Entries whose file name is listed in `skipped_entries` are ignored.
pub fn extract_archive(archive_path: &Path, target_dir: &Path, skipped_entries: &[String]) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| {
        anyhow::anyhow!("Failed to open archive {:?}: {}", archive_path, e)
    })?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let destination = enclosed_destination(target_dir, entry.name())?;

        let skipped = destination
            .file_name()
            .is_some_and(|name| skipped_entries.iter().any(|skip| name == skip.as_str()));
        if skipped {
            log::debug!("Skipping {:?}", destination);
            continue;
        }

        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
            continue;
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            if let Some(mode) = entry.unix_mode() {
                options.mode(mode & 0o7777);
            }
        }

        let mut outfile = options.open(&destination)?;
        io::copy(&mut entry, &mut outfile)?;
        log::trace!("Extracted {:?}", destination);
    }

    // Release the handle first, Windows refuses to delete an open file.
    drop(archive);
    fs::remove_file(archive_path).map_err(|e| {
        anyhow::anyhow!("Failed to remove archive {:?}: {}", archive_path, e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::test_utils::write_zip;
    use tempfile::TempDir;

    fn skip_console_wrapper() -> Vec<String> {
        vec!["mpv.com".to_string()]
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(clean_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(clean_path(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(clean_path(Path::new("a/../..")), PathBuf::from(".."));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_path_stops_at_root() {
        assert_eq!(clean_path(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_enclosed_destination() {
        let target = Path::new("install/mpv");
        assert_eq!(
            enclosed_destination(target, "doc/readme.txt").unwrap(),
            PathBuf::from("install/mpv/doc/readme.txt")
        );
        assert_eq!(
            enclosed_destination(target, "doc/../mpv.exe").unwrap(),
            PathBuf::from("install/mpv/mpv.exe")
        );
        assert!(enclosed_destination(target, "../evil.txt").is_err());
        assert!(enclosed_destination(target, "doc/../../evil.txt").is_err());
        assert!(enclosed_destination(target, "../mpv-evil/x").is_err());
        assert!(enclosed_destination(target, "./").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_enclosed_destination_rejects_absolute_names() {
        assert!(enclosed_destination(Path::new("/opt/mpv"), "/etc/passwd").is_err());
    }

    #[test]
    fn test_illegal_path_message() {
        let err = enclosed_destination(Path::new("mpv"), "../evil.txt").unwrap_err();
        assert!(err.to_string().ends_with("illegal file path"), "{err}");
    }

    #[test]
    fn test_extracts_files_and_directories_then_removes_archive() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("mpv");
        let archive = target.join("mpv.zip");
        write_zip(
            &archive,
            &[
                ("doc/", None),
                ("doc/manual.txt", Some("manual")),
                ("mpv.exe", Some("player")),
            ],
        );

        extract_archive(&archive, &target, &skip_console_wrapper()).unwrap();

        assert!(target.join("doc").is_dir());
        assert_eq!(fs::read(target.join("doc").join("manual.txt")).unwrap(), b"manual");
        assert_eq!(fs::read(target.join("mpv.exe")).unwrap(), b"player");
        assert!(!archive.exists());
    }

    #[test]
    fn test_directory_entries_are_created_empty() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("mpv");
        let archive = temp_dir.path().join("mpv.zip");
        write_zip(&archive, &[("fonts/", None), ("scripts/lua/", None)]);

        extract_archive(&archive, &target, &[]).unwrap();

        assert!(target.join("fonts").is_dir());
        assert!(target.join("scripts").join("lua").is_dir());
        assert_eq!(fs::read_dir(target.join("fonts")).unwrap().count(), 0);
    }

    #[test]
    fn test_files_are_created_without_directory_entries() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("mpv");
        let archive = temp_dir.path().join("mpv.zip");
        write_zip(&archive, &[("a/b/c.txt", Some("deep"))]);

        extract_archive(&archive, &target, &[]).unwrap();

        assert_eq!(fs::read(target.join("a").join("b").join("c.txt")).unwrap(), b"deep");
    }

    #[test]
    fn test_skips_console_wrapper() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("mpv");
        let archive = temp_dir.path().join("mpv.zip");
        write_zip(
            &archive,
            &[("mpv.com", Some("wrapper")), ("mpv.exe", Some("player"))],
        );

        extract_archive(&archive, &target, &skip_console_wrapper()).unwrap();

        assert!(!target.join("mpv.com").exists());
        assert!(target.join("mpv.exe").exists());
    }

    #[test]
    fn test_traversal_aborts_after_earlier_entries() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        let archive = temp_dir.path().join("archive.zip");
        write_zip(
            &archive,
            &[
                ("a/b.txt", Some("kept")),
                ("a/", None),
                ("../evil.txt", Some("evil")),
                ("after.txt", Some("never")),
            ],
        );

        let err = extract_archive(&archive, &target, &[]).unwrap_err();

        assert!(err.downcast_ref::<IllegalFilePath>().is_some(), "{err}");
        assert!(err.to_string().contains("illegal file path"));
        assert_eq!(fs::read(target.join("a").join("b.txt")).unwrap(), b"kept");
        assert!(!temp_dir.path().join("evil.txt").exists());
        assert!(!target.join("after.txt").exists());
        // Only a complete extraction removes the archive
        assert!(archive.exists());
    }

    #[test]
    fn test_traversal_in_first_entry_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        let archive = temp_dir.path().join("archive.zip");
        write_zip(
            &archive,
            &[("nested/../../escape/evil.txt", Some("evil"))],
        );

        let err = extract_archive(&archive, &target, &[]).unwrap_err();

        assert!(err.downcast_ref::<IllegalFilePath>().is_some(), "{err}");
        assert!(!target.exists());
        assert!(!temp_dir.path().join("escape").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_preserves_recorded_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("mpv");
        let archive = temp_dir.path().join("mpv.zip");
        write_zip(&archive, &[("mpv", Some("player"))]);

        extract_archive(&archive, &target, &[]).unwrap();

        let mode = fs::metadata(target.join("mpv")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("mpv.zip");
        fs::write(&archive, b"this is not a zip").unwrap();

        assert!(extract_archive(&archive, &temp_dir.path().join("mpv"), &[]).is_err());
    }
}
