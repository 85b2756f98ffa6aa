//! Filesystem helpers for batch commands: posts discovery, directory backups
//! and whole-file atomic replacement.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

use super::error::InfraError;

/// List the `.html` files directly inside `dir`, sorted by file name.
///
/// An unreadable directory is an error; unreadable entries inside it are
/// skipped.
pub fn list_html_files(dir: &Path) -> Result<Vec<PathBuf>, InfraError> {
    if !dir.is_dir() {
        return Err(InfraError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("posts directory `{}` is not readable", dir.display()),
        )));
    }
    fs::read_dir(dir)?;

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Copy every file under `source` into `backup_root/<stamp>/`, preserving
/// relative paths. Returns the created backup directory.
pub fn backup_directory(
    source: &Path,
    backup_root: &Path,
    stamp: &str,
) -> Result<PathBuf, InfraError> {
    let target = backup_root.join(stamp);
    fs::create_dir_all(&target)?;

    for entry in WalkDir::new(source).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(source) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let destination = target.join(relative);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &destination)?;
    }

    debug!(
        target = "yojitsu::fs",
        source = %source.display(),
        backup = %target.display(),
        "Backed up directory"
    );
    Ok(target)
}

/// Replace `path` with `contents` via a sibling temporary file, so readers
/// never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), InfraError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let mut file = NamedTempFile::new_in(&parent)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|err| InfraError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_only_html_files_in_name_order() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("b.html"), "b").expect("write");
        fs::write(dir.path().join("a.html"), "a").expect("write");
        fs::write(dir.path().join("notes.txt"), "n").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested/c.html"), "c").expect("write");

        let files = list_html_files(dir.path()).expect("list");
        let names: Vec<_> = files.iter().filter_map(|p| file_name(p)).collect();
        assert_eq!(names, ["a.html", "b.html"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(list_html_files(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn backup_copies_tree_under_stamp() {
        let source = tempdir().expect("source");
        let backups = tempdir().expect("backups");
        fs::write(source.path().join("a.html"), "alpha").expect("write");

        let target =
            backup_directory(source.path(), backups.path(), "20250101T000000").expect("backup");
        assert_eq!(target, backups.path().join("20250101T000000"));
        assert_eq!(
            fs::read_to_string(target.join("a.html")).expect("read"),
            "alpha"
        );
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out/store.json");
        write_atomic(&path, "first").expect("write");
        write_atomic(&path, "second").expect("rewrite");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
    }
}
