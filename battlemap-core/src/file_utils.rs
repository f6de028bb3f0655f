//! File utility functions.

use crate::error::{BattleMapError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively find files with given extension in a directory.
pub fn find_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(BattleMapError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory not found: {}", dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension() {
                if ext == extension {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Expand input paths into upload files. Files are taken as given,
/// directories are searched recursively for `extension`.
pub fn collect_input_files(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_files_with_extension(path, extension)?);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(BattleMapError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Input not found: {}", path.display()),
            )));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_input_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("day1");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("b.json"), "[]").unwrap();
        std::fs::write(dir.path().join("a.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let single = dir.path().join("notes.txt");

        let files = collect_input_files(&[dir.path().to_path_buf(), single.clone()], "json").unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.json"), nested.join("b.json"), single]
        );
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = collect_input_files(&[PathBuf::from("/nonexistent/upload.json")], "json");
        assert!(matches!(err, Err(BattleMapError::Io(_))));
    }
}
