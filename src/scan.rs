//! Candidate file listing: which directory entries enter the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use tracing::debug;

/// Still-image extensions always accepted (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

/// RAW extensions, accepted only on request (lowercase).
pub const RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "dcr", "dng", "k25", "kdc", "mrw", "nef", "orf", "pef", "raf", "raw", "rw2",
    "sr2", "srf", "x3f",
];

/// List the candidate image files of `dir`, sorted by path.
///
/// Non-recursive; extensions match case-insensitively. RAW formats are
/// included only when `with_raw` is set.
pub fn candidate_files(dir: &Path, with_raw: bool) -> Result<Vec<PathBuf>> {
    ensure!(dir.is_dir(), "{} is not a readable directory", dir.display());

    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory {}", dir.display()))?
            .path();
        if path.is_file() && matches_extension(&path, with_raw) {
            files.push(path);
        }
    }
    files.sort();

    debug!(dir = %dir.display(), count = files.len(), with_raw, "collected candidate files");
    Ok(files)
}

fn matches_extension(path: &Path, with_raw: bool) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()) || (with_raw && RAW_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_filters_and_sorts_candidates() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "IMG_0002.JPG");
        touch(dir.path(), "IMG_0001.jpg");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "scan.tiff");
        touch(dir.path(), "raw_shot.CR2");

        let files = candidate_files(dir.path(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["IMG_0001.jpg", "IMG_0002.JPG", "scan.tiff"]);
    }

    #[test]
    fn test_with_raw_extends_the_accepted_set() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "shot.cr2");
        touch(dir.path(), "shot.nef");
        touch(dir.path(), "shot.jpg");

        assert_eq!(candidate_files(dir.path(), false).unwrap().len(), 1);
        assert_eq!(candidate_files(dir.path(), true).unwrap().len(), 3);
    }

    #[test]
    fn test_subdirectories_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();
        touch(dir.path(), "top.jpg");

        let files = candidate_files(dir.path(), false).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.jpg"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(candidate_files(Path::new("/nonexistent-dir"), false).is_err());
    }
}
