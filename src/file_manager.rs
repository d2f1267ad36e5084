//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva delle immagini in una directory
//! - Riconoscimento estensione case-insensitive
//! - Dimensioni dei file e formattazione human-readable
//! - Calcolo percentuale di riduzione
//!
//! ## Esempio:
//! ```rust,no_run
//! use asset_optimizer::file_manager::FileManager;
//! use std::path::Path;
//!
//! let exts = vec!["jpg".to_string(), "png".to_string()];
//! let files = FileManager::find_images(Path::new("photos/_raw"), &exts).unwrap();
//! for file in files {
//!     println!("{}", file.display());
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Size of a file in bytes, or `None` when it does not exist
    pub async fn existing_size(path: &Path) -> io::Result<Option<u64>> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove a file, treating "already gone" as success
    pub async fn remove_if_exists(path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Find every file under `dir` whose extension is in `extensions`.
    ///
    /// A missing directory yields an empty list. Symlinks to files count as
    /// files; symlinked directories are not descended into. Entries are
    /// returned sorted by file name within each directory so repeated runs
    /// see the same order.
    pub fn find_images(dir: &Path, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());
            if !is_file {
                continue;
            }
            if Self::has_extension_in(path, extensions) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Lowercased extension of a path, if any
    pub fn lowercase_extension(path: &Path) -> Option<String> {
        path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Check whether the path's extension (case-insensitive) is in the set
    pub fn has_extension_in(path: &Path, extensions: &[String]) -> bool {
        match Self::lowercase_extension(path) {
            Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }

    /// Both paths carry the same extension, ignoring case
    pub fn same_extension(a: &Path, b: &Path) -> bool {
        Self::lowercase_extension(a) == Self::lowercase_extension(b)
    }

    /// Human-readable size: whole bytes below 1 KB, one decimal above
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut value = size as f64;
        let mut unit_index = 0;

        while value >= 1024.0 && unit_index < UNITS.len() - 1 {
            value /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{}{}", size, UNITS[0])
        } else {
            format!("{:.1}{}", value, UNITS[unit_index])
        }
    }

    /// Same as [`format_size`](Self::format_size) but for a signed delta.
    /// Negative deltas never scale up a unit: `-2048B`.
    pub fn format_signed_size(delta: i64) -> String {
        if delta < 0 {
            format!("{}B", delta)
        } else {
            Self::format_size(delta as u64)
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        crate::config::DEFAULT_IMAGE_EXTENSIONS
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_find_images_recursive_and_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("2024/summer")).unwrap();
        fs::write(root.join("a.JPG"), b"x").unwrap();
        fs::write(root.join("notes.txt"), b"x").unwrap();
        fs::write(root.join("2024/b.heic"), b"x").unwrap();
        fs::write(root.join("2024/summer/c.Tiff"), b"x").unwrap();
        fs::write(root.join("2024/summer/d.gif"), b"x").unwrap();
        fs::create_dir_all(root.join("dir.png")).unwrap();

        let found = FileManager::find_images(root, &exts()).unwrap();
        let rel: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![
                PathBuf::from("2024/b.heic"),
                PathBuf::from("2024/summer/c.Tiff"),
                PathBuf::from("a.JPG"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_images_follows_file_symlinks() {
        let temp = TempDir::new().unwrap();
        let raw = temp.path().join("raw");
        fs::create_dir_all(&raw).unwrap();
        let target = temp.path().join("elsewhere.jpg");
        fs::write(&target, b"x").unwrap();
        std::os::unix::fs::symlink(&target, raw.join("linked.jpg")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.jpg"), raw.join("dangling.jpg")).unwrap();

        let found = FileManager::find_images(&raw, &exts()).unwrap();
        assert_eq!(found, vec![raw.join("linked.jpg")]);
    }

    #[test]
    fn test_find_images_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let found = FileManager::find_images(&temp.path().join("absent"), &exts()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(0), "0B");
        assert_eq!(FileManager::format_size(1023), "1023B");
        assert_eq!(FileManager::format_size(1024), "1.0KB");
        assert_eq!(FileManager::format_size(500_000), "488.3KB");
        assert_eq!(FileManager::format_size(300_000), "293.0KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.0MB");
        assert_eq!(FileManager::format_size(3 * 1024 * 1024 * 1024 * 1024), "3072.0GB");
        assert_eq!(FileManager::format_signed_size(-2048), "-2048B");
        assert_eq!(FileManager::format_signed_size(2048), "2.0KB");
    }

    #[test]
    fn test_same_extension() {
        assert!(FileManager::same_extension(Path::new("a.PNG"), Path::new("b.png")));
        assert!(!FileManager::same_extension(Path::new("a.heic"), Path::new("a.jpg")));
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
    }

    #[tokio::test]
    async fn test_existing_size_and_remove() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.bin");
        assert_eq!(FileManager::existing_size(&path).await.unwrap(), None);

        fs::write(&path, vec![0u8; 17]).unwrap();
        assert_eq!(FileManager::existing_size(&path).await.unwrap(), Some(17));

        FileManager::remove_if_exists(&path).await.unwrap();
        FileManager::remove_if_exists(&path).await.unwrap();
        assert!(!path.exists());
    }
}
