//! Platform-specific paths for configuration and user patches.
//!
//! # Directory Structure
//!
//! - **Config**: `~/.config/klimper/` (Linux), `~/Library/Application Support/klimper/` (macOS), `%APPDATA%\klimper\` (Windows)
//! - **Default config file**: `<config dir>/klimper.toml`
//! - **User patches**: `<config dir>/patches/`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const APP_NAME: &str = "klimper";
const CONFIG_FILE: &str = "klimper.toml";
const PATCHES_SUBDIR: &str = "patches";

/// Returns the user configuration directory.
///
/// Falls back to the current directory if the platform directory cannot be
/// determined.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the configuration file loaded when none is given.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Returns the user patches directory.
pub fn patches_dir() -> PathBuf {
    config_dir().join(PATCHES_SUBDIR)
}

/// Creates the configuration directory if needed.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a patch file by path or by name in the user patches directory.
///
/// The name may omit the `.toml` extension.
pub fn find_patch_file(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let user_path = patches_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// List the patch files in the user patches directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_patches() -> Vec<PathBuf> {
    list_patches_in_dir(&patches_dir())
}

fn list_patches_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut patches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    patches.sort();
    patches
}

/// Patch name from a file path (the file stem).
///
/// # Example
///
/// ```rust
/// use klimper_config::paths::patch_name_from_path;
/// use std::path::Path;
///
/// let name = patch_name_from_path(Path::new("/path/to/glass.toml"));
/// assert_eq!(name, Some("glass".to_string()));
/// ```
pub fn patch_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dirs_contain_app_name() {
        assert!(config_dir().to_string_lossy().contains("klimper"));
        assert!(default_config_path().ends_with("klimper/klimper.toml"));
        assert!(patches_dir().ends_with("klimper/patches"));
    }

    #[test]
    fn test_find_patch_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let patch_path = temp_dir.path().join("glass.toml");
        fs::write(&patch_path, "name = \"Glass\"").unwrap();

        let found = find_patch_file(patch_path.to_str().unwrap());
        assert_eq!(found, Some(patch_path));
    }

    #[test]
    fn test_find_patch_not_found() {
        assert!(find_patch_file("nonexistent_patch_12345").is_none());
    }

    #[test]
    fn test_list_patches_in_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let patches = list_patches_in_dir(temp_dir.path());
        assert_eq!(patches.len(), 2);
        assert!(patches[0].ends_with("a.toml"));
    }

    #[test]
    fn test_list_patches_nonexistent_dir() {
        assert!(list_patches_in_dir(Path::new("/nonexistent/path/12345")).is_empty());
    }
}
