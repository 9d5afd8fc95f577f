//! RON config loader
//!
//! Loads the game config from external RON files, with fallback to the
//! hardcoded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use super::config::GameConfig;
use crate::error::GameResult;

/// Config file name, both in the assets directory and the user directory
const CONFIG_FILE: &str = "config.ron";

/// Bundled data directory, relative to the working directory
const ASSETS_DIR: &str = "assets/data";

/// Per-user config file path, if the platform has a config directory
pub fn user_config_path() -> Option<PathBuf> {
    use directories::ProjectDirs;

    ProjectDirs::from("com", "delve", "Delve")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Candidate files, in priority order
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new(ASSETS_DIR).join(CONFIG_FILE)];
    paths.extend(user_config_path());
    paths
}

impl GameConfig {
    /// Load from the first config file found, or use defaults.
    ///
    /// A file that exists but fails to read, parse or validate is skipped
    /// with a warning.
    pub fn load() -> Self {
        Self::load_from_paths(&config_search_paths())
    }

    /// Load from the first usable file among `paths`
    pub fn load_from_paths(paths: &[PathBuf]) -> Self {
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_file(path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("Failed to load {}: {}", path.display(), e),
            }
        }
        log::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Read, parse and validate one file
    pub fn load_file(path: &Path) -> GameResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }
}

/// Write the default config to `path`, creating parent directories
pub fn export_default_config(path: &Path) -> GameResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, GameConfig::default().to_ron_string()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("delve-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_export_then_load() {
        let dir = scratch_dir("export");
        let path = dir.join("nested").join("config.ron");
        export_default_config(&path).unwrap();
        assert_eq!(GameConfig::load_file(&path).unwrap(), GameConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bad_file_falls_through() {
        let dir = scratch_dir("fallthrough");
        fs::create_dir_all(&dir).unwrap();
        let broken = dir.join("broken.ron");
        let good = dir.join("good.ron");
        fs::write(&broken, "(map_width: ").unwrap();
        fs::write(&good, "(map_width: 30, map_height: 20)").unwrap();

        let config = GameConfig::load_from_paths(&[dir.join("missing.ron"), broken, good]);
        assert_eq!((config.map_width, config.map_height), (30, 20));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let config = GameConfig::load_from_paths(&[PathBuf::from("/nonexistent/delve.ron")]);
        assert_eq!(config, GameConfig::default());
    }
}
