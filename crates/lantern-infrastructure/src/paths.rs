//! Unified path management for lantern configuration files.
//!
//! All lantern configuration and state files live under a single
//! per-user config directory, resolved via the `dirs` crate so the
//! layout is correct on Linux, macOS, and Windows.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for lantern.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/lantern/           # Config directory
/// ├── config.toml              # Application configuration
/// └── app_state.toml           # Persisted application state
/// ```
pub struct LanternPaths;

impl LanternPaths {
    /// Returns the lantern configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/lantern/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("lantern"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted application state file.
    pub fn state_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("app_state.toml"))
    }

    /// Ensures the configuration directory exists, creating it if needed.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to the config directory
    /// - `Err(std::io::Error)`: If directory creation fails
    pub fn ensure_config_dir() -> Result<PathBuf, std::io::Error> {
        let dir = Self::config_dir()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = LanternPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("lantern"));
    }

    #[test]
    fn test_config_file() {
        let config_file = LanternPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = LanternPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_state_file() {
        let state_file = LanternPaths::state_file().unwrap();
        assert!(state_file.ends_with("app_state.toml"));
        let config_dir = LanternPaths::config_dir().unwrap();
        assert!(state_file.starts_with(&config_dir));
    }
}
