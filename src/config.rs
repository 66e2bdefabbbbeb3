//! Display configuration
//!
//! Device paths for the framebuffer and the touch input, loadable from a
//! TOML file so deployments can point at different event devices without
//! rebuilding.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

/// Configuration for the display devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Framebuffer device path (default: /dev/fb0)
    pub framebuffer_device: PathBuf,
    /// Touch input device path (default: /dev/input/event1)
    pub touch_device: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            framebuffer_device: PathBuf::from("/dev/fb0"),
            touch_device: PathBuf::from("/dev/input/event1"),
        }
    }
}

impl DisplayConfig {
    /// Create a configuration for the given framebuffer device
    pub fn new(framebuffer_device: impl Into<PathBuf>) -> Self {
        Self {
            framebuffer_device: framebuffer_device.into(),
            ..Default::default()
        }
    }

    /// Set the framebuffer device path
    pub fn with_framebuffer_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.framebuffer_device = path.into();
        self
    }

    /// Set the touch input device path
    pub fn with_touch_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.touch_device = path.into();
        self
    }

    /// Load a configuration from a TOML file
    ///
    /// Missing keys fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Write the configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.framebuffer_device, PathBuf::from("/dev/fb0"));
        assert_eq!(config.touch_device, PathBuf::from("/dev/input/event1"));
    }

    #[test]
    fn test_builders() {
        let config = DisplayConfig::new("/dev/fb1").with_touch_device("/dev/input/event3");
        assert_eq!(config.framebuffer_device, PathBuf::from("/dev/fb1"));
        assert_eq!(config.touch_device, PathBuf::from("/dev/input/event3"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("display.toml");

        let config = DisplayConfig::new("/dev/fb7").with_touch_device("/dev/input/event9");
        config.save(&path).unwrap();

        let loaded = DisplayConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("display.toml");
        fs::write(&path, "framebuffer_device = \"/dev/fb2\"\n").unwrap();

        let loaded = DisplayConfig::load(&path).unwrap();
        assert_eq!(loaded.framebuffer_device, PathBuf::from("/dev/fb2"));
        assert_eq!(loaded.touch_device, PathBuf::from("/dev/input/event1"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("display.toml");
        fs::write(&path, "framebuffer_device = [not toml").unwrap();

        let err = DisplayConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
