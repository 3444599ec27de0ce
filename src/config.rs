//! User configuration and preferences

use crate::engine::swiper::{DEFAULT_PRERENDER_ITEMS_COUNT, DEFAULT_SWIPE_THRESHOLD};
use crate::error::{PhotoSwipeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Swiper defaults a user can persist; CLI flags override them per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwiperPreferences {
    pub swipe_threshold: f64,
    pub loop_items: bool,
    pub prerender_items_count: usize,
    pub disable_multi_touch: bool,
}

impl Default for SwiperPreferences {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            loop_items: false,
            prerender_items_count: DEFAULT_PRERENDER_ITEMS_COUNT,
            disable_multi_touch: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Whether the welcome dialog has been shown
    pub welcome_shown: bool,
    /// Leave months whose photos are all kept out of the month list
    pub hide_kept_months: bool,
    pub swiper: SwiperPreferences,
}

impl UserConfig {
    /// Get the config file path (~/.config/photoswipe/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photoswipe").join("config.json"))
    }

    /// Load config from the default location, or defaults if missing
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            PhotoSwipeError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            PhotoSwipeError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            PhotoSwipeError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            PhotoSwipeError::ConfigError("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PhotoSwipeError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            PhotoSwipeError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            PhotoSwipeError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.welcome_shown);
        assert!(!config.hide_kept_months);
        assert_eq!(config.swiper.swipe_threshold, 130.0);
        assert_eq!(config.swiper.prerender_items_count, 2);
        assert!(!config.swiper.loop_items);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: UserConfig = serde_json::from_str(r#"{"welcome_shown": true}"#).unwrap();
        assert!(config.welcome_shown);
        assert_eq!(config.swiper, SwiperPreferences::default());

        let config: UserConfig =
            serde_json::from_str(r#"{"swiper": {"loop_items": true}}"#).unwrap();
        assert!(config.swiper.loop_items);
        assert_eq!(config.swiper.swipe_threshold, 130.0);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photoswipe").join("config.json");

        let mut config = UserConfig::default();
        config.welcome_shown = true;
        config.hide_kept_months = true;
        config.swiper.swipe_threshold = 90.0;
        config.save_to(&path).unwrap();

        let loaded = UserConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = UserConfig::load_from(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, UserConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(
            UserConfig::load_from(&path),
            Err(PhotoSwipeError::ConfigError(_))
        ));
    }
}
