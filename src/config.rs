//! Configuration management
//!
//! Manages engine configuration: player timing, session selection and the
//! adaptation thresholds.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::Locale;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sequence player settings
    #[serde(default)]
    pub player: PlayerConfig,
    /// Session generator settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Adaptation evaluator settings
    #[serde(default)]
    pub adaptation: AdaptationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Narration locale
    #[serde(default)]
    pub locale: Locale,
    /// Delay between an audio step's narration and its sound effect
    #[serde(default = "default_audio_effect_delay")]
    pub audio_effect_delay_ms: u64,
    /// How long before the end of a blurred context step the image clears
    #[serde(default = "default_unblur_lead")]
    pub unblur_lead_ms: u64,
}

fn default_audio_effect_delay() -> u64 {
    400
}

fn default_unblur_lead() -> u64 {
    150
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            audio_effect_delay_ms: default_audio_effect_delay(),
            unblur_lead_ms: default_unblur_lead(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Successful completions at which an item counts as mastered
    #[serde(default = "default_mastery_threshold")]
    pub mastery_threshold: u32,
    /// Age used when the learner's age is unknown
    #[serde(default = "default_age")]
    pub default_age: u8,
}

fn default_mastery_threshold() -> u32 {
    3
}

fn default_age() -> u8 {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mastery_threshold: default_mastery_threshold(),
            default_age: default_age(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationConfig {
    /// Repeat rate above which the learner is considered struggling
    #[serde(default = "default_repeat_rate_threshold")]
    pub repeat_rate_threshold: f64,
    /// Snapshots per minute above which the learner is moving fast
    #[serde(default = "default_high_throughput")]
    pub high_throughput_per_minute: f64,
    /// Rolling window size in snapshots
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_repeat_rate_threshold() -> f64 {
    0.4
}

fn default_high_throughput() -> f64 {
    2.0
}

fn default_window_size() -> usize {
    10
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            repeat_rate_threshold: default_repeat_rate_threshold(),
            high_throughput_per_minute: default_high_throughput(),
            window_size: default_window_size(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, writing defaults on
    /// first use
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "learnpath", "learnpath")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "learnpath", "learnpath")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!();
    println!("[player]");
    println!("  locale:                     {}", config.player.locale);
    println!("  audio_effect_delay_ms:      {}", config.player.audio_effect_delay_ms);
    println!("  unblur_lead_ms:             {}", config.player.unblur_lead_ms);
    println!("[session]");
    println!("  mastery_threshold:          {}", config.session.mastery_threshold);
    println!("  default_age:                {}", config.session.default_age);
    println!("[adaptation]");
    println!("  repeat_rate_threshold:      {}", config.adaptation.repeat_rate_threshold);
    println!("  high_throughput_per_minute: {}", config.adaptation.high_throughput_per_minute);
    println!("  window_size:                {}", config.adaptation.window_size);

    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.session.mastery_threshold, 3);
        assert_eq!(config.player.unblur_lead_ms, 150);
        assert_eq!(config.adaptation.repeat_rate_threshold, 0.4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[adaptation]\nwindow_size = 4\n").unwrap();
        assert_eq!(config.adaptation.window_size, 4);
        assert_eq!(config.adaptation.repeat_rate_threshold, 0.4);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.player.locale = Locale::Pt;
        config.session.default_age = 7;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_toml_parses() {
        let parsed: Config = toml::from_str(&default_config_toml()).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
