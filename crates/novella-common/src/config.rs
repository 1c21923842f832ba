//! Player configuration
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to the defaults below.
//!
//! ```toml
//! [reveal]
//! dialogue_interval_ms = 30
//!
//! [audio]
//! master_volume = 0.8
//! muted = false
//!
//! [stats]
//! event_cost = 2
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CommonError, Result};

/// Typewriter speeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Milliseconds per character for character dialogue
    pub dialogue_interval_ms: u32,
    /// Milliseconds per character for event narration (slower)
    pub narration_interval_ms: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            dialogue_interval_ms: 30,
            narration_interval_ms: 50,
        }
    }
}

/// Mixer levels and fade timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub master_volume: f32,
    pub muted: bool,
    pub bgm_ratio: f32,
    pub ambience_ratio: f32,
    pub sfx_ratio: f32,
    /// Discrete steps per fade
    pub fade_steps: u32,
    pub bgm_fade_ms: u32,
    pub ambience_fade_out_ms: u32,
    pub ambience_fade_in_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            muted: false,
            bgm_ratio: 0.45,
            ambience_ratio: 0.25,
            sfx_ratio: 0.6,
            fade_steps: 20,
            bgm_fade_ms: 1500,
            ambience_fade_out_ms: 800,
            ambience_fade_in_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Neutral-pose settle between punch and idle
    pub settle_ms: u32,
    /// Seed for particle jitter; random when unset
    pub particle_seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            settle_ms: 150,
            particle_seed: None,
        }
    }
}

/// Energy costs and the affection change indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Energy before the backend reports any
    pub initial_energy: u32,
    pub exchange_cost: u32,
    pub event_cost: u32,
    /// How long an affection change stays on screen
    pub affection_flash_ms: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            initial_energy: 100,
            exchange_cost: 1,
            event_cost: 2,
            affection_flash_ms: 2000,
        }
    }
}

/// Where images and sounds live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `characters/`, `backgrounds/` and `sounds/`
    pub root: PathBuf,
    pub outfit: String,
    pub default_outfit: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            outfit: "default".to_string(),
            default_outfit: "default".to_string(),
        }
    }
}

/// Full player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub reveal: RevealConfig,
    pub audio: AudioConfig,
    pub animation: AnimationConfig,
    pub assets: AssetConfig,
    pub stats: StatsConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            audio: AudioConfig::default(),
            animation: AnimationConfig::default(),
            assets: AssetConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = crate::read_text(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PlayerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let unit = |field: &'static str, v: f32| -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(CommonError::InvalidSetting {
                    field,
                    reason: format!("{} is outside 0.0..=1.0", v),
                })
            }
        };
        unit("audio.master_volume", self.audio.master_volume)?;
        unit("audio.bgm_ratio", self.audio.bgm_ratio)?;
        unit("audio.ambience_ratio", self.audio.ambience_ratio)?;
        unit("audio.sfx_ratio", self.audio.sfx_ratio)?;

        if self.audio.fade_steps == 0 {
            return Err(CommonError::InvalidSetting {
                field: "audio.fade_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.reveal.dialogue_interval_ms == 0 || self.reveal.narration_interval_ms == 0 {
            return Err(CommonError::InvalidSetting {
                field: "reveal",
                reason: "intervals must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = PlayerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.audio.fade_steps, 20);
        assert_eq!(config.audio.bgm_fade_ms, 1500);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = PlayerConfig::from_toml_str(
            "[audio]\nmaster_volume = 0.8\n\n[reveal]\nnarration_interval_ms = 70\n",
        )
        .unwrap();
        assert_eq!(config.audio.master_volume, 0.8);
        assert_eq!(config.audio.bgm_ratio, 0.45);
        assert_eq!(config.reveal.narration_interval_ms, 70);
        assert_eq!(config.reveal.dialogue_interval_ms, 30);
    }

    #[test]
    fn test_out_of_range_volume_rejected() {
        let err = PlayerConfig::from_toml_str("[audio]\nmaster_volume = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            CommonError::InvalidSetting { field: "audio.master_volume", .. }
        ));
    }

    #[test]
    fn test_zero_fade_steps_rejected() {
        assert!(PlayerConfig::from_toml_str("[audio]\nfade_steps = 0\n").is_err());
    }

    #[test]
    fn test_stats_costs_follow_backend_defaults() {
        let config = PlayerConfig::from_toml_str("[stats]\nevent_cost = 3\n").unwrap();
        assert_eq!(config.stats.event_cost, 3);
        assert_eq!(config.stats.exchange_cost, 1);
        assert_eq!(config.stats.initial_energy, 100);
        assert_eq!(config.stats.affection_flash_ms, 2000);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = PlayerConfig::from_toml_str("[audio\n").unwrap_err();
        assert!(matches!(err, CommonError::Config(_)));
    }
}
