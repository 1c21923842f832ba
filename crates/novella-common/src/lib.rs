//! Common types shared across Novella crates
//!
//! - `scene`:  scene records emitted by the chat backend
//! - `world`:  location / time-of-day / music descriptor
//! - `stats`:  affection / energy updates
//! - `config`: player configuration (TOML)

pub mod config;
pub mod scene;
pub mod stats;
pub mod world;

use std::path::PathBuf;
use thiserror::Error;

pub use config::{AnimationConfig, AssetConfig, AudioConfig, PlayerConfig, RevealConfig, StatsConfig};
pub use scene::{EmotionTag, Scene};
pub use stats::StatsUpdate;
pub use world::{BgmMode, LocationTag, TimeOfDay, WorldState};

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid scene data: {0}")]
    SceneData(#[from] serde_json::Error),

    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, CommonError>;

/// Read a whole text file, tagging failures with the path
pub fn read_text(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CommonError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_text(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_invalid_setting_message() {
        let err = CommonError::InvalidSetting {
            field: "audio.fade_steps",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'audio.fade_steps': must be at least 1"
        );
    }
}
