//! Asset lookup: backgrounds, character sprites, sound keys
//!
//! Layout under the asset root:
//!   characters/{outfit}_{emotion}.png
//!   backgrounds/{file}.png
//!   sounds/{key}.mp3
//!
//! Resolution itself is pure (see `background`, `character`, `sound`);
//! `AssetStore` only answers "does this file exist" so the fallback chains
//! can skip what cannot be loaded.

pub mod background;
pub mod character;
pub mod sound;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use background::{background_chain, resolve_background, DEFAULT_BACKGROUND};
pub use character::character_chain;

pub const IMAGE_EXT: &str = "png";
pub const SOUND_EXT: &str = "mp3";

/// `/characters/{key}.png`
pub fn character_path(key: &str) -> String {
    format!("/characters/{}.{}", key, IMAGE_EXT)
}

/// `/backgrounds/{file}`; background keys already carry their extension
pub fn background_path(file: &str) -> String {
    format!("/backgrounds/{}", file)
}

/// File name of a sound key inside `sounds/` (`{key}.mp3`)
pub fn sound_file_name(key: &str) -> String {
    format!("{}.{}", key, SOUND_EXT)
}

/// Answers whether an asset path (as produced by the helpers above) loads
pub trait AssetProbe {
    fn exists(&self, asset_path: &str) -> bool;
}

/// File index of an asset root directory
pub struct AssetStore {
    /// Asset paths in `/dir/file` form
    files: HashSet<String>,
    /// Base path on disk
    pub root: PathBuf,
}

impl AssetStore {
    /// Index `characters/`, `backgrounds/` and `sounds/` below `root`.
    /// Missing subdirectories are skipped, not an error.
    pub fn load(root: &Path) -> Result<Self> {
        let mut files = HashSet::new();

        for subdir_name in &["characters", "backgrounds", "sounds"] {
            let subdir = root.join(subdir_name);
            if !subdir.is_dir() {
                tracing::debug!("No {}/ under {}", subdir_name, root.display());
                continue;
            }
            let entries = std::fs::read_dir(&subdir)
                .with_context(|| format!("Failed to list {}", subdir.display()))?;
            for entry in entries {
                let entry = entry?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                files.insert(format!("/{}/{}", subdir_name, name));
            }
        }

        tracing::info!("Indexed {} asset files under {}", files.len(), root.display());
        Ok(Self {
            files,
            root: root.to_path_buf(),
        })
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn sound_dir(&self) -> PathBuf {
        self.root.join("sounds")
    }
}

impl AssetProbe for AssetStore {
    fn exists(&self, asset_path: &str) -> bool {
        self.files.contains(asset_path)
    }
}

/// First candidate in `chain` that the probe can load
pub fn first_loadable<I>(probe: &dyn AssetProbe, chain: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    chain.into_iter().find(|path| {
        let ok = probe.exists(path);
        if !ok {
            tracing::debug!("Asset missing, falling back: {}", path);
        }
        ok
    })
}
