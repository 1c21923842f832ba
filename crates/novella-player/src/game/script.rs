//! Recorded session scripts
//!
//! A script replays what the network side and the user did during a chat
//! session, step by step:
//!
//! ```json
//! {"steps": [
//!   {"world": {"location": "GARDEN", "timeOfDay": "DAY", "bgmMode": "DAILY"}},
//!   {"scenes": [{"dialogue": "Hi!", "emotion": "JOY"}]},
//!   {"stats": {"currentAffection": 12, "userEnergy": 99}},
//!   {"wait": 1500},
//!   {"advance": 1},
//!   {"exchange": null},
//!   {"failure": "Connection lost. Try again."}
//! ]}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use novella_common::{Scene, StatsUpdate, WorldState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// Location / time / music descriptor changed
    World(WorldState),
    /// A batch of scenes arrived
    Scenes(Vec<Scene>),
    /// Affection / energy reported by the backend
    Stats(StatsUpdate),
    /// The scene request failed with this retry hint
    Failure(String),
    /// User clicks
    Advance(u32),
    /// Let time pass (ms)
    Wait(u32),
    /// User sent a message
    Exchange,
    /// Narrator interlude
    Event(String),
    /// Conversation history wiped
    Reset,
    /// Rejoined a room; show its last scene
    Restore(Scene),
    Volume {
        volume: f32,
        #[serde(default)]
        muted: bool,
    },
    ToggleMusic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Counts shown by `novella check`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub steps: usize,
    pub scenes: usize,
    pub events: usize,
    pub failures: usize,
    pub world_changes: usize,
    pub advances: u32,
    pub wait_ms: u64,
}

impl Script {
    pub fn load(path: &Path) -> novella_common::Result<Self> {
        let text = novella_common::read_text(path)?;
        let script = Self::from_json(&text)?;
        tracing::debug!("Loaded script {} ({} steps)", path.display(), script.steps.len());
        Ok(script)
    }

    pub fn from_json(json: &str) -> novella_common::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn summary(&self) -> ScriptSummary {
        let mut summary = ScriptSummary {
            steps: self.steps.len(),
            ..Default::default()
        };
        for step in &self.steps {
            match step {
                Step::World(_) => summary.world_changes += 1,
                Step::Scenes(batch) => summary.scenes += batch.len(),
                Step::Failure(_) => summary.failures += 1,
                Step::Advance(n) => summary.advances += n,
                Step::Wait(ms) => summary.wait_ms += *ms as u64,
                Step::Event(_) => summary.events += 1,
                Step::Restore(_) => summary.scenes += 1,
                Step::Exchange
                | Step::Reset
                | Step::Stats(_)
                | Step::Volume { .. }
                | Step::ToggleMusic => {}
            }
        }
        summary
    }
}
