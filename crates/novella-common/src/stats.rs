//! Relationship stats reported alongside scenes

use serde::{Deserialize, Serialize};

/// Affection / energy as the backend reports them. Either may be absent
/// when a response only touches the other one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsUpdate {
    #[serde(alias = "currentAffection", alias = "affectionScore")]
    pub affection: Option<i32>,
    #[serde(alias = "userEnergy")]
    pub energy: Option<u32>,
}

impl StatsUpdate {
    pub fn affection(value: i32) -> Self {
        Self {
            affection: Some(value),
            energy: None,
        }
    }

    pub fn energy(value: u32) -> Self {
        Self {
            affection: None,
            energy: Some(value),
        }
    }
}
