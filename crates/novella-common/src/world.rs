//! World descriptor: where the conversation happens, when, and which music
//! theme the backend asked for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location tag such as `GARDEN` or `BAR`. Free-form; stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LocationTag(String);

impl LocationTag {
    pub fn new(tag: &str) -> Self {
        Self(tag.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LocationTag {
    fn from(tag: String) -> Self {
        Self::new(&tag)
    }
}

impl From<&str> for LocationTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<LocationTag> for String {
    fn from(tag: LocationTag) -> Self {
        tag.0
    }
}

impl fmt::Display for LocationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeOfDay {
    Day,
    Night,
    Sunset,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "DAY",
            TimeOfDay::Night => "NIGHT",
            TimeOfDay::Sunset => "SUNSET",
        }
    }

    /// Time used for asset lookup; unset means night
    pub fn or_night(time: Option<TimeOfDay>) -> TimeOfDay {
        time.unwrap_or(TimeOfDay::Night)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background music themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BgmMode {
    Lobby,
    Daily,
    Romantic,
    Exciting,
    Touching,
    Tense,
}

impl BgmMode {
    /// Sound file stem under `/sounds/`
    pub fn sound_key(&self) -> &'static str {
        match self {
            BgmMode::Lobby => "bgm_lobby",
            BgmMode::Daily => "bgm_daily",
            BgmMode::Romantic => "bgm_romantic",
            BgmMode::Exciting => "bgm_exciting",
            BgmMode::Touching => "bgm_touching",
            BgmMode::Tense => "bgm_tense",
        }
    }
}

/// Everything the player needs from world state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldState {
    pub location: Option<LocationTag>,
    pub time_of_day: Option<TimeOfDay>,
    pub bgm_mode: Option<BgmMode>,
}

impl WorldState {
    pub fn at(location: &str, time: TimeOfDay) -> Self {
        Self {
            location: Some(LocationTag::new(location)),
            time_of_day: Some(time),
            bgm_mode: None,
        }
    }

    pub fn with_bgm(mut self, mode: BgmMode) -> Self {
        self.bgm_mode = Some(mode);
        self
    }
}
