//! Scene records
//!
//! One scene = one narrative beat from the backend: an optional line of
//! dialogue, an optional narration, the character's emotion, and whether it
//! is a narrator-only event interlude.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Character mood attached to every scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmotionTag {
    #[default]
    Neutral,
    Joy,
    Sad,
    Angry,
    Shy,
    Surprise,
    Panic,
    Relax,
    Disgust,
    Frightened,
    Flirtatious,
    Heated,
}

impl EmotionTag {
    pub const ALL: [EmotionTag; 12] = [
        EmotionTag::Neutral,
        EmotionTag::Joy,
        EmotionTag::Sad,
        EmotionTag::Angry,
        EmotionTag::Shy,
        EmotionTag::Surprise,
        EmotionTag::Panic,
        EmotionTag::Relax,
        EmotionTag::Disgust,
        EmotionTag::Frightened,
        EmotionTag::Flirtatious,
        EmotionTag::Heated,
    ];

    /// Wire name, as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Neutral => "NEUTRAL",
            EmotionTag::Joy => "JOY",
            EmotionTag::Sad => "SAD",
            EmotionTag::Angry => "ANGRY",
            EmotionTag::Shy => "SHY",
            EmotionTag::Surprise => "SURPRISE",
            EmotionTag::Panic => "PANIC",
            EmotionTag::Relax => "RELAX",
            EmotionTag::Disgust => "DISGUST",
            EmotionTag::Frightened => "FRIGHTENED",
            EmotionTag::Flirtatious => "FLIRTATIOUS",
            EmotionTag::Heated => "HEATED",
        }
    }

    /// Parse a backend tag. Case-insensitive; anything unknown is Neutral.
    pub fn parse_lenient(tag: &str) -> Self {
        let upper = tag.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == upper)
            .unwrap_or_default()
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmotionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag: Option<String> = Option::deserialize(deserializer)?;
        Ok(tag.map(|t| Self::parse_lenient(&t)).unwrap_or_default())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single narrative unit. Immutable once handed to the player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dialogue: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub narration: String,
    #[serde(default)]
    pub emotion: EmotionTag,
    /// Narrator-only interlude: no speaker, narration is the typed text
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_event: bool,
}

impl Scene {
    pub fn new(dialogue: &str, narration: &str, emotion: EmotionTag) -> Self {
        Self {
            dialogue: dialogue.to_string(),
            narration: narration.to_string(),
            emotion,
            is_event: false,
        }
    }

    /// Narrator interlude (event trigger result)
    pub fn event(narration: &str, emotion: EmotionTag) -> Self {
        Self {
            dialogue: String::new(),
            narration: narration.to_string(),
            emotion,
            is_event: true,
        }
    }

    /// Stand-in scene used when the backend could not deliver a batch
    pub fn connection_error(retry_hint: &str) -> Self {
        Self::new("", retry_hint, EmotionTag::Sad)
    }

    /// The text revealed by the typewriter
    pub fn primary_text(&self) -> &str {
        if self.is_event {
            &self.narration
        } else {
            &self.dialogue
        }
    }

    /// Narration shown untyped above the dialogue (never for events)
    pub fn annotation(&self) -> Option<&str> {
        if self.is_event || self.narration.is_empty() {
            None
        } else {
            Some(&self.narration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_batch(json: &str) -> serde_json::Result<Vec<Scene>> {
        serde_json::from_str(json)
    }

    #[test]
    fn emotion_parse_is_case_insensitive() {
        assert_eq!(EmotionTag::parse_lenient("joy"), EmotionTag::Joy);
        assert_eq!(EmotionTag::parse_lenient(" Flirtatious "), EmotionTag::Flirtatious);
        assert_eq!(EmotionTag::parse_lenient("SMUG"), EmotionTag::Neutral);
    }

    #[test]
    fn batch_parses_backend_shape() {
        let json = r#"[
            {"dialogue": "Welcome back.", "narration": "She smiles.", "emotion": "JOY"},
            {"dialogue": "", "narration": "The lights flicker.", "emotion": "frightened", "isEvent": true},
            {"dialogue": null, "emotion": null}
        ]"#;
        let scenes = parse_batch(json).unwrap();
        assert_eq!(scenes.len(), 3);
        assert_eq!(scenes[0].emotion, EmotionTag::Joy);
        assert!(!scenes[0].is_event);
        assert_eq!(scenes[1].emotion, EmotionTag::Frightened);
        assert!(scenes[1].is_event);
        assert!(scenes[2].dialogue.is_empty() && scenes[2].narration.is_empty());
        assert_eq!(scenes[2].emotion, EmotionTag::Neutral);
    }

    #[test]
    fn null_event_flag_reads_as_dialogue() {
        let json = r#"[
            {"dialogue": "hi", "narration": null, "emotion": "SHY", "isEvent": null},
            {"dialogue": "", "narration": "Rain.", "emotion": "RELAX", "isEvent": true}
        ]"#;
        let scenes = parse_batch(json).unwrap();
        assert_eq!(scenes.len(), 2);
        assert!(!scenes[0].is_event);
        assert_eq!(scenes[0].primary_text(), "hi");
        assert!(scenes[1].is_event);
    }

    #[test]
    fn primary_text_follows_event_flag() {
        let talk = Scene::new("Hello", "She waves.", EmotionTag::Joy);
        assert_eq!(talk.primary_text(), "Hello");
        assert_eq!(talk.annotation(), Some("She waves."));

        let mut event = Scene::event("A storm rolls in.", EmotionTag::Neutral);
        event.dialogue = "ignored".to_string();
        assert_eq!(event.primary_text(), "A storm rolls in.");
        assert_eq!(event.annotation(), None);
    }

    #[test]
    fn connection_error_scene_is_sad() {
        let scene = Scene::connection_error("Connection lost. Try again.");
        assert_eq!(scene.emotion, EmotionTag::Sad);
        assert_eq!(scene.narration, "Connection lost. Try again.");
        assert!(scene.dialogue.is_empty());
    }

    #[test]
    fn malformed_batch_is_rejected() {
        assert!(parse_batch(r#"{"dialogue": "not a list"}"#).is_err());
    }
}
