//! Sound key tables for the ambience and effect layers
//!
//! Music keys come straight from `BgmMode::sound_key`.

use novella_common::TimeOfDay;

/// Ambience loops. Keys are `{LOCATION}_{TIME}` or a bare `{LOCATION}`
/// that applies at any time. Several loops may play together.
const AMBIENCE: &[(&str, &[&str])] = &[
    ("BEACH", &["amb_beach"]),
    ("KITCHEN", &["amb_kitchen"]),
    ("DOWNTOWN", &["amb_street"]),
    ("BAR", &["amb_bar"]),
    ("BATHROOM", &["amb_bathroom"]),
    ("GARDEN_DAY", &["amb_birds"]),
    ("GARDEN_NIGHT", &["amb_crickets", "amb_owl"]),
    ("BALCONY_DAY", &["amb_birds"]),
    ("BALCONY_NIGHT", &["amb_crickets", "amb_owl"]),
];

/// One-shot effect played when arriving at a location
const EFFECTS: &[(&str, &str)] = &[
    ("BAR", "sfx_door_open"),
    ("BEDROOM", "sfx_door_open"),
    ("STUDY", "sfx_door_open"),
    ("LIVINGROOM", "sfx_door_open"),
    ("KITCHEN", "sfx_door_open"),
    ("BATHROOM", "sfx_door_open"),
    ("ENTRANCE", "sfx_door_open"),
    ("BEACH", "sfx_seagull"),
];

fn ambience_entry(key: &str) -> Option<&'static [&'static str]> {
    AMBIENCE.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Ambience keys for a place: exact time → night → any time → nothing
pub fn ambience_for(location: &str, time: Option<TimeOfDay>) -> Vec<&'static str> {
    let location = location.trim().to_ascii_uppercase();
    let time = TimeOfDay::or_night(time);
    let exact = format!("{}_{}", location, time.as_str());
    let night = format!("{}_{}", location, TimeOfDay::Night.as_str());

    ambience_entry(&exact)
        .or_else(|| ambience_entry(&night))
        .or_else(|| ambience_entry(&location))
        .map(|keys| keys.to_vec())
        .unwrap_or_default()
}

/// Arrival effect for a location, if it has one
pub fn effect_for(location: &str) -> Option<&'static str> {
    let location = location.trim().to_ascii_uppercase();
    EFFECTS
        .iter()
        .find(|(k, _)| *k == location)
        .map(|(_, key)| *key)
}
