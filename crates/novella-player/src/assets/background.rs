//! Background image resolution: (location, time of day) → file name

use novella_common::TimeOfDay;

use super::background_path;

/// Shown before any location is known, and for unknown locations
pub const DEFAULT_BACKGROUND: &str = "bg_entrance_night.png";

/// `{LOCATION}_{TIME}` → file name. Some locations only have one image
/// shared between times (study, bar).
const BACKGROUNDS: &[(&str, &str)] = &[
    ("LIVINGROOM_DAY", "bg_livingroom_day.png"),
    ("LIVINGROOM_NIGHT", "bg_livingroom_night.png"),
    ("BALCONY_DAY", "bg_balcony_day.png"),
    ("BALCONY_NIGHT", "bg_balcony_night.png"),
    ("STUDY_DAY", "bg_study.png"),
    ("STUDY_NIGHT", "bg_study.png"),
    ("BATHROOM_DAY", "bg_bathroom_day.png"),
    ("BATHROOM_NIGHT", "bg_bathroom_night.png"),
    ("GARDEN_DAY", "bg_garden_day.png"),
    ("GARDEN_NIGHT", "bg_garden_night.png"),
    ("KITCHEN_DAY", "bg_kitchen_day.png"),
    ("KITCHEN_NIGHT", "bg_kitchen_night.png"),
    ("BEDROOM_DAY", "bg_bedroom_day.png"),
    ("BEDROOM_NIGHT", "bg_bedroom_night.png"),
    ("ENTRANCE_DAY", "bg_entrance_day.png"),
    ("ENTRANCE_NIGHT", "bg_entrance_night.png"),
    ("BEACH_DAY", "bg_beach_day.png"),
    ("BEACH_NIGHT", "bg_beach_night.png"),
    ("BEACH_SUNSET", "bg_beach_sunset.png"),
    ("DOWNTOWN_DAY", "bg_downtown_day.png"),
    ("DOWNTOWN_NIGHT", "bg_downtown_night.png"),
    ("BAR_DAY", "bg_bar_night.png"),
    ("BAR_NIGHT", "bg_bar_night.png"),
];

fn lookup(location: &str, time: TimeOfDay) -> Option<&'static str> {
    let key = format!("{}_{}", location, time.as_str());
    BACKGROUNDS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, file)| *file)
}

/// Table candidates in fallback order: exact time, night, day
fn candidates(location: &str, time: Option<TimeOfDay>) -> Vec<&'static str> {
    let location = location.trim().to_ascii_uppercase();
    let time = TimeOfDay::or_night(time);
    let mut files = Vec::new();
    for t in [time, TimeOfDay::Night, TimeOfDay::Day] {
        if let Some(file) = lookup(&location, t) {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }
    files
}

/// Background file for a location. `None` means "no location yet, keep
/// whatever is shown". Unknown locations get `DEFAULT_BACKGROUND`.
pub fn resolve_background(location: Option<&str>, time: Option<TimeOfDay>) -> Option<&'static str> {
    let location = location?;
    Some(
        candidates(location, time)
            .first()
            .copied()
            .unwrap_or(DEFAULT_BACKGROUND),
    )
}

/// Every background path worth trying for a location, ending with the default
pub fn background_chain(location: Option<&str>, time: Option<TimeOfDay>) -> Vec<String> {
    let Some(location) = location else {
        return Vec::new();
    };
    let mut chain: Vec<String> = candidates(location, time)
        .into_iter()
        .map(background_path)
        .collect();
    let fallback = background_path(DEFAULT_BACKGROUND);
    if !chain.contains(&fallback) {
        chain.push(fallback);
    }
    chain
}
