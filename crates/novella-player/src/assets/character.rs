//! Character sprite resolution: (outfit, emotion) → image key

use novella_common::EmotionTag;

use super::character_path;

/// `{outfit}_{emotion}`, lower-cased
pub fn resolve_character_image(outfit: &str, emotion: EmotionTag) -> String {
    format!("{}_{}", outfit.trim(), emotion.as_str()).to_lowercase()
}

/// Sprite paths in load order: requested outfit+emotion, same outfit in
/// neutral, default outfit+emotion, default outfit in neutral.
/// If none of them loads the sprite is hidden.
pub fn character_chain(outfit: &str, default_outfit: &str, emotion: EmotionTag) -> Vec<String> {
    let keys = [
        resolve_character_image(outfit, emotion),
        resolve_character_image(outfit, EmotionTag::Neutral),
        resolve_character_image(default_outfit, emotion),
        resolve_character_image(default_outfit, EmotionTag::Neutral),
    ];
    let mut chain = Vec::with_capacity(keys.len());
    for key in keys {
        let path = character_path(&key);
        if !chain.contains(&path) {
            chain.push(path);
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_folded() {
        assert_eq!(resolve_character_image("Swimsuit", EmotionTag::Shy), "swimsuit_shy");
        assert_eq!(resolve_character_image("default", EmotionTag::Neutral), "default_neutral");
    }

    #[test]
    fn chain_walks_outfit_then_default() {
        let chain = character_chain("casual", "default", EmotionTag::Joy);
        assert_eq!(
            chain,
            vec![
                "/characters/casual_joy.png",
                "/characters/casual_neutral.png",
                "/characters/default_joy.png",
                "/characters/default_neutral.png",
            ]
        );
    }

    #[test]
    fn chain_dedups_when_outfit_is_default() {
        let chain = character_chain("default", "default", EmotionTag::Neutral);
        assert_eq!(chain, vec!["/characters/default_neutral.png"]);
    }
}
