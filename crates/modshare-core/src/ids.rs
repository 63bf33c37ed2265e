//! Draft identifiers
//!
//! Backend ids are synthesized client-side from a creation timestamp in
//! milliseconds; chapters and quests carry a short local token.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static NON_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9]+").expect("slug pattern compiles"));

const LOCAL_ID_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Id of a new mod: slug of the game name plus the timestamp
///
/// `"Minecraft: Java"` at `1700000000000` becomes
/// `"minecraft-java-1700000000000"`.
#[must_use]
pub fn mod_draft_id(game_name: &str, timestamp_ms: i64) -> String {
    let lower = game_name.to_lowercase();
    let slug = NON_SLUG.replace_all(&lower, "-");
    format!("{slug}-{timestamp_ms}")
}

/// Id of a new story mode
#[inline]
#[must_use]
pub fn story_draft_id(timestamp_ms: i64) -> String {
    format!("story-{timestamp_ms}")
}

/// Id of a new character showcase
#[inline]
#[must_use]
pub fn showcase_draft_id(timestamp_ms: i64) -> String {
    format!("showcase-{timestamp_ms}")
}

/// Short lowercase token for chapters and quests
#[must_use]
pub fn generate_local_id() -> String {
    let mut rng = rand::rng();
    (0..LOCAL_ID_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect()
}
