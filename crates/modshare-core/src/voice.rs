//! Voice atmosphere presets for scene narration

use serde::Serialize;

/// Speech parameters applied when narrating a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoicePreset {
    /// Stable id stored on scenes
    pub id: &'static str,
    /// Label shown in the preset picker
    pub label: &'static str,
    /// Speaking rate multiplier
    pub rate: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Volume in `0.0..=1.0`
    pub volume: f32,
}

impl VoicePreset {
    const fn new(id: &'static str, label: &'static str, rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            id,
            label,
            rate,
            pitch,
            volume,
        }
    }
}

/// Preset used when a scene names none
pub const DEFAULT_PRESET: VoicePreset = VoicePreset::new("normal", "Normal", 1.0, 1.0, 1.0);

/// All presets in picker order
pub const VOICE_PRESETS: [VoicePreset; 6] = [
    DEFAULT_PRESET,
    VoicePreset::new("calm", "Calm", 0.85, 0.9, 0.9),
    VoicePreset::new("tense", "Tense", 1.2, 1.1, 1.0),
    VoicePreset::new("mysterious", "Mysterious", 0.9, 0.85, 0.85),
    VoicePreset::new("excited", "Excited", 1.3, 1.2, 1.0),
    VoicePreset::new("somber", "Somber", 0.8, 0.8, 0.8),
];

/// Look up a preset by id
#[must_use]
pub fn preset_by_id(id: &str) -> Option<&'static VoicePreset> {
    VOICE_PRESETS.iter().find(|preset| preset.id == id)
}

/// Preset for an optional scene setting, falling back to [`DEFAULT_PRESET`]
#[must_use]
pub fn resolve_preset(id: Option<&str>) -> VoicePreset {
    id.and_then(preset_by_id).copied().unwrap_or(DEFAULT_PRESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let calm = preset_by_id("calm").unwrap();
        assert_eq!(calm.label, "Calm");
        assert!((calm.rate - 0.85).abs() < f32::EPSILON);
        assert!(preset_by_id("shouty").is_none());
    }

    #[test]
    fn unknown_or_missing_falls_back_to_normal() {
        assert_eq!(resolve_preset(None), DEFAULT_PRESET);
        assert_eq!(resolve_preset(Some("nope")), DEFAULT_PRESET);
        assert_eq!(resolve_preset(Some("somber")).id, "somber");
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = VOICE_PRESETS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), VOICE_PRESETS.len());
    }
}
