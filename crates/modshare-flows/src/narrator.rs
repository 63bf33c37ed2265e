//! Text-to-speech for scene voice-overs
//!
//! The platform speech engine sits behind [`SpeechSynthesizer`]; the
//! [`Narrator`] adds the play/stop toggle and the voice presets.

use modshare_core::{resolve_preset, strip_quotes, VoicePreset};

/// Rate, pitch and volume for one utterance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechOptions {
    /// Speaking rate, 1.0 is normal
    pub rate: f32,
    /// Pitch, 1.0 is normal
    pub pitch: f32,
    /// Volume in `0.0..=1.0`
    pub volume: f32,
}

impl From<&VoicePreset> for SpeechOptions {
    fn from(preset: &VoicePreset) -> Self {
        Self {
            rate: preset.rate,
            pitch: preset.pitch,
            volume: preset.volume,
        }
    }
}

/// Platform speech engine
#[cfg_attr(test, mockall::automock)]
pub trait SpeechSynthesizer: Send + Sync {
    /// Check if speech is supported at all
    fn is_available(&self) -> bool;

    /// Start speaking
    fn speak(&self, text: &str, options: SpeechOptions);

    /// Stop any utterance in progress
    fn cancel(&self);
}

/// Play/stop toggle over a speech engine
#[derive(Debug)]
pub struct Narrator<S> {
    synth: S,
    speaking: bool,
}

impl<S: SpeechSynthesizer> Narrator<S> {
    /// Create narrator
    #[inline]
    #[must_use]
    pub fn new(synth: S) -> Self {
        Self {
            synth,
            speaking: false,
        }
    }

    /// Check if speech is supported
    #[inline]
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.synth.is_available()
    }

    /// Check if an utterance is playing
    #[inline]
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Speak `text`, cancelling whatever was playing
    ///
    /// Returns `false` when speech is unsupported or there is nothing to say.
    pub fn speak(&mut self, text: &str, options: SpeechOptions) -> bool {
        if !self.synth.is_available() || text.trim().is_empty() {
            return false;
        }
        self.synth.cancel();
        self.synth.speak(text, options);
        self.speaking = true;
        true
    }

    /// Stop speaking
    pub fn stop(&mut self) {
        if self.synth.is_available() {
            self.synth.cancel();
        }
        self.speaking = false;
    }

    /// Engine reported the utterance ended
    pub fn finished(&mut self) {
        self.speaking = false;
    }

    /// Play a scene's dialogue, or stop it if already playing
    ///
    /// Surrounding quotes are not read aloud. Returns whether speech is
    /// playing afterwards.
    pub fn toggle_dialogue(&mut self, dialogue: &str, preset_id: Option<&str>) -> bool {
        if self.speaking {
            self.stop();
            return false;
        }
        let preset = resolve_preset(preset_id);
        self.speak(strip_quotes(dialogue), SpeechOptions::from(&preset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{always, eq};

    #[test]
    fn toggle_speaks_unquoted_text_with_preset() {
        let mut synth = MockSpeechSynthesizer::new();
        synth.expect_is_available().return_const(true);
        synth.expect_cancel().times(2).return_const(());
        synth
            .expect_speak()
            .with(
                eq("Who goes there?"),
                eq(SpeechOptions {
                    rate: 0.9,
                    pitch: 0.85,
                    volume: 0.85,
                }),
            )
            .times(1)
            .return_const(());

        let mut narrator = Narrator::new(synth);
        assert!(narrator.toggle_dialogue("\"Who goes there?\"", Some("mysterious")));
        assert!(narrator.is_speaking());

        assert!(!narrator.toggle_dialogue("\"Who goes there?\"", Some("mysterious")));
        assert!(!narrator.is_speaking());
    }

    #[test]
    fn unsupported_engine_stays_silent() {
        let mut synth = MockSpeechSynthesizer::new();
        synth.expect_is_available().return_const(false);
        synth.expect_speak().with(always(), always()).never();

        let mut narrator = Narrator::new(synth);
        assert!(!narrator.is_supported());
        assert!(!narrator.toggle_dialogue("Hello", None));
        assert!(!narrator.is_speaking());
    }

    #[test]
    fn finished_clears_speaking() {
        let mut synth = MockSpeechSynthesizer::new();
        synth.expect_is_available().return_const(true);
        synth.expect_cancel().return_const(());
        synth.expect_speak().return_const(());

        let mut narrator = Narrator::new(synth);
        assert!(narrator.speak("Dawn breaks", SpeechOptions::from(&modshare_core::DEFAULT_PRESET)));
        narrator.finished();
        assert!(!narrator.is_speaking());
        assert!(!narrator.speak("   ", SpeechOptions::from(&modshare_core::DEFAULT_PRESET)));
    }
}
