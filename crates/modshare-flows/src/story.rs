//! Story-mode editor and player
//!
//! # Editor
//!
//! Form state for a story: details plus chapters, each holding quests and
//! scenes. A new story starts with one empty chapter; numeric ids are
//! `max + 1` within their parent. Scene voice-overs can be recorded and
//! played back through the narrator.
//!
//! # Player
//!
//! Walks scenes in order, crossing chapter boundaries in both directions.

use crate::countdown::AdGate;
use crate::error::StoryError;
use crate::narrator::{Narrator, SpeechSynthesizer};
use crate::recorder::AudioRecorder;
use modshare_client::{ModshareClient, StoryModeFields};
use modshare_core::{
    ensure_quoted, generate_local_id, generate_unlisted_id, story_draft_id,
    validation::validate_story_fields, Chapter, ExternalBlob, Quest, Scene, StoryMode,
    DEFAULT_PRESET,
};

fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

/// Empty chapter with a fresh local token
#[must_use]
pub fn empty_chapter(id: u64) -> Chapter {
    Chapter {
        id,
        title: String::new(),
        quests: Vec::new(),
        scenes: Vec::new(),
        unlisted_id: generate_local_id(),
    }
}

/// Empty, incomplete quest
#[must_use]
pub fn empty_quest(id: u64) -> Quest {
    Quest {
        id,
        title: String::new(),
        description: String::new(),
        is_completed: false,
        unlisted_id: generate_local_id(),
    }
}

/// Empty scene using the default voice preset
#[must_use]
pub fn empty_scene(id: u64) -> Scene {
    Scene {
        id,
        title: String::new(),
        content: String::new(),
        voice_over: String::new(),
        has_dialogue: false,
        voice_coaching_text: String::new(),
        context: String::new(),
        audio_recording: None,
        speech_voice_preset: Some(DEFAULT_PRESET.id.to_string()),
    }
}

/// Editable story-mode form
#[derive(Debug)]
pub struct StoryEditor {
    story_id: Option<String>,
    title: String,
    description: String,
    character_description: String,
    interaction_capabilities: String,
    chapters: Vec<Chapter>,
    active_chapter: usize,
    recording_scene: Option<(usize, usize)>,
    recorder: AudioRecorder,
    last_error: Option<String>,
}

impl StoryEditor {
    /// New story with one empty chapter
    #[must_use]
    pub fn new() -> Self {
        Self {
            story_id: None,
            title: String::new(),
            description: String::new(),
            character_description: String::new(),
            interaction_capabilities: String::new(),
            chapters: vec![empty_chapter(1)],
            active_chapter: 0,
            recording_scene: None,
            recorder: AudioRecorder::new(),
            last_error: None,
        }
    }

    /// Edit an existing story
    #[must_use]
    pub fn from_story(story: &StoryMode) -> Self {
        let chapters = story
            .chapters
            .iter()
            .cloned()
            .map(|mut chapter| {
                for scene in &mut chapter.scenes {
                    scene
                        .speech_voice_preset
                        .get_or_insert_with(|| DEFAULT_PRESET.id.to_string());
                }
                chapter
            })
            .collect();

        Self {
            story_id: Some(story.id.clone()),
            title: story.title.clone(),
            description: story.description.clone(),
            character_description: story.character_description.clone(),
            interaction_capabilities: story.interaction_capabilities.clone(),
            chapters,
            ..Self::new()
        }
    }

    /// Load a story for editing
    ///
    /// # Errors
    /// `NotFound` for an unknown id, or the query failure.
    pub async fn load(client: &ModshareClient, story_id: &str) -> Result<Self, StoryError> {
        let story = client
            .story_mode(story_id)
            .await?
            .ok_or(StoryError::NotFound)?;
        Ok(Self::from_story(&story))
    }

    /// Check if saving creates a new story
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.story_id.is_none()
    }

    /// Backend id once saved or loaded
    #[inline]
    #[must_use]
    pub fn story_id(&self) -> Option<&str> {
        self.story_id.as_deref()
    }

    /// Message of the last failed save
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Story title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Set summary
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Set game world description
    pub fn set_character_description(&mut self, text: impl Into<String>) {
        self.character_description = text.into();
    }

    /// Set interaction notes
    pub fn set_interaction_capabilities(&mut self, text: impl Into<String>) {
        self.interaction_capabilities = text.into();
    }

    /// Chapters in play order
    #[inline]
    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Index of the chapter tab being edited
    #[inline]
    #[must_use]
    pub fn active_chapter_index(&self) -> usize {
        self.active_chapter
    }

    /// Chapter tab being edited
    #[must_use]
    pub fn active_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.active_chapter)
    }

    /// Switch chapter tab
    ///
    /// # Errors
    /// `NoSuchChapter` for an out-of-range index.
    pub fn set_active_chapter(&mut self, index: usize) -> Result<(), StoryError> {
        if index >= self.chapters.len() {
            return Err(StoryError::NoSuchChapter(index));
        }
        self.active_chapter = index;
        Ok(())
    }

    /// Append a chapter and switch to it; returns its id
    pub fn add_chapter(&mut self) -> u64 {
        let id = next_id(self.chapters.iter().map(|c| c.id));
        self.chapters.push(empty_chapter(id));
        self.active_chapter = self.chapters.len() - 1;
        id
    }

    /// Remove a chapter, keeping at least one
    ///
    /// # Errors
    /// `LastChapter` when only one is left, `NoSuchChapter` for a bad index.
    pub fn remove_chapter(&mut self, index: usize) -> Result<Chapter, StoryError> {
        if index >= self.chapters.len() {
            return Err(StoryError::NoSuchChapter(index));
        }
        if self.chapters.len() == 1 {
            return Err(StoryError::LastChapter);
        }
        let removed = self.chapters.remove(index);
        if self.active_chapter >= self.chapters.len() {
            self.active_chapter = self.chapters.len().saturating_sub(1);
        }
        if self.recording_scene.is_some_and(|(c, _)| c == index) {
            self.cancel_recording();
        }
        Ok(removed)
    }

    /// Chapter for editing its title
    ///
    /// # Errors
    /// `NoSuchChapter` for a bad index.
    pub fn chapter_mut(&mut self, index: usize) -> Result<&mut Chapter, StoryError> {
        self.chapters
            .get_mut(index)
            .ok_or(StoryError::NoSuchChapter(index))
    }

    /// Append a quest; returns its id
    ///
    /// # Errors
    /// `NoSuchChapter` for a bad index.
    pub fn add_quest(&mut self, chapter: usize) -> Result<u64, StoryError> {
        let target = self.chapter_mut(chapter)?;
        let id = next_id(target.quests.iter().map(|q| q.id));
        target.quests.push(empty_quest(id));
        Ok(id)
    }

    /// Remove a quest
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn remove_quest(&mut self, chapter: usize, quest: usize) -> Result<Quest, StoryError> {
        let target = self.chapter_mut(chapter)?;
        if quest >= target.quests.len() {
            return Err(no_such("quest", chapter, quest));
        }
        Ok(target.quests.remove(quest))
    }

    /// Quest for editing
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn quest_mut(&mut self, chapter: usize, quest: usize) -> Result<&mut Quest, StoryError> {
        self.chapter_mut(chapter)?
            .quests
            .get_mut(quest)
            .ok_or_else(|| no_such("quest", chapter, quest))
    }

    /// Append a scene; returns its id
    ///
    /// # Errors
    /// `NoSuchChapter` for a bad index.
    pub fn add_scene(&mut self, chapter: usize) -> Result<u64, StoryError> {
        let target = self.chapter_mut(chapter)?;
        let id = next_id(target.scenes.iter().map(|s| s.id));
        target.scenes.push(empty_scene(id));
        Ok(id)
    }

    /// Remove a scene
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn remove_scene(&mut self, chapter: usize, scene: usize) -> Result<Scene, StoryError> {
        let target = self.chapter_mut(chapter)?;
        if scene >= target.scenes.len() {
            return Err(no_such("scene", chapter, scene));
        }
        let removed = target.scenes.remove(scene);
        if self.recording_scene == Some((chapter, scene)) {
            self.cancel_recording();
        }
        Ok(removed)
    }

    /// Scene for editing
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn scene_mut(&mut self, chapter: usize, scene: usize) -> Result<&mut Scene, StoryError> {
        self.chapter_mut(chapter)?
            .scenes
            .get_mut(scene)
            .ok_or_else(|| no_such("scene", chapter, scene))
    }

    fn scene(&self, chapter: usize, scene: usize) -> Result<&Scene, StoryError> {
        self.chapters
            .get(chapter)
            .ok_or(StoryError::NoSuchChapter(chapter))?
            .scenes
            .get(scene)
            .ok_or_else(|| no_such("scene", chapter, scene))
    }

    /// Pick the voice preset of a scene
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn set_scene_preset(
        &mut self,
        chapter: usize,
        scene: usize,
        preset_id: impl Into<String>,
    ) -> Result<(), StoryError> {
        self.scene_mut(chapter, scene)?.speech_voice_preset = Some(preset_id.into());
        Ok(())
    }

    /// Scene the recorder is attached to
    #[inline]
    #[must_use]
    pub fn recording_scene(&self) -> Option<(usize, usize)> {
        self.recording_scene
    }

    /// Recorder for pushing audio and stopping the take
    #[inline]
    pub fn recorder_mut(&mut self) -> &mut AudioRecorder {
        &mut self.recorder
    }

    /// Start a fresh take for a scene
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn start_recording(&mut self, chapter: usize, scene: usize) -> Result<(), StoryError> {
        self.scene(chapter, scene)?;
        self.recorder.clear();
        self.recorder.start()?;
        self.recording_scene = Some((chapter, scene));
        Ok(())
    }

    /// Attach the finished take to a scene
    ///
    /// # Errors
    /// `NoRecording` when there is no finished take, or a bad index.
    pub fn save_recording(&mut self, chapter: usize, scene: usize) -> Result<(), StoryError> {
        let blob = self.recorder.recording().ok_or(StoryError::NoRecording)?;
        self.scene_mut(chapter, scene)?.audio_recording = Some(blob);
        self.recording_scene = None;
        self.recorder.clear();
        tracing::debug!(chapter, scene, "Recording saved");
        Ok(())
    }

    /// Throw the take away
    pub fn cancel_recording(&mut self) {
        self.recording_scene = None;
        self.recorder.clear();
    }

    /// Detach a scene's recording
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn remove_recording(
        &mut self,
        chapter: usize,
        scene: usize,
    ) -> Result<Option<ExternalBlob>, StoryError> {
        Ok(self.scene_mut(chapter, scene)?.audio_recording.take())
    }

    /// Play a scene's voice-over, or stop it if playing
    ///
    /// # Errors
    /// `NoSuchChapter` or `NoSuchItem` for bad indexes.
    pub fn play_dialogue<S: SpeechSynthesizer>(
        &self,
        narrator: &mut Narrator<S>,
        chapter: usize,
        scene: usize,
    ) -> Result<bool, StoryError> {
        let scene = self.scene(chapter, scene)?;
        Ok(narrator.toggle_dialogue(&scene.voice_over, scene.speech_voice_preset.as_deref()))
    }

    /// Payload for create and update
    #[must_use]
    pub fn fields(&self) -> StoryModeFields {
        StoryModeFields {
            title: self.title.clone(),
            description: self.description.clone(),
            character_description: self.character_description.clone(),
            interaction_capabilities: self.interaction_capabilities.clone(),
            chapters: self.chapters.clone(),
        }
    }

    /// Create or update the story
    ///
    /// On success the editor switches to update mode and returns the ad
    /// gate holding the story id.
    ///
    /// # Errors
    /// `Invalid` or `NoChapters` before any call, or the backend failure.
    pub async fn save(
        &mut self,
        client: &ModshareClient,
    ) -> Result<AdGate<String>, StoryError> {
        self.last_error = None;
        validate_story_fields(&self.title, &self.description)?;
        if self.chapters.is_empty() {
            return Err(StoryError::NoChapters);
        }

        let fields = self.fields();
        let result = match &self.story_id {
            Some(id) => client.update_story_mode(id, fields).await.map(|()| id.clone()),
            None => {
                let id = story_draft_id(chrono::Utc::now().timestamp_millis());
                client
                    .create_story_mode(id.clone(), fields, generate_unlisted_id())
                    .await
                    .map(|()| id)
            }
        };

        match result {
            Ok(id) => {
                tracing::info!(story_id = %id, "Story saved successfully");
                self.story_id = Some(id.clone());
                Ok(AdGate::open_for(id, client.config().ad_duration()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save story");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

impl Default for StoryEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn no_such(kind: &'static str, chapter: usize, index: usize) -> StoryError {
    StoryError::NoSuchItem {
        kind,
        chapter,
        index,
    }
}

/// Scene-by-scene story playback
#[derive(Debug, Clone)]
pub struct StoryPlayer {
    story: StoryMode,
    chapter: usize,
    scene: usize,
}

impl StoryPlayer {
    /// Start at the first scene
    #[inline]
    #[must_use]
    pub fn new(story: StoryMode) -> Self {
        Self {
            story,
            chapter: 0,
            scene: 0,
        }
    }

    /// Load a story for playback
    ///
    /// # Errors
    /// `NotFound` for an unknown id, or the query failure.
    pub async fn load(client: &ModshareClient, story_id: &str) -> Result<Self, StoryError> {
        let story = client
            .story_mode(story_id)
            .await?
            .ok_or(StoryError::NotFound)?;
        Ok(Self::new(story))
    }

    /// Story being played
    #[inline]
    #[must_use]
    pub fn story(&self) -> &StoryMode {
        &self.story
    }

    /// Chapter and scene indexes
    #[inline]
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.chapter, self.scene)
    }

    /// Current chapter
    #[must_use]
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.story.chapters.get(self.chapter)
    }

    /// Current scene; `None` for an empty chapter
    #[must_use]
    pub fn current_scene(&self) -> Option<&Scene> {
        self.current_chapter()?.scenes.get(self.scene)
    }

    fn has_next_scene(&self) -> bool {
        self.current_chapter()
            .is_some_and(|c| self.scene + 1 < c.scenes.len())
    }

    fn has_next_chapter(&self) -> bool {
        self.chapter + 1 < self.story.chapters.len()
    }

    /// Check if `next` moves
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next_scene() || self.has_next_chapter()
    }

    /// Check if `prev` moves
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.scene > 0 || self.chapter > 0
    }

    /// Next scene, or the first scene of the next chapter
    pub fn next(&mut self) -> bool {
        if self.has_next_scene() {
            self.scene += 1;
        } else if self.has_next_chapter() {
            self.chapter += 1;
            self.scene = 0;
        } else {
            return false;
        }
        true
    }

    /// Previous scene, or the last scene of the previous chapter
    pub fn prev(&mut self) -> bool {
        if self.scene > 0 {
            self.scene -= 1;
        } else if self.chapter > 0 {
            self.chapter -= 1;
            self.scene = self.story.chapters[self.chapter]
                .scenes
                .len()
                .saturating_sub(1);
        } else {
            return false;
        }
        true
    }

    /// `"Chapter 2 of 3"`
    #[must_use]
    pub fn chapter_label(&self) -> String {
        format!("Chapter {} of {}", self.chapter + 1, self.story.chapters.len())
    }

    /// `"Scene 1 of 4"`
    #[must_use]
    pub fn scene_label(&self) -> String {
        let total = self.current_chapter().map_or(0, |c| c.scenes.len());
        format!("Scene {} of {}", self.scene + 1, total)
    }

    /// Voice-over as printed, in quotes
    #[must_use]
    pub fn dialogue_text(&self) -> Option<String> {
        self.current_scene()
            .filter(|s| !s.voice_over.trim().is_empty())
            .map(|s| ensure_quoted(&s.voice_over))
    }

    /// Speak the current voice-over, or stop it
    pub fn play_dialogue<S: SpeechSynthesizer>(&self, narrator: &mut Narrator<S>) -> bool {
        match self.current_scene() {
            Some(scene) => {
                narrator.toggle_dialogue(&scene.voice_over, scene.speech_voice_preset.as_deref())
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modshare_core::Principal;
    use pretty_assertions::assert_eq;

    fn story(scene_counts: &[usize]) -> StoryMode {
        let chapters = scene_counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut chapter = empty_chapter(i as u64 + 1);
                chapter.scenes = (1..=count as u64).map(empty_scene).collect();
                chapter
            })
            .collect();
        StoryMode {
            id: "story-1".into(),
            title: "The Long Night".into(),
            creator: Principal::new("alice"),
            description: "Survive until dawn".into(),
            character_description: String::new(),
            interaction_capabilities: String::new(),
            chapters,
            unlisted_id: generate_unlisted_id(),
            enabled: true,
        }
    }

    #[test]
    fn new_story_has_one_chapter() {
        let editor = StoryEditor::new();
        assert!(editor.is_new());
        assert_eq!(editor.chapters().len(), 1);
        assert_eq!(editor.chapters()[0].id, 1);
    }

    #[test]
    fn ids_are_max_plus_one() {
        let mut editor = StoryEditor::new();
        assert_eq!(editor.add_chapter(), 2);
        assert_eq!(editor.active_chapter_index(), 1);
        assert_eq!(editor.add_chapter(), 3);
        editor.remove_chapter(1).unwrap();
        assert_eq!(editor.add_chapter(), 4);

        assert_eq!(editor.add_scene(0).unwrap(), 1);
        assert_eq!(editor.add_scene(0).unwrap(), 2);
        editor.remove_scene(0, 0).unwrap();
        assert_eq!(editor.add_scene(0).unwrap(), 3);
        assert_eq!(editor.add_quest(0).unwrap(), 1);
        assert_eq!(
            editor.chapters()[0].scenes[0].speech_voice_preset.as_deref(),
            Some("normal")
        );
    }

    #[test]
    fn last_chapter_stays_and_active_index_clamps() {
        let mut editor = StoryEditor::new();
        assert_eq!(editor.remove_chapter(0).unwrap_err(), StoryError::LastChapter);

        editor.add_chapter();
        editor.add_chapter();
        assert_eq!(editor.active_chapter_index(), 2);
        editor.remove_chapter(2).unwrap();
        assert_eq!(editor.active_chapter_index(), 1);
        assert_eq!(editor.remove_chapter(5).unwrap_err(), StoryError::NoSuchChapter(5));
    }

    #[test]
    fn recording_attaches_to_scene() {
        let mut editor = StoryEditor::new();
        editor.add_scene(0).unwrap();
        assert_eq!(editor.save_recording(0, 0), Err(StoryError::NoRecording));

        editor.start_recording(0, 0).unwrap();
        editor.recorder_mut().push_chunk(vec![7u8; 16]);
        editor.recorder_mut().stop().unwrap();
        editor.save_recording(0, 0).unwrap();

        assert!(editor.recording_scene().is_none());
        assert!(editor.chapters()[0].scenes[0].audio_recording.is_some());
        assert!(editor.remove_recording(0, 0).unwrap().is_some());
        assert!(editor.chapters()[0].scenes[0].audio_recording.is_none());
    }

    #[test]
    fn loaded_scenes_default_to_normal_preset() {
        let mut loaded = story(&[1]);
        loaded.chapters[0].scenes[0].speech_voice_preset = None;
        let editor = StoryEditor::from_story(&loaded);
        assert!(!editor.is_new());
        assert_eq!(
            editor.chapters()[0].scenes[0].speech_voice_preset.as_deref(),
            Some("normal")
        );
    }

    #[test]
    fn player_crosses_chapter_boundaries() {
        let mut player = StoryPlayer::new(story(&[2, 0, 3]));
        assert!(!player.has_prev());
        assert!(player.next());
        assert_eq!(player.position(), (0, 1));
        assert!(player.next());
        assert_eq!(player.position(), (1, 0));
        assert!(player.current_scene().is_none());
        assert!(player.next());
        assert_eq!(player.position(), (2, 0));

        assert!(player.prev());
        assert_eq!(player.position(), (1, 0));
        assert!(player.prev());
        assert_eq!(player.position(), (0, 1));
        assert_eq!(player.chapter_label(), "Chapter 1 of 3");
        assert_eq!(player.scene_label(), "Scene 2 of 2");
    }

    #[test]
    fn player_stops_at_the_end() {
        let mut player = StoryPlayer::new(story(&[1]));
        assert!(!player.has_next());
        assert!(!player.next());
        assert!(!player.prev());
    }

    #[test]
    fn dialogue_is_quoted_for_display() {
        let mut played = story(&[1]);
        played.chapters[0].scenes[0].voice_over = "Hold the line".into();
        let player = StoryPlayer::new(played);
        assert_eq!(player.dialogue_text().as_deref(), Some("\"Hold the line\""));
    }
}
