//! Core records for modshare
//!
//! Defines the data exchanged with the remote backend:
//! - Identities and profiles
//! - Mod drafts (client-only) and published mod records
//! - Story modes with their chapters, quests and scenes
//! - Character showcases

use crate::blob::ExternalBlob;
use crate::composer::FileComposer;
use crate::unlisted::{ALPHABET, UNLISTED_ID_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity principal of a caller or creator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Textual form used by the identity provider for unauthenticated callers
    pub const ANONYMOUS: &'static str = "2vxsx-fae";

    /// Wrap a principal's textual form
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The anonymous principal
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Check if this is the anonymous principal
    #[inline]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    /// Get textual form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque 32-character share token embedded in unlisted links
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnlistedId(String);

impl UnlistedId {
    /// Get token text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an already generated token without re-checking it
    #[inline]
    pub(crate) fn from_generated(token: String) -> Self {
        debug_assert_eq!(token.len(), UNLISTED_ID_LEN);
        Self(token)
    }
}

/// Rejected unlisted token text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnlistedIdError {
    /// Wrong number of characters
    #[error("unlisted id must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    /// Character outside `[A-Za-z0-9]`
    #[error("unlisted id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

impl FromStr for UnlistedId {
    type Err = UnlistedIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.chars().find(|c| !c.is_ascii() || !ALPHABET.contains(&(*c as u8))) {
            return Err(UnlistedIdError::InvalidCharacter(c));
        }
        if s.len() != UNLISTED_ID_LEN {
            return Err(UnlistedIdError::Length {
                expected: UNLISTED_ID_LEN,
                actual: s.len(),
            });
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for UnlistedId {
    type Error = UnlistedIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UnlistedId> for String {
    fn from(id: UnlistedId) -> Self {
        id.0
    }
}

impl fmt::Display for UnlistedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller profile stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name
    pub name: String,
}

impl UserProfile {
    /// Create profile
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Access role assigned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator
    Admin,
    /// Signed-in user
    User,
    /// Anonymous visitor
    #[default]
    Guest,
}

impl UserRole {
    /// Check if the role may create content
    #[inline]
    #[must_use]
    pub fn can_create(&self) -> bool {
        matches!(self, Self::Admin | Self::User)
    }
}

/// One named file of a mod bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModFile {
    /// File name shown to downloaders
    pub filename: String,
    /// MIME type
    pub content_type: String,
    /// Raw bytes
    pub content: Vec<u8>,
}

impl ModFile {
    /// Create file entry
    #[inline]
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Check if this is an app-created text file
    #[inline]
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.content_type == crate::limits::TEXT_CONTENT_TYPE
    }
}

/// In-progress mod accumulated by the creation wizard
///
/// Lives only on the client. Each wizard step mutates its own fields; the
/// whole draft is read once at publish time and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModDraft {
    /// Game the mod targets
    pub game_name: String,
    /// Mod title
    pub title: String,
    /// Version label
    pub version: String,
    /// Long description
    pub description: String,
    /// Prompt the mod was generated from
    pub prompt: String,
    /// Attached files
    pub files: FileComposer,
}

impl ModDraft {
    /// Version pre-filled when a wizard opens
    pub const DEFAULT_VERSION: &'static str = "1.0.0";

    /// Create empty draft
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for ModDraft {
    fn default() -> Self {
        Self {
            game_name: String::new(),
            title: String::new(),
            version: Self::DEFAULT_VERSION.to_string(),
            description: String::new(),
            prompt: String::new(),
            files: FileComposer::new(),
        }
    }
}

/// Published mod as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModRecord {
    /// Backend identifier
    pub id: String,
    /// Mod title
    pub title: String,
    /// Long description
    pub description: String,
    /// Generation prompt
    pub prompt: String,
    /// Version label
    pub version: String,
    /// Owner
    pub creator: Principal,
    /// Target game
    pub game_name: String,
    /// Bundle contents
    pub files: Vec<ModFile>,
    /// Share token
    pub unlisted_id: UnlistedId,
    /// Whether the share link resolves
    pub enabled: bool,
}

/// Quest inside a chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quest {
    /// Position-independent numeric id, unique within the chapter
    pub id: u64,
    /// Quest title
    pub title: String,
    /// Quest description
    pub description: String,
    /// Completion flag
    pub is_completed: bool,
    /// Local share token
    pub unlisted_id: String,
}

/// Scene inside a chapter
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Numeric id, unique within the chapter
    pub id: u64,
    /// Scene title
    pub title: String,
    /// Narrative text
    pub content: String,
    /// Text read aloud by the narrator
    pub voice_over: String,
    /// Whether the voice-over is spoken dialogue
    pub has_dialogue: bool,
    /// Delivery notes for voice actors
    pub voice_coaching_text: String,
    /// Setting notes
    pub context: String,
    /// Recorded narration
    pub audio_recording: Option<ExternalBlob>,
    /// Voice atmosphere preset id
    pub speech_voice_preset: Option<String>,
}

/// Chapter of a story mode
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    /// Numeric id, unique within the story
    pub id: u64,
    /// Chapter title
    pub title: String,
    /// Chapter quests
    pub quests: Vec<Quest>,
    /// Chapter scenes in play order
    pub scenes: Vec<Scene>,
    /// Local share token
    pub unlisted_id: String,
}

/// Interactive narrative owned by a creator
#[derive(Debug, Clone, PartialEq)]
pub struct StoryMode {
    /// Backend identifier
    pub id: String,
    /// Story title
    pub title: String,
    /// Owner
    pub creator: Principal,
    /// Story summary
    pub description: String,
    /// Game world and setting
    pub character_description: String,
    /// How players interact with the story
    pub interaction_capabilities: String,
    /// Chapters in play order
    pub chapters: Vec<Chapter>,
    /// Share token
    pub unlisted_id: UnlistedId,
    /// Whether the story is visible
    pub enabled: bool,
}

/// Character presented with a photo or a video
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterShowcase {
    /// Backend identifier
    pub id: String,
    /// Showcase title
    pub title: String,
    /// Owner
    pub creator: Principal,
    /// Character name
    pub character_name: String,
    /// Character description
    pub description: String,
    /// Credited author
    pub author: String,
    /// Photo, when the media is an image
    pub photo: Option<ExternalBlob>,
    /// Video, when the media is a video
    pub video: Option<ExternalBlob>,
    /// Share token
    pub unlisted_id: UnlistedId,
}
