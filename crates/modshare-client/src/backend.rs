//! Remote backend boundary
//!
//! The backend is an opaque actor reached through async calls; its wire
//! protocol is out of scope. Each call runs as the identity the connection
//! was opened with. Implement [`Backend`] to plug in a real transport; the
//! in-process [`crate::MemoryBackend`] serves tests and demos.

use crate::error::RemoteError;
use async_trait::async_trait;
use modshare_core::{
    Chapter, CharacterShowcase, ExternalBlob, ModFile, ModRecord, Principal, StoryMode,
    UnlistedId, UserProfile, UserRole,
};

/// Arguments of `create_mod`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMod {
    /// Client-synthesized id (`<game-slug>-<millis>`)
    pub id: String,
    /// Mod title
    pub title: String,
    /// Long description
    pub description: String,
    /// Generation prompt
    pub prompt: String,
    /// Version label
    pub version: String,
    /// Target game
    pub game_name: String,
    /// Bundle contents
    pub files: Vec<ModFile>,
    /// Share token
    pub unlisted_id: UnlistedId,
}

/// Editable story-mode content
#[derive(Debug, Clone, PartialEq)]
pub struct StoryModeFields {
    /// Story title
    pub title: String,
    /// Story summary
    pub description: String,
    /// Game world and setting
    pub character_description: String,
    /// How players interact with the story
    pub interaction_capabilities: String,
    /// Chapters in play order
    pub chapters: Vec<Chapter>,
}

/// Editable showcase content
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseFields {
    /// Showcase title
    pub title: String,
    /// Character name
    pub character_name: String,
    /// Character description
    pub description: String,
    /// Credited author
    pub author: String,
    /// Photo media
    pub photo: Option<ExternalBlob>,
    /// Video media
    pub video: Option<ExternalBlob>,
}

/// Actor interface of the sharing platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Store a new mod owned by the caller
    async fn create_mod(&self, new_mod: NewMod) -> Result<(), RemoteError>;

    /// Fetch a mod by id
    async fn get_mod(&self, mod_id: &str) -> Result<ModRecord, RemoteError>;

    /// Fetch an enabled mod by share token
    ///
    /// Missing and disabled mods both fail with the same `NotFound`.
    async fn get_mod_by_unlisted_id(&self, unlisted_id: &UnlistedId)
        -> Result<ModRecord, RemoteError>;

    /// Mods owned by `creator`
    async fn list_mods_for_creator(&self, creator: &Principal)
        -> Result<Vec<ModRecord>, RemoteError>;

    /// Replace the files of a mod owned by the caller
    async fn update_mod_files(&self, mod_id: &str, files: Vec<ModFile>) -> Result<(), RemoteError>;

    /// Whether the mod's share link resolves
    async fn get_mod_enabled_state(&self, mod_id: &str) -> Result<bool, RemoteError>;

    /// Toggle the share link of a mod owned by the caller
    async fn set_mod_enabled_state(&self, mod_id: &str, enabled: bool) -> Result<(), RemoteError>;

    /// Profile of the caller, if saved
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, RemoteError>;

    /// Save the caller's profile
    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), RemoteError>;

    /// Role of the caller
    async fn get_caller_user_role(&self) -> Result<UserRole, RemoteError>;

    /// Store a new story mode owned by the caller
    async fn create_story_mode(
        &self,
        id: String,
        fields: StoryModeFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), RemoteError>;

    /// Fetch a story mode by id
    async fn get_story_mode(&self, story_mode_id: &str) -> Result<Option<StoryMode>, RemoteError>;

    /// All story modes
    async fn list_story_modes(&self) -> Result<Vec<StoryMode>, RemoteError>;

    /// Replace the content of a story mode owned by the caller
    async fn update_story_mode(&self, id: &str, fields: StoryModeFields)
        -> Result<(), RemoteError>;

    /// Toggle visibility of a story mode owned by the caller
    async fn update_story_mode_enabled_state(
        &self,
        story_mode_id: &str,
        enabled: bool,
    ) -> Result<(), RemoteError>;

    /// Store a new character showcase owned by the caller
    async fn create_character_showcase(
        &self,
        id: String,
        fields: ShowcaseFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), RemoteError>;

    /// Fetch a showcase by id
    async fn get_character_showcase(
        &self,
        showcase_id: &str,
    ) -> Result<Option<CharacterShowcase>, RemoteError>;

    /// Fetch a showcase by share token
    async fn get_character_showcase_by_unlisted_id(
        &self,
        unlisted_id: &UnlistedId,
    ) -> Result<CharacterShowcase, RemoteError>;

    /// All showcases
    async fn list_character_showcases(&self) -> Result<Vec<CharacterShowcase>, RemoteError>;

    /// Replace the content of a showcase owned by the caller
    async fn update_character_showcase(
        &self,
        id: &str,
        fields: ShowcaseFields,
    ) -> Result<(), RemoteError>;
}
