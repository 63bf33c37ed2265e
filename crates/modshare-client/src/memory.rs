//! In-process backend
//!
//! Keeps every record in one shared store. Each [`MemoryBackend`] handle is
//! a view bound to one caller principal, so several identities can talk to
//! the same store the way browsers share one remote actor.
//!
//! Rules enforced here:
//! - anonymous callers cannot create content
//! - only the creator may mutate a record
//! - record ids and share tokens are unique per record kind
//! - missing and disabled mods both read as `"Mod not found"` by share token

use crate::backend::{Backend, NewMod, ShowcaseFields, StoryModeFields};
use crate::error::RemoteError;
use async_trait::async_trait;
use modshare_core::{
    CharacterShowcase, ExternalBlob, ModFile, ModRecord, Principal, StoryMode, UnlistedId,
    UserProfile, UserRole,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const MOD_NOT_FOUND: &str = "Mod not found";
const STORY_NOT_FOUND: &str = "Story mode not found";
const SHOWCASE_NOT_FOUND: &str = "Character showcase not found";

/// Upload progress is reported once per chunk of this many bytes
const UPLOAD_CHUNK: usize = 64 * 1024;

#[derive(Default)]
struct Store {
    mods: Vec<ModRecord>,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
    story_modes: Vec<StoryMode>,
    showcases: Vec<CharacterShowcase>,
}

impl Store {
    fn role_of(&self, principal: &Principal) -> UserRole {
        match self.roles.get(principal) {
            Some(role) => *role,
            None if principal.is_anonymous() => UserRole::Guest,
            None => UserRole::User,
        }
    }
}

/// Shared in-memory backend, viewed as one caller
#[derive(Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<Store>>,
    faults: Arc<Mutex<VecDeque<RemoteError>>>,
    calls: Arc<AtomicUsize>,
    caller: Principal,
}

impl MemoryBackend {
    /// Create empty store viewed by the anonymous principal
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::default(),
            faults: Arc::default(),
            calls: Arc::default(),
            caller: Principal::anonymous(),
        }
    }

    /// View of the same store as another caller
    #[must_use]
    pub fn as_caller(&self, caller: Principal) -> Self {
        Self {
            caller,
            ..self.clone()
        }
    }

    /// Principal this view calls as
    #[inline]
    #[must_use]
    pub fn caller(&self) -> &Principal {
        &self.caller
    }

    /// Assign a role to a principal
    pub fn assign_role(&self, principal: Principal, role: UserRole) {
        self.store.write().roles.insert(principal, role);
    }

    /// Fail the next call with `error`
    ///
    /// Queued failures are consumed in order, one per call, by any view of
    /// the store.
    pub fn fail_next(&self, error: RemoteError) {
        self.faults.lock().push_back(error);
    }

    /// Number of calls received by all views
    #[inline]
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored mods
    #[must_use]
    pub fn mod_count(&self) -> usize {
        self.store.read().mods.len()
    }

    fn enter(&self, op: &'static str) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.faults.lock().pop_front() {
            Some(error) => {
                tracing::debug!(op, %error, "injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn require_creator_role(&self, store: &Store, what: &str) -> Result<(), RemoteError> {
        if store.role_of(&self.caller).can_create() {
            Ok(())
        } else {
            Err(RemoteError::Unauthorized(format!("Only users can create {what}")))
        }
    }

    fn require_owner(&self, owner: &Principal, what: &str) -> Result<(), RemoteError> {
        if owner == &self.caller {
            Ok(())
        } else {
            Err(RemoteError::Unauthorized(format!(
                "Only the creator can update this {what}"
            )))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("caller", &self.caller)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

fn check_new_story(store: &Store, id: &str, unlisted_id: &UnlistedId) -> Result<(), RemoteError> {
    if store.story_modes.iter().any(|s| s.id == id) {
        return Err(RemoteError::Rejected("Story mode with this ID already exists".into()));
    }
    if store.story_modes.iter().any(|s| &s.unlisted_id == unlisted_id) {
        return Err(RemoteError::Rejected("Unlisted ID already in use".into()));
    }
    Ok(())
}

fn check_new_showcase(
    store: &Store,
    id: &str,
    unlisted_id: &UnlistedId,
) -> Result<(), RemoteError> {
    if store.showcases.iter().any(|s| s.id == id) {
        return Err(RemoteError::Rejected(
            "Character showcase with this ID already exists".into(),
        ));
    }
    if store.showcases.iter().any(|s| &s.unlisted_id == unlisted_id) {
        return Err(RemoteError::Rejected("Unlisted ID already in use".into()));
    }
    Ok(())
}

/// Report chunked progress for a blob being stored
///
/// Runs with no store lock held; observers may call back into the backend.
fn ingest(blob: &ExternalBlob) {
    let Some(total) = blob.len() else {
        return;
    };
    if total == 0 {
        blob.notify_progress(100);
        return;
    }
    let mut stored = 0usize;
    while stored < total {
        stored = (stored + UPLOAD_CHUNK).min(total);
        let pct = u8::try_from(stored * 100 / total).unwrap_or(100);
        blob.notify_progress(pct);
    }
}

fn ingest_story(fields: &StoryModeFields) {
    fields
        .chapters
        .iter()
        .flat_map(|chapter| &chapter.scenes)
        .filter_map(|scene| scene.audio_recording.as_ref())
        .for_each(ingest);
}

fn ingest_showcase(fields: &ShowcaseFields) {
    fields.photo.iter().chain(&fields.video).for_each(ingest);
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_mod(&self, new_mod: NewMod) -> Result<(), RemoteError> {
        self.enter("create_mod")?;
        let mut store = self.store.write();
        self.require_creator_role(&store, "mods")?;

        if store.mods.iter().any(|m| m.id == new_mod.id) {
            return Err(RemoteError::Rejected("Mod with this ID already exists".into()));
        }
        if store.mods.iter().any(|m| m.unlisted_id == new_mod.unlisted_id) {
            return Err(RemoteError::Rejected("Unlisted ID already in use".into()));
        }

        tracing::debug!(mod_id = %new_mod.id, files = new_mod.files.len(), "mod stored");
        store.mods.push(ModRecord {
            id: new_mod.id,
            title: new_mod.title,
            description: new_mod.description,
            prompt: new_mod.prompt,
            version: new_mod.version,
            creator: self.caller.clone(),
            game_name: new_mod.game_name,
            files: new_mod.files,
            unlisted_id: new_mod.unlisted_id,
            enabled: true,
        });
        Ok(())
    }

    async fn get_mod(&self, mod_id: &str) -> Result<ModRecord, RemoteError> {
        self.enter("get_mod")?;
        self.store
            .read()
            .mods
            .iter()
            .find(|m| m.id == mod_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(MOD_NOT_FOUND.into()))
    }

    async fn get_mod_by_unlisted_id(
        &self,
        unlisted_id: &UnlistedId,
    ) -> Result<ModRecord, RemoteError> {
        self.enter("get_mod_by_unlisted_id")?;
        self.store
            .read()
            .mods
            .iter()
            .find(|m| &m.unlisted_id == unlisted_id && m.enabled)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(MOD_NOT_FOUND.into()))
    }

    async fn list_mods_for_creator(
        &self,
        creator: &Principal,
    ) -> Result<Vec<ModRecord>, RemoteError> {
        self.enter("list_mods_for_creator")?;
        Ok(self
            .store
            .read()
            .mods
            .iter()
            .filter(|m| &m.creator == creator)
            .cloned()
            .collect())
    }

    async fn update_mod_files(&self, mod_id: &str, files: Vec<ModFile>) -> Result<(), RemoteError> {
        self.enter("update_mod_files")?;
        let mut store = self.store.write();
        let record = store
            .mods
            .iter_mut()
            .find(|m| m.id == mod_id)
            .ok_or_else(|| RemoteError::NotFound(MOD_NOT_FOUND.into()))?;
        self.require_owner(&record.creator, "mod")?;
        record.files = files;
        Ok(())
    }

    async fn get_mod_enabled_state(&self, mod_id: &str) -> Result<bool, RemoteError> {
        self.enter("get_mod_enabled_state")?;
        self.store
            .read()
            .mods
            .iter()
            .find(|m| m.id == mod_id)
            .map(|m| m.enabled)
            .ok_or_else(|| RemoteError::NotFound(MOD_NOT_FOUND.into()))
    }

    async fn set_mod_enabled_state(&self, mod_id: &str, enabled: bool) -> Result<(), RemoteError> {
        self.enter("set_mod_enabled_state")?;
        let mut store = self.store.write();
        let record = store
            .mods
            .iter_mut()
            .find(|m| m.id == mod_id)
            .ok_or_else(|| RemoteError::NotFound(MOD_NOT_FOUND.into()))?;
        self.require_owner(&record.creator, "mod")?;
        record.enabled = enabled;
        Ok(())
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, RemoteError> {
        self.enter("get_caller_user_profile")?;
        Ok(self.store.read().profiles.get(&self.caller).cloned())
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), RemoteError> {
        self.enter("save_caller_user_profile")?;
        let mut store = self.store.write();
        if self.caller.is_anonymous() {
            return Err(RemoteError::Unauthorized(
                "Only users can save profiles".into(),
            ));
        }
        store.profiles.insert(self.caller.clone(), profile);
        Ok(())
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, RemoteError> {
        self.enter("get_caller_user_role")?;
        Ok(self.store.read().role_of(&self.caller))
    }

    async fn create_story_mode(
        &self,
        id: String,
        fields: StoryModeFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), RemoteError> {
        self.enter("create_story_mode")?;
        {
            let store = self.store.read();
            self.require_creator_role(&store, "story modes")?;
            check_new_story(&store, &id, &unlisted_id)?;
        }

        ingest_story(&fields);
        let mut store = self.store.write();
        check_new_story(&store, &id, &unlisted_id)?;
        store.story_modes.push(StoryMode {
            id,
            title: fields.title,
            creator: self.caller.clone(),
            description: fields.description,
            character_description: fields.character_description,
            interaction_capabilities: fields.interaction_capabilities,
            chapters: fields.chapters,
            unlisted_id,
            enabled: true,
        });
        Ok(())
    }

    async fn get_story_mode(&self, story_mode_id: &str) -> Result<Option<StoryMode>, RemoteError> {
        self.enter("get_story_mode")?;
        Ok(self
            .store
            .read()
            .story_modes
            .iter()
            .find(|s| s.id == story_mode_id)
            .cloned())
    }

    async fn list_story_modes(&self) -> Result<Vec<StoryMode>, RemoteError> {
        self.enter("list_story_modes")?;
        Ok(self
            .store
            .read()
            .story_modes
            .iter()
            .filter(|s| s.enabled || s.creator == self.caller)
            .cloned()
            .collect())
    }

    async fn update_story_mode(
        &self,
        id: &str,
        fields: StoryModeFields,
    ) -> Result<(), RemoteError> {
        self.enter("update_story_mode")?;
        {
            let store = self.store.read();
            let story = store
                .story_modes
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| RemoteError::NotFound(STORY_NOT_FOUND.into()))?;
            self.require_owner(&story.creator, "story mode")?;
        }

        ingest_story(&fields);
        let mut store = self.store.write();
        let story = store
            .story_modes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RemoteError::NotFound(STORY_NOT_FOUND.into()))?;
        story.title = fields.title;
        story.description = fields.description;
        story.character_description = fields.character_description;
        story.interaction_capabilities = fields.interaction_capabilities;
        story.chapters = fields.chapters;
        Ok(())
    }

    async fn update_story_mode_enabled_state(
        &self,
        story_mode_id: &str,
        enabled: bool,
    ) -> Result<(), RemoteError> {
        self.enter("update_story_mode_enabled_state")?;
        let mut store = self.store.write();
        let story = store
            .story_modes
            .iter_mut()
            .find(|s| s.id == story_mode_id)
            .ok_or_else(|| RemoteError::NotFound(STORY_NOT_FOUND.into()))?;
        self.require_owner(&story.creator, "story mode")?;
        story.enabled = enabled;
        Ok(())
    }

    async fn create_character_showcase(
        &self,
        id: String,
        fields: ShowcaseFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), RemoteError> {
        self.enter("create_character_showcase")?;
        {
            let store = self.store.read();
            self.require_creator_role(&store, "character showcases")?;
            check_new_showcase(&store, &id, &unlisted_id)?;
        }

        ingest_showcase(&fields);
        let mut store = self.store.write();
        check_new_showcase(&store, &id, &unlisted_id)?;
        store.showcases.push(CharacterShowcase {
            id,
            title: fields.title,
            creator: self.caller.clone(),
            character_name: fields.character_name,
            description: fields.description,
            author: fields.author,
            photo: fields.photo,
            video: fields.video,
            unlisted_id,
        });
        Ok(())
    }

    async fn get_character_showcase(
        &self,
        showcase_id: &str,
    ) -> Result<Option<CharacterShowcase>, RemoteError> {
        self.enter("get_character_showcase")?;
        Ok(self
            .store
            .read()
            .showcases
            .iter()
            .find(|s| s.id == showcase_id)
            .cloned())
    }

    async fn get_character_showcase_by_unlisted_id(
        &self,
        unlisted_id: &UnlistedId,
    ) -> Result<CharacterShowcase, RemoteError> {
        self.enter("get_character_showcase_by_unlisted_id")?;
        self.store
            .read()
            .showcases
            .iter()
            .find(|s| &s.unlisted_id == unlisted_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(SHOWCASE_NOT_FOUND.into()))
    }

    async fn list_character_showcases(&self) -> Result<Vec<CharacterShowcase>, RemoteError> {
        self.enter("list_character_showcases")?;
        Ok(self.store.read().showcases.clone())
    }

    async fn update_character_showcase(
        &self,
        id: &str,
        fields: ShowcaseFields,
    ) -> Result<(), RemoteError> {
        self.enter("update_character_showcase")?;
        {
            let store = self.store.read();
            let showcase = store
                .showcases
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| RemoteError::NotFound(SHOWCASE_NOT_FOUND.into()))?;
            self.require_owner(&showcase.creator, "character showcase")?;
        }

        ingest_showcase(&fields);
        let mut store = self.store.write();
        let showcase = store
            .showcases
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RemoteError::NotFound(SHOWCASE_NOT_FOUND.into()))?;
        showcase.title = fields.title;
        showcase.character_name = fields.character_name;
        showcase.description = fields.description;
        showcase.author = fields.author;
        showcase.photo = fields.photo;
        showcase.video = fields.video;
        Ok(())
    }
}
