//! Creator-side management of a published mod
//!
//! Loads the mod with its enabled state, edits the file list in a
//! [`FileComposer`], and writes changes back.

use crate::error::ManageError;
use modshare_client::ModshareClient;
use modshare_core::{
    share_url,
    validation::{validate_file_count, validate_file_size},
    FileComposer, ModFile, ModRecord,
};

/// Shown while the share link resolves
pub const ENABLED_STATUS: &str =
    "Your mod is currently enabled and accessible via the share link";

/// Shown while the share link is switched off
pub const DISABLED_STATUS: &str =
    "Your mod is currently disabled and cannot be accessed via the share link";

/// Editable view of one published mod
#[derive(Debug)]
pub struct ModFileManager {
    record: ModRecord,
    enabled: bool,
    composer: FileComposer,
}

impl ModFileManager {
    /// Seed from a loaded record
    ///
    /// # Errors
    /// `Composer` if the stored files break the composer limits.
    pub fn from_record(record: ModRecord, enabled: bool) -> Result<Self, ManageError> {
        let composer = FileComposer::from_files(record.files.clone())?;
        Ok(Self {
            record,
            enabled,
            composer,
        })
    }

    /// Load the mod and its enabled state together
    ///
    /// # Errors
    /// The first failing query, or `Composer` for an oversized stored list.
    pub async fn load(client: &ModshareClient, mod_id: &str) -> Result<Self, ManageError> {
        let (record, enabled) =
            futures::try_join!(client.mod_by_id(mod_id), client.mod_enabled_state(mod_id))?;
        Self::from_record(record, enabled)
    }

    /// Last saved record
    #[inline]
    #[must_use]
    pub fn record(&self) -> &ModRecord {
        &self.record
    }

    /// Whether the share link resolves
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Edited files
    #[inline]
    #[must_use]
    pub fn files(&self) -> &FileComposer {
        &self.composer
    }

    /// Edited files, for adding and removing
    #[inline]
    pub fn files_mut(&mut self) -> &mut FileComposer {
        &mut self.composer
    }

    /// Check for unsaved file changes
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.composer.files() != self.record.files.as_slice()
    }

    /// Drop unsaved file changes
    ///
    /// # Errors
    /// `Composer` if the saved list no longer fits the composer.
    pub fn revert(&mut self) -> Result<(), ManageError> {
        self.composer.replace_files(self.record.files.clone())?;
        Ok(())
    }

    /// Write the edited file list
    ///
    /// Returns `false` when there was nothing to save.
    ///
    /// # Errors
    /// `Invalid` for an empty or oversized list, or the backend failure.
    pub async fn save(&mut self, client: &ModshareClient) -> Result<bool, ManageError> {
        if !self.is_dirty() {
            return Ok(false);
        }
        validate_file_count(self.composer.len())?;
        for file in self.composer.files() {
            validate_file_size(file.size())?;
        }

        let files: Vec<ModFile> = self.composer.files().to_vec();
        client.update_mod_files(&self.record.id, files.clone()).await?;
        tracing::info!(mod_id = %self.record.id, files = files.len(), "mod files saved");
        self.record.files = files;
        Ok(true)
    }

    /// Switch the share link on or off
    ///
    /// Returns the confirmation shown to the creator.
    ///
    /// # Errors
    /// `PermissionDenied` when the caller is not the creator, `ToggleFailed`
    /// for anything else.
    pub async fn set_enabled(
        &mut self,
        client: &ModshareClient,
        enabled: bool,
    ) -> Result<&'static str, ManageError> {
        if let Err(e) = client.set_mod_enabled_state(&self.record.id, enabled).await {
            tracing::error!(mod_id = %self.record.id, error = %e, "enabled toggle failed");
            return Err(ManageError::from_toggle(&e));
        }
        self.enabled = enabled;
        self.record.enabled = enabled;
        Ok(if enabled {
            "Mod enabled successfully"
        } else {
            "Mod disabled successfully"
        })
    }

    /// Status line under the toggle
    #[inline]
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        if self.enabled {
            ENABLED_STATUS
        } else {
            DISABLED_STATUS
        }
    }

    /// Share link of the mod
    #[must_use]
    pub fn share_url(&self, origin: &str) -> String {
        share_url(origin, &self.record.unlisted_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modshare_core::{generate_unlisted_id, Principal};

    fn record(files: Vec<ModFile>) -> ModRecord {
        ModRecord {
            id: "minecraft-1".into(),
            title: "Torch Fix".into(),
            description: "Fixes torch placement".into(),
            prompt: "Fix the bug".into(),
            version: "1.0.0".into(),
            creator: Principal::new("alice"),
            game_name: "Minecraft".into(),
            files,
            unlisted_id: generate_unlisted_id(),
            enabled: true,
        }
    }

    #[test]
    fn dirty_tracking_and_revert() {
        let file = ModFile::new("fix.json", "application/json", b"{}".to_vec());
        let mut manager = ModFileManager::from_record(record(vec![file]), true).unwrap();
        assert!(!manager.is_dirty());

        manager.files_mut().add_text_file("notes.txt", "hi").unwrap();
        assert!(manager.is_dirty());

        manager.revert().unwrap();
        assert!(!manager.is_dirty());
        assert_eq!(manager.files().len(), 1);
    }

    #[test]
    fn status_text_follows_state() {
        let manager = ModFileManager::from_record(record(Vec::new()), false).unwrap();
        assert_eq!(manager.status_text(), DISABLED_STATUS);
        assert!(manager
            .share_url("http://localhost:3000")
            .starts_with("http://localhost:3000/#/mod/"));
    }

    #[test]
    fn oversized_stored_list_is_refused() {
        let files = (0..11)
            .map(|i| ModFile::new(format!("f{i}.bin"), "application/octet-stream", vec![0u8]))
            .collect();
        assert!(matches!(
            ModFileManager::from_record(record(files), true),
            Err(ManageError::Composer(_))
        ));
    }
}
