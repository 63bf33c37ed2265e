//! Character showcase creator
//!
//! One photo or video plus a few lines of text. Publishing creates the
//! showcase under a fresh share token; the share link is handed out only
//! after the ad gate closes.

use crate::countdown::AdGate;
use crate::error::{AdGateError, ShowcaseError};
use modshare_client::{ModshareClient, ShowcaseFields};
use modshare_core::{
    character_share_url, generate_unlisted_id, showcase_draft_id,
    validation::validate_showcase_fields, CharacterShowcase, ExternalBlob,
};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Author credited when none is entered
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Kind of media attached to a showcase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `image/*`
    Photo,
    /// `video/*`
    Video,
}

impl MediaKind {
    /// Classify a MIME type
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("image/") {
            Some(Self::Photo)
        } else if mime_type.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
struct Media {
    kind: MediaKind,
    bytes: Vec<u8>,
}

/// Showcase form
#[derive(Debug, Default)]
pub struct ShowcaseCreator {
    /// Showcase title
    pub title: String,
    /// Character name
    pub character_name: String,
    /// Character description
    pub description: String,
    /// Credited author; blank means anonymous
    pub author: String,
    media: Option<Media>,
    progress: Arc<AtomicU8>,
    existing: Option<CharacterShowcase>,
    share_url: Option<String>,
}

impl ShowcaseCreator {
    /// Create empty form
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create form aware of the caller's existing showcase
    ///
    /// # Errors
    /// The listing query failure.
    pub async fn load(client: &ModshareClient) -> Result<Self, ShowcaseError> {
        let me = client.identity();
        let existing = client
            .character_showcases()
            .await?
            .into_iter()
            .find(|s| Some(&s.creator) == me.as_ref());
        Ok(Self {
            existing,
            ..Self::new()
        })
    }

    /// Caller's showcase, if one was published before
    #[inline]
    #[must_use]
    pub fn existing(&self) -> Option<&CharacterShowcase> {
        self.existing.as_ref()
    }

    /// Check if publishing replaces an earlier post
    #[inline]
    #[must_use]
    pub fn is_update(&self) -> bool {
        self.existing.is_some()
    }

    /// Attach a photo or video
    ///
    /// # Errors
    /// `UnsupportedMedia` for anything that is not an image or a video; the
    /// previous selection is kept.
    pub fn select_media(
        &mut self,
        mime_type: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<MediaKind, ShowcaseError> {
        let kind = MediaKind::from_mime(mime_type).ok_or(ShowcaseError::UnsupportedMedia)?;
        self.media = Some(Media {
            kind,
            bytes: bytes.into(),
        });
        Ok(kind)
    }

    /// Kind of the attached media
    #[must_use]
    pub fn media_kind(&self) -> Option<MediaKind> {
        self.media.as_ref().map(|m| m.kind)
    }

    /// Upload progress of the last publish, in percent
    #[inline]
    #[must_use]
    pub fn upload_progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Share link released by the ad gate
    #[inline]
    #[must_use]
    pub fn share_url(&self) -> Option<&str> {
        self.share_url.as_deref()
    }

    fn fields(&self, media: &Media) -> ShowcaseFields {
        let progress = Arc::clone(&self.progress);
        let blob = ExternalBlob::from_bytes(media.bytes.clone())
            .with_upload_progress(move |pct: u8| progress.store(pct, Ordering::Relaxed));
        let (photo, video) = match media.kind {
            MediaKind::Photo => (Some(blob), None),
            MediaKind::Video => (None, Some(blob)),
        };
        let author = if self.author.trim().is_empty() {
            ANONYMOUS_AUTHOR.to_string()
        } else {
            self.author.clone()
        };
        ShowcaseFields {
            title: self.title.clone(),
            character_name: self.character_name.clone(),
            description: self.description.clone(),
            author,
            photo,
            video,
        }
    }

    /// Publish the showcase
    ///
    /// Returns the ad gate holding the share link.
    ///
    /// # Errors
    /// `Invalid` or `MissingMedia` before any call, or the backend failure.
    pub async fn publish(
        &mut self,
        client: &ModshareClient,
    ) -> Result<AdGate<String>, ShowcaseError> {
        self.progress.store(0, Ordering::Relaxed);
        validate_showcase_fields(&self.title, &self.character_name, &self.description)?;
        let media = self.media.as_ref().ok_or(ShowcaseError::MissingMedia)?;

        let fields = self.fields(media);
        let id = showcase_draft_id(chrono::Utc::now().timestamp_millis());
        let unlisted_id = generate_unlisted_id();

        if let Err(e) = client
            .create_character_showcase(id.clone(), fields, unlisted_id.clone())
            .await
        {
            tracing::error!(showcase_id = %id, error = %e, "Failed to publish character");
            return Err(e.into());
        }

        tracing::info!(showcase_id = %id, "character published");
        let url = character_share_url(&client.config().origin, &unlisted_id);
        Ok(AdGate::open_for(url, client.config().ad_duration()))
    }

    /// Close the ad gate and reveal the share link
    ///
    /// Returns the confirmation shown to the user.
    ///
    /// # Errors
    /// The gate's dismissal failure; nothing is revealed then.
    pub fn complete(&mut self, gate: &mut AdGate<String>) -> Result<&'static str, AdGateError> {
        self.share_url = Some(gate.dismiss()?);
        Ok(if self.is_update() {
            "Character updated successfully"
        } else {
            "Character published successfully"
        })
    }
}
