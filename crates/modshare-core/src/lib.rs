//! Modshare Core
//!
//! Client-side domain model for the mod / story / character sharing platform.
//!
//! # Overview
//!
//! Everything in this crate is pure: no I/O, no async, no remote calls.
//! - **Records**: mods, story modes, character showcases and their parts
//! - **Validation**: field and file limits shown inline by the UI
//! - **FileComposer**: bounded list of named byte blobs for a mod draft
//! - **Unlisted IDs**: unguessable share tokens and share-link URLs
//! - **ExternalBlob**: opaque media payloads with upload progress observers
//!
//! # Example
//!
//! ```rust
//! use modshare_core::{generate_unlisted_id, share_url, FileComposer};
//!
//! let mut composer = FileComposer::new();
//! composer.add_text_file("readme.txt", "Drop into the mods folder").unwrap();
//! assert_eq!(composer.len(), 1);
//!
//! let id = generate_unlisted_id();
//! let url = share_url("https://mods.example", &id);
//! assert!(url.starts_with("https://mods.example/#/mod/"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod bedrock;
pub mod blob;
pub mod composer;
pub mod dialogue;
pub mod ids;
pub mod limits;
pub mod types;
pub mod unlisted;
pub mod validation;
pub mod voice;

// Re-exports
pub use bedrock::{is_bedrock_file, validate_bedrock_file, validate_bedrock_files, BedrockError};
pub use blob::{BlobError, ExternalBlob, UploadProgress};
pub use composer::{ComposerError, FileComposer, Rejection, UploadCandidate, UploadOutcome};
pub use dialogue::{ensure_quoted, strip_quotes};
pub use ids::{generate_local_id, mod_draft_id, showcase_draft_id, story_draft_id};
pub use limits::{
    format_file_size, DEFAULT_CONTENT_TYPE, MAX_FILE_COUNT, MAX_FILE_SIZE, MAX_TEXT_FILE_COUNT,
    TEXT_CONTENT_TYPE,
};
pub use types::{
    Chapter, CharacterShowcase, ModDraft, ModFile, ModRecord, Principal, Quest, Scene, StoryMode,
    UnlistedId, UnlistedIdError, UserProfile, UserRole,
};
pub use unlisted::{
    character_share_url, generate_unlisted_id, generate_unlisted_id_with, parse_share_url,
    share_url, ShareKind,
};
pub use validation::{Field, FieldError, ValidationResult};
pub use voice::{preset_by_id, resolve_preset, VoicePreset, DEFAULT_PRESET, VOICE_PRESETS};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building drafts and records
    pub use crate::{
        generate_unlisted_id, share_url, ExternalBlob, FieldError, FileComposer, ModDraft,
        ModFile, ModRecord, Principal, UnlistedId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
