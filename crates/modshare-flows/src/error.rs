//! Error types for the client flows
//!
//! Messages are shown inline by the UI, so their wording is kept stable.

use crate::wizard::Step;
use modshare_client::ClientError;
use modshare_core::{ComposerError, FieldError};

/// Mod-creation wizard failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Current step's fields are invalid
    #[error(transparent)]
    Invalid(#[from] FieldError),

    /// A publish was already started and has not finished
    #[error("A publish is already in progress")]
    PublishInFlight,

    /// Operation not available at the current step
    #[error("cannot {action} at step {step}")]
    WrongStep { action: &'static str, step: Step },

    /// Transition not in the wizard's table
    #[error("illegal wizard transition {from} -> {to}")]
    IllegalTransition { from: Step, to: Step },

    /// Backend refused the publish
    #[error(transparent)]
    Remote(#[from] ClientError),
}

/// Mod file manager failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManageError {
    /// Caller is not the creator
    #[error("You do not have permission to change this mod")]
    PermissionDenied,

    /// Enabled toggle failed for another reason
    #[error("Failed to update mod state")]
    ToggleFailed,

    /// Edited file list is invalid
    #[error(transparent)]
    Invalid(#[from] FieldError),

    /// Stored file list cannot seed the composer
    #[error(transparent)]
    Composer(#[from] ComposerError),

    /// Backend call failed
    #[error(transparent)]
    Remote(#[from] ClientError),
}

/// Story-mode editor failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryError {
    /// Required story text missing
    #[error(transparent)]
    Invalid(#[from] FieldError),

    /// A story keeps at least one chapter
    #[error("Cannot remove the last chapter")]
    LastChapter,

    /// Saving a story without chapters
    #[error("At least one chapter is required")]
    NoChapters,

    /// Chapter index out of range
    #[error("chapter {0} does not exist")]
    NoSuchChapter(usize),

    /// Scene or quest index out of range
    #[error("{kind} {index} does not exist in chapter {chapter}")]
    NoSuchItem {
        kind: &'static str,
        chapter: usize,
        index: usize,
    },

    /// Recorder holds no finished take
    #[error("No recording to save")]
    NoRecording,

    /// Recorder used out of order
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    /// Story id does not resolve
    #[error("Story mode not found")]
    NotFound,

    /// Backend call failed
    #[error(transparent)]
    Remote(#[from] ClientError),
}

/// Character showcase creator failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShowcaseError {
    /// Selected file is neither an image nor a video
    #[error("Please select an image or video file")]
    UnsupportedMedia,

    /// Publishing without media
    #[error("Please select a photo or video")]
    MissingMedia,

    /// Required showcase text missing
    #[error(transparent)]
    Invalid(#[from] FieldError),

    /// Backend call failed
    #[error(transparent)]
    Remote(#[from] ClientError),
}

/// Ad gate dismissal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdGateError {
    /// Countdown has not reached zero
    #[error("Please wait {remaining} seconds")]
    StillCounting { remaining: u32 },

    /// Payload already released
    #[error("ad gate already dismissed")]
    AlreadyDismissed,
}

/// Audio recorder misuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecorderError {
    /// Start while a take is running
    #[error("already recording")]
    AlreadyRecording,

    /// Stop without a running take
    #[error("not recording")]
    NotRecording,
}

/// Share sheet or clipboard failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    /// User dismissed the share sheet
    #[error("share cancelled")]
    Cancelled,

    /// Platform refused the request
    #[error("{0}")]
    Unavailable(String),
}

impl ManageError {
    /// Map an enabled-toggle failure to the message shown to the creator
    #[must_use]
    pub fn from_toggle(error: &ClientError) -> Self {
        if error.is_unauthorized() {
            Self::PermissionDenied
        } else {
            Self::ToggleFailed
        }
    }
}
