//! Modshare Flows
//!
//! Client workflows built on the query layer.
//!
//! # Overview
//!
//! - **ModWizard**: four-step mod creation with a two-phase publish
//! - **ModFileManager**: edit a published mod's files and share state
//! - **StoryEditor / StoryPlayer**: chapters, quests and scenes
//! - **ShowcaseCreator**: one character, one photo or video
//! - **AdGate**: countdown in front of freshly shared links
//! - **Narrator / AudioRecorder / share_or_copy**: platform wrappers
//!
//! # Example
//!
//! ```rust
//! use modshare_flows::{ModWizard, Step};
//!
//! let mut wizard = ModWizard::new();
//! wizard.set_game_name("Minecraft");
//! assert_eq!(wizard.next().unwrap(), Step::EnterDetails);
//! assert_eq!(wizard.back().unwrap(), Step::SelectGame);
//! assert_eq!(wizard.draft().game_name, "Minecraft");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod countdown;
pub mod error;
pub mod manage;
pub mod narrator;
pub mod recorder;
pub mod share;
pub mod showcase;
pub mod story;
pub mod wizard;

// Re-exports
pub use countdown::{AdCountdown, AdGate, Tick};
pub use error::{
    AdGateError, ManageError, RecorderError, ShareError, ShowcaseError, StoryError, WizardError,
};
pub use manage::ModFileManager;
pub use narrator::{Narrator, SpeechOptions, SpeechSynthesizer};
pub use recorder::{AudioRecorder, RecorderState};
pub use share::{copy_link, share_or_copy, Clipboard, ShareOutcome, SharePayload, ShareSheet};
pub use showcase::{MediaKind, ShowcaseCreator};
pub use story::{StoryEditor, StoryPlayer};
pub use wizard::{ModWizard, PublishOutcome, PublishRequest, PublishTicket, Step};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the client flows
    pub use crate::{
        AdGate, ModFileManager, ModWizard, PublishOutcome, ShowcaseCreator, Step, StoryEditor,
        StoryPlayer, WizardError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
