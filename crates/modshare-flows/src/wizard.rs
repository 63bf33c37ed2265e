//! Mod-creation wizard
//!
//! Four steps: pick a game, fill in details, attach files, published.
//!
//! - Forward moves are guarded by the validators of the step being left
//! - Backward moves are unconditional and keep every field
//! - Publishing is split in two so the caller owns the remote call:
//!   [`ModWizard::begin_publish`] hands out a [`PublishRequest`] and
//!   [`ModWizard::finish_publish`] applies its result. Only one publish is
//!   in flight at a time; completions for a wizard that was reset since are
//!   dropped.
//! - Without a live connection publishing is disabled, not attempted

use crate::error::WizardError;
use modshare_client::{ClientError, ModshareClient, NewMod};
use modshare_core::{
    generate_unlisted_id, mod_draft_id, share_url,
    validation::{validate_details, validate_draft, validate_file_count, validate_game_name},
    FileComposer, ModDraft, UnlistedId,
};
use std::fmt;

/// Message shown when a failed publish carries no text of its own
pub const PUBLISH_FAILED_FALLBACK: &str = "Failed to publish mod";

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Choose the target game
    SelectGame,
    /// Title, version, description and prompt
    EnterDetails,
    /// Upload or write files
    AttachFiles,
    /// Mod created, share link available
    Published,
}

impl Step {
    /// Position shown in the progress bar, starting at 1
    #[inline]
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Self::SelectGame => 1,
            Self::EnterDetails => 2,
            Self::AttachFiles => 3,
            Self::Published => 4,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SelectGame => "select-game",
            Self::EnterDetails => "enter-details",
            Self::AttachFiles => "attach-files",
            Self::Published => "published",
        })
    }
}

/// Steps reachable from `from`
#[must_use]
pub fn allowed_transitions(from: Step) -> &'static [Step] {
    use Step::{AttachFiles, EnterDetails, Published, SelectGame};
    match from {
        SelectGame => &[EnterDetails],
        EnterDetails => &[SelectGame, AttachFiles],
        AttachFiles => &[EnterDetails, Published],
        Published => &[SelectGame],
    }
}

/// Check a step change against the transition table
///
/// # Errors
/// `IllegalTransition` when `to` is not reachable from `from`.
pub fn validate_transition(from: Step, to: Step) -> Result<(), WizardError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(WizardError::IllegalTransition { from, to })
    }
}

/// Proof that a publish was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTicket {
    generation: u64,
    mod_id: String,
    unlisted_id: UnlistedId,
}

impl PublishTicket {
    /// Id the mod is being created under
    #[inline]
    #[must_use]
    pub fn mod_id(&self) -> &str {
        &self.mod_id
    }

    /// Share token the mod is being created with
    #[inline]
    #[must_use]
    pub fn unlisted_id(&self) -> &UnlistedId {
        &self.unlisted_id
    }
}

/// Started publish: the ticket plus the payload to send
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Hand back to [`ModWizard::finish_publish`]
    pub ticket: PublishTicket,
    /// Create-mod payload
    pub new_mod: NewMod,
}

/// What a finished publish did to the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Mod created; wizard is at `Published`
    Published(UnlistedId),
    /// Backend refused; wizard stays on the files step with the message
    Failed(String),
    /// Ticket belongs to a wizard that was reset since
    Ignored,
}

/// Client-side state of one mod-creation session
#[derive(Debug)]
pub struct ModWizard {
    draft: ModDraft,
    step: Step,
    published: Option<UnlistedId>,
    in_flight: Option<u64>,
    generation: u64,
    last_error: Option<String>,
}

impl ModWizard {
    /// Create wizard at the first step with an empty draft
    #[must_use]
    pub fn new() -> Self {
        Self {
            draft: ModDraft::new(),
            step: Step::SelectGame,
            published: None,
            in_flight: None,
            generation: 0,
            last_error: None,
        }
    }

    /// Current step
    #[inline]
    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Accumulated draft
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &ModDraft {
        &self.draft
    }

    /// Message of the last failed publish
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Share token of the published mod
    #[inline]
    #[must_use]
    pub fn published_id(&self) -> Option<&UnlistedId> {
        self.published.as_ref()
    }

    /// Set target game
    pub fn set_game_name(&mut self, game_name: impl Into<String>) {
        self.draft.game_name = game_name.into();
    }

    /// Set title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    /// Set version label
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.draft.version = version.into();
    }

    /// Set description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Set generation prompt
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.draft.prompt = prompt.into();
    }

    /// Attached files
    #[inline]
    #[must_use]
    pub fn files(&self) -> &FileComposer {
        &self.draft.files
    }

    /// Attached files, for adding and removing
    #[inline]
    pub fn files_mut(&mut self) -> &mut FileComposer {
        &mut self.draft.files
    }

    /// Move forward one step
    ///
    /// # Errors
    /// The first failing field of the step being left, or `WrongStep` from
    /// the files step (publishing moves on from there) and from `Published`.
    pub fn next(&mut self) -> Result<Step, WizardError> {
        let to = match self.step {
            Step::SelectGame => {
                validate_game_name(&self.draft.game_name)?;
                Step::EnterDetails
            }
            Step::EnterDetails => {
                validate_details(
                    &self.draft.title,
                    &self.draft.version,
                    &self.draft.description,
                    &self.draft.prompt,
                )?;
                Step::AttachFiles
            }
            step @ (Step::AttachFiles | Step::Published) => {
                return Err(WizardError::WrongStep {
                    action: "advance",
                    step,
                })
            }
        };
        self.move_to(to)
    }

    /// Move back one step, keeping every field
    ///
    /// # Errors
    /// `WrongStep` at the first step and at `Published`.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        let to = match self.step {
            Step::EnterDetails => Step::SelectGame,
            Step::AttachFiles => Step::EnterDetails,
            step @ (Step::SelectGame | Step::Published) => {
                return Err(WizardError::WrongStep {
                    action: "go back",
                    step,
                })
            }
        };
        self.move_to(to)
    }

    fn move_to(&mut self, to: Step) -> Result<Step, WizardError> {
        validate_transition(self.step, to)?;
        tracing::debug!(from = %self.step, to = %to, "wizard step");
        self.step = to;
        Ok(to)
    }

    /// Check if the draft is ready to publish, ignoring the connection
    #[must_use]
    pub fn ready_to_publish(&self) -> bool {
        self.step == Step::AttachFiles
            && self.in_flight.is_none()
            && validate_file_count(self.draft.files.len()).is_ok()
    }

    /// Check if the publish button is enabled for `client`
    #[must_use]
    pub fn can_publish(&self, client: &ModshareClient) -> bool {
        client.session().is_connected() && self.ready_to_publish()
    }

    /// Check if a publish is waiting for the backend
    #[inline]
    #[must_use]
    pub fn is_publishing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start publishing the draft
    ///
    /// Synthesizes the mod id from the game name and `now_ms`, draws a fresh
    /// share token and marks the publish in flight.
    ///
    /// # Errors
    /// `WrongStep` outside the files step, `PublishInFlight` while another
    /// publish is pending, or the first invalid field of the draft.
    pub fn begin_publish(&mut self, now_ms: i64) -> Result<PublishRequest, WizardError> {
        if self.step != Step::AttachFiles {
            return Err(WizardError::WrongStep {
                action: "publish",
                step: self.step,
            });
        }
        if self.in_flight.is_some() {
            return Err(WizardError::PublishInFlight);
        }
        validate_file_count(self.draft.files.len())?;
        validate_draft(&self.draft)?;

        let mod_id = mod_draft_id(&self.draft.game_name, now_ms);
        let unlisted_id = generate_unlisted_id();
        let new_mod = NewMod {
            id: mod_id.clone(),
            title: self.draft.title.clone(),
            description: self.draft.description.clone(),
            prompt: self.draft.prompt.clone(),
            version: self.draft.version.clone(),
            game_name: self.draft.game_name.clone(),
            files: self.draft.files.files().to_vec(),
            unlisted_id: unlisted_id.clone(),
        };

        self.in_flight = Some(self.generation);
        self.last_error = None;
        tracing::debug!(%mod_id, files = new_mod.files.len(), "publish started");

        Ok(PublishRequest {
            ticket: PublishTicket {
                generation: self.generation,
                mod_id,
                unlisted_id,
            },
            new_mod,
        })
    }

    /// Apply the backend's answer to a started publish
    pub fn finish_publish(
        &mut self,
        ticket: PublishTicket,
        result: Result<(), ClientError>,
    ) -> PublishOutcome {
        if ticket.generation != self.generation || self.in_flight != Some(ticket.generation) {
            tracing::debug!(mod_id = %ticket.mod_id, "dropping stale publish completion");
            return PublishOutcome::Ignored;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                if self.step != Step::AttachFiles {
                    tracing::debug!(step = %self.step, "publish completed after navigating away");
                }
                self.step = Step::Published;
                self.published = Some(ticket.unlisted_id.clone());
                tracing::info!(mod_id = %ticket.mod_id, "Mod published successfully!");
                PublishOutcome::Published(ticket.unlisted_id)
            }
            Err(e) => {
                let message = e.to_string();
                let message = if message.is_empty() {
                    PUBLISH_FAILED_FALLBACK.to_string()
                } else {
                    message
                };
                tracing::error!(mod_id = %ticket.mod_id, error = %message, "publish failed");
                self.last_error = Some(message.clone());
                PublishOutcome::Failed(message)
            }
        }
    }

    /// Publish through `client`, timestamping the id with the current time
    ///
    /// # Errors
    /// `Remote(NoConnection)` without a live connection, leaving the wizard
    /// untouched; otherwise same as [`Self::begin_publish`]. A backend
    /// failure is reported in the outcome instead.
    pub async fn publish(&mut self, client: &ModshareClient) -> Result<PublishOutcome, WizardError> {
        if !client.session().is_connected() {
            return Err(ClientError::NoConnection.into());
        }
        let PublishRequest { ticket, new_mod } =
            self.begin_publish(chrono::Utc::now().timestamp_millis())?;
        let result = client.create_mod(new_mod).await;
        Ok(self.finish_publish(ticket, result))
    }

    /// Discard everything and start over at the first step
    pub fn create_another(&mut self) {
        self.draft = ModDraft::new();
        self.step = Step::SelectGame;
        self.published = None;
        self.in_flight = None;
        self.last_error = None;
        self.generation += 1;
    }

    /// Share link of the published mod
    #[must_use]
    pub fn share_url(&self, origin: &str) -> Option<String> {
        self.published.as_ref().map(|id| share_url(origin, id))
    }
}

impl Default for ModWizard {
    fn default() -> Self {
        Self::new()
    }
}
