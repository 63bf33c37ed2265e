//! Subcommand implementations
//!
//! Each command returns a serializable report; printing and exit codes are
//! left to the binary.

use crate::manifest::{describe_rejection, DraftManifest, LoadedDraft, ManifestError};
use modshare_client::{ClientConfig, ConfigError, MemoryBackend, ModshareClient, Session};
use modshare_core::{
    generate_unlisted_id, validate_bedrock_files,
    validation::{
        validate_file_count, validate_file_size, validate_game_name, validate_mod_description,
        validate_mod_prompt, validate_mod_title, validate_mod_version,
    },
    ModDraft, Principal, UnlistedId,
};
use modshare_flows::{ModWizard, PublishOutcome, WizardError};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Identity drafts are published under
pub const LOCAL_CREATOR: &str = "modshare-cli";

/// Command failure
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Manifest problem
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Wizard refused the draft
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// Backend refused the publish
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

/// Outcome of one validation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    /// What was checked
    pub name: String,
    /// Failure message; `None` when it passed
    pub error: Option<String>,
}

impl Check {
    fn new(name: impl Into<String>, result: Result<(), impl ToString>) -> Self {
        Self {
            name: name.into(),
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Check if it passed
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of `modshare validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Checks in form order
    pub checks: Vec<Check>,
}

impl ValidationReport {
    /// Check if every check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    /// Failing checks
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }

    /// One line per check
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for check in &self.checks {
            match &check.error {
                None => out.push_str(&format!("  ok    {}\n", check.name)),
                Some(error) => out.push_str(&format!("  FAIL  {}: {error}\n", check.name)),
            }
        }
        out.push_str(if self.passed() { "PASSED\n" } else { "FAILED\n" });
        out
    }
}

/// Result of `modshare publish`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Backend id of the new mod
    pub mod_id: String,
    /// Share token
    pub unlisted_id: String,
    /// Share link
    pub share_url: String,
    /// Number of files published
    pub files: usize,
}

/// Fresh share tokens
#[must_use]
pub fn generate_ids(count: usize) -> Vec<UnlistedId> {
    (0..count).map(|_| generate_unlisted_id()).collect()
}

/// Load client configuration with an optional origin override
///
/// # Errors
/// Unreadable, malformed or out-of-range configuration.
pub fn load_config(path: Option<&Path>, origin: Option<&str>) -> Result<ClientConfig, CliError> {
    let mut config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(origin) = origin {
        config = config.with_origin(origin);
    }
    config.validate()?;
    Ok(config)
}

fn check_draft(draft: &ModDraft) -> Vec<Check> {
    let mut checks = vec![
        Check::new("game name", validate_game_name(&draft.game_name)),
        Check::new("title", validate_mod_title(&draft.title)),
        Check::new("version", validate_mod_version(&draft.version)),
        Check::new("description", validate_mod_description(&draft.description)),
        Check::new("prompt", validate_mod_prompt(&draft.prompt)),
        Check::new("file count", validate_file_count(draft.files.len())),
    ];
    checks.extend(
        draft
            .files
            .files()
            .iter()
            .map(|f| Check::new(format!("file {}", f.filename), validate_file_size(f.size()))),
    );
    checks
}

/// Validate a manifest without publishing it
///
/// With `bedrock`, every file must also be a Bedrock pack.
///
/// # Errors
/// Only when the manifest cannot be loaded; field problems are reported as
/// failed checks.
pub fn validate_manifest(path: &Path, bedrock: bool) -> Result<ValidationReport, CliError> {
    let LoadedDraft { draft, rejected } = DraftManifest::load(path)?;

    let mut checks = check_draft(&draft);
    checks.extend(rejected.iter().map(|r| Check {
        name: format!("file {}", r.filename),
        error: Some(describe_rejection(r)),
    }));
    if bedrock {
        let result = validate_bedrock_files(
            draft
                .files
                .files()
                .iter()
                .map(|f| (f.filename.as_str(), f.size())),
        );
        checks.push(Check::new("bedrock files", result));
    }

    let report = ValidationReport { checks };
    tracing::debug!(passed = report.passed(), "manifest validated");
    Ok(report)
}

/// Connected client over `backend`, calling as `identity`
#[must_use]
pub fn local_client(
    backend: &MemoryBackend,
    identity: Principal,
    config: ClientConfig,
) -> ModshareClient {
    let view = backend.as_caller(identity.clone());
    ModshareClient::new(Arc::new(Session::connected(identity, Arc::new(view))), config)
}

/// Run a manifest through the creation wizard against `backend`
///
/// The published mod is looked up again through its share link as an
/// anonymous visitor before the report is returned.
///
/// # Errors
/// Manifest problems, the first invalid wizard field, or a refused publish.
pub async fn publish_manifest(
    path: &Path,
    backend: &MemoryBackend,
    config: &ClientConfig,
) -> Result<PublishReport, CliError> {
    let LoadedDraft { draft, rejected } = DraftManifest::load(path)?;
    for rejection in &rejected {
        tracing::warn!(file = %rejection.filename, reason = %rejection.error, "file left out");
    }

    let client = local_client(backend, Principal::new(LOCAL_CREATOR), config.clone());
    let mut wizard = ModWizard::new();
    wizard.set_game_name(draft.game_name);
    wizard.next()?;
    wizard.set_title(draft.title);
    wizard.set_version(draft.version);
    wizard.set_description(draft.description);
    wizard.set_prompt(draft.prompt);
    wizard.next()?;
    *wizard.files_mut() = draft.files;

    let request = wizard.begin_publish(chrono::Utc::now().timestamp_millis())?;
    let mod_id = request.ticket.mod_id().to_string();
    let files = request.new_mod.files.len();
    let result = client.create_mod(request.new_mod).await;

    match wizard.finish_publish(request.ticket, result) {
        PublishOutcome::Published(unlisted_id) => {
            let visitor = local_client(backend, Principal::anonymous(), config.clone());
            visitor
                .mod_by_unlisted_id(unlisted_id.as_str())
                .await
                .map_err(|e| CliError::PublishFailed(e.to_string()))?;

            let share_url = wizard.share_url(&config.origin).unwrap_or_default();
            tracing::info!(%mod_id, %share_url, "mod published");
            Ok(PublishReport {
                mod_id,
                unlisted_id: unlisted_id.to_string(),
                share_url,
                files,
            })
        }
        PublishOutcome::Failed(message) => Err(CliError::PublishFailed(message)),
        PublishOutcome::Ignored => Err(CliError::PublishFailed("publish was superseded".into())),
    }
}
