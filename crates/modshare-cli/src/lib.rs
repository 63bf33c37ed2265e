//! Modshare CLI
//!
//! Offline tooling for mod drafts:
//!
//! - `id`: mint share tokens
//! - `validate`: run the creation form's checks over a TOML manifest
//! - `publish`: drive a manifest through the creation wizard against an
//!   in-memory backend and print the resulting share link

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod commands;
pub mod manifest;

pub use commands::{
    generate_ids, load_config, publish_manifest, validate_manifest, Check, CliError,
    PublishReport, ValidationReport,
};
pub use manifest::{DraftManifest, LoadedDraft, ManifestError, ManifestFile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
