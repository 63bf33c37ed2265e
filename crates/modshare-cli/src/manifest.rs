//! Draft manifests
//!
//! A manifest is a TOML file describing one mod draft. Files are either
//! read from disk, relative to the manifest, or written inline as text:
//!
//! ```toml
//! game_name = "Minecraft"
//! title = "Torch Fix"
//! description = "Fixes torch placement"
//! prompt = "Fix the bug"
//!
//! [[files]]
//! path = "fix.json"
//! content_type = "application/json"
//!
//! [[files]]
//! name = "readme.txt"
//! text = "Drop into the mods folder"
//! ```

use modshare_core::{ComposerError, ModDraft, Rejection, UploadCandidate};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Manifest loading failure
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest or a listed file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid TOML for a draft
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One entry of the `files` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ManifestFile {
    /// Text typed into the manifest
    Text {
        /// File name
        name: String,
        /// File content
        text: String,
    },
    /// File on disk
    Disk {
        /// Path, relative to the manifest
        path: PathBuf,
        /// MIME type; octet-stream when absent
        #[serde(default)]
        content_type: Option<String>,
    },
}

/// Parsed manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftManifest {
    /// Target game
    #[serde(default)]
    pub game_name: String,
    /// Mod title
    #[serde(default)]
    pub title: String,
    /// Version label
    #[serde(default = "default_version")]
    pub version: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Generation prompt
    #[serde(default)]
    pub prompt: String,
    /// Attached files in order
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

fn default_version() -> String {
    ModDraft::DEFAULT_VERSION.to_string()
}

/// Draft built from a manifest, with the files the composer refused
#[derive(Debug, Clone)]
pub struct LoadedDraft {
    /// Draft with every admissible file attached
    pub draft: ModDraft,
    /// Files left out
    pub rejected: Vec<Rejection>,
}

impl DraftManifest {
    /// Parse manifest text
    ///
    /// # Errors
    /// `Parse` for malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a manifest file
    ///
    /// # Errors
    /// `Io` if unreadable, `Parse` if malformed.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Build the draft, reading disk files relative to `base_dir`
    ///
    /// Files the composer refuses are collected, not fatal.
    ///
    /// # Errors
    /// `Io` when a listed file cannot be read.
    pub fn into_draft(self, base_dir: &Path) -> Result<LoadedDraft, ManifestError> {
        let mut draft = ModDraft {
            game_name: self.game_name,
            title: self.title,
            version: self.version,
            description: self.description,
            prompt: self.prompt,
            ..ModDraft::new()
        };
        let mut rejected = Vec::new();

        for entry in self.files {
            match entry {
                ManifestFile::Text { name, text } => {
                    if let Err(error) = draft.files.add_text_file(&name, &text) {
                        rejected.push(Rejection {
                            filename: name,
                            error,
                        });
                    }
                }
                ManifestFile::Disk { path, content_type } => {
                    let full = base_dir.join(&path);
                    let content = std::fs::read(&full).map_err(|source| ManifestError::Io {
                        path: full.clone(),
                        source,
                    })?;
                    let name = path
                        .file_name()
                        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                    let mut candidate = UploadCandidate::new(name, content);
                    if let Some(content_type) = content_type {
                        candidate = candidate.with_mime_type(content_type);
                    }
                    rejected.extend(draft.files.add_uploaded_files([candidate]).rejected);
                }
            }
        }

        Ok(LoadedDraft { draft, rejected })
    }

    /// Load a manifest file and build its draft
    ///
    /// # Errors
    /// Same as [`Self::from_file`] and [`Self::into_draft`].
    pub fn load(path: &Path) -> Result<LoadedDraft, ManifestError> {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_file(path)?.into_draft(base_dir)
    }
}

/// Human-readable reason a file was left out
#[must_use]
pub fn describe_rejection(rejection: &Rejection) -> String {
    match &rejection.error {
        ComposerError::FileTooLarge { .. } => rejection.error.to_string(),
        other => format!("{}: {other}", rejection.filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_file_kinds() {
        let manifest = DraftManifest::from_toml_str(
            r#"
            game_name = "Minecraft"
            title = "Torch Fix"

            [[files]]
            path = "fix.json"
            content_type = "application/json"

            [[files]]
            name = "readme.txt"
            text = "hello"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(
            manifest.files,
            vec![
                ManifestFile::Disk {
                    path: "fix.json".into(),
                    content_type: Some("application/json".into()),
                },
                ManifestFile::Text {
                    name: "readme.txt".into(),
                    text: "hello".into(),
                },
            ]
        );
    }

    #[test]
    fn sixth_inline_text_file_is_rejected() {
        let entries: String = (0..6)
            .map(|i| format!("[[files]]\nname = \"n{i}.txt\"\ntext = \"x\"\n"))
            .collect();
        let loaded = DraftManifest::from_toml_str(&entries)
            .unwrap()
            .into_draft(Path::new("."))
            .unwrap();

        assert_eq!(loaded.draft.files.len(), 5);
        assert_eq!(loaded.rejected.len(), 1);
        assert_eq!(
            describe_rejection(&loaded.rejected[0]),
            "n5.txt: Maximum 5 text files allowed"
        );
    }
}
