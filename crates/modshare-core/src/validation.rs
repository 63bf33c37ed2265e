//! Field and file validation
//!
//! Pure checks shown inline by the UI and re-run before every publish:
//! - Mod metadata (title, game name, version, description, prompt)
//! - File count and per-file size limits
//! - Required fields of story modes and character showcases
//!
//! Lengths are measured in characters of the trimmed input.

use crate::limits::{MAX_FILE_COUNT, MAX_FILE_SIZE};
use crate::types::ModDraft;

/// Maximum characters in a title or game name
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum characters in a description or prompt
pub const MAX_LONG_TEXT_CHARS: usize = 2000;

/// Outcome of a single validator
pub type ValidationResult = Result<(), FieldError>;

/// Mod field being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Mod title
    Title,
    /// Target game
    GameName,
    /// Version label
    Version,
    /// Long description
    Description,
    /// Generation prompt
    Prompt,
}

impl Field {
    /// Label used at the start of messages
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Mod title",
            Field::GameName => "Game name",
            Field::Version => "Version",
            Field::Description => "Description",
            Field::Prompt => "Prompt",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failure with the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Field is empty after trimming
    #[error("{0} is required")]
    Required(Field),

    /// Field exceeds its character limit
    #[error("{field} must be {max} characters or less")]
    TooLong { field: Field, max: usize },

    /// Draft has no files
    #[error("At least one file is required")]
    NoFiles,

    /// Draft has more files than allowed
    #[error("Maximum {max} files allowed")]
    TooManyFiles { max: usize },

    /// A file exceeds the size limit
    #[error("File size must be less than {max_mb}MB")]
    FileTooLarge { max_mb: u64 },

    /// Story or showcase is missing required text
    #[error("{0}")]
    MissingFields(&'static str),
}

impl FieldError {
    /// Field the error refers to, if it is a metadata field
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Required(field) | Self::TooLong { field, .. } => Some(*field),
            _ => None,
        }
    }
}

fn check_text(field: Field, value: &str, max: Option<usize>) -> ValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required(field));
    }
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            return Err(FieldError::TooLong { field, max });
        }
    }
    Ok(())
}

/// Validate a mod title
pub fn validate_mod_title(title: &str) -> ValidationResult {
    check_text(Field::Title, title, Some(MAX_TITLE_CHARS))
}

/// Validate a game name
pub fn validate_game_name(game_name: &str) -> ValidationResult {
    check_text(Field::GameName, game_name, Some(MAX_TITLE_CHARS))
}

/// Validate a version label (any non-blank text)
pub fn validate_mod_version(version: &str) -> ValidationResult {
    check_text(Field::Version, version, None)
}

/// Validate a mod description
pub fn validate_mod_description(description: &str) -> ValidationResult {
    check_text(Field::Description, description, Some(MAX_LONG_TEXT_CHARS))
}

/// Validate a generation prompt
pub fn validate_mod_prompt(prompt: &str) -> ValidationResult {
    check_text(Field::Prompt, prompt, Some(MAX_LONG_TEXT_CHARS))
}

/// Validate the number of attached files (1..=10)
pub fn validate_file_count(count: usize) -> ValidationResult {
    if count == 0 {
        return Err(FieldError::NoFiles);
    }
    if count > MAX_FILE_COUNT {
        return Err(FieldError::TooManyFiles {
            max: MAX_FILE_COUNT,
        });
    }
    Ok(())
}

/// Validate a single file size in bytes
pub fn validate_file_size(size: u64) -> ValidationResult {
    if size > MAX_FILE_SIZE {
        return Err(FieldError::FileTooLarge {
            max_mb: MAX_FILE_SIZE / 1024 / 1024,
        });
    }
    Ok(())
}

/// Validate the details step: title, version, description, prompt
///
/// # Errors
/// The first failing field, in form order.
pub fn validate_details(
    title: &str,
    version: &str,
    description: &str,
    prompt: &str,
) -> ValidationResult {
    validate_mod_title(title)?;
    validate_mod_version(version)?;
    validate_mod_description(description)?;
    validate_mod_prompt(prompt)
}

/// Validate a whole draft right before it is published
///
/// Steps validate their own fields as the user moves forward, but files may
/// have changed since; this re-checks everything in one pass.
pub fn validate_draft(draft: &ModDraft) -> ValidationResult {
    validate_game_name(&draft.game_name)?;
    validate_details(
        &draft.title,
        &draft.version,
        &draft.description,
        &draft.prompt,
    )?;
    validate_file_count(draft.files.len())?;
    for file in draft.files.files() {
        validate_file_size(file.size())?;
    }
    Ok(())
}

/// Validate required story-mode text
pub fn validate_story_fields(title: &str, description: &str) -> ValidationResult {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(FieldError::MissingFields("Title and description are required"));
    }
    Ok(())
}

/// Validate required showcase text
pub fn validate_showcase_fields(
    title: &str,
    character_name: &str,
    description: &str,
) -> ValidationResult {
    if [title, character_name, description]
        .iter()
        .any(|s| s.trim().is_empty())
    {
        return Err(FieldError::MissingFields("All fields are required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModFile;

    #[test]
    fn title_messages() {
        assert_eq!(
            validate_mod_title("   ").unwrap_err().to_string(),
            "Mod title is required"
        );
        assert_eq!(
            validate_mod_title(&"a".repeat(101)).unwrap_err().to_string(),
            "Mod title must be 100 characters or less"
        );
        assert!(validate_mod_title(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn description_limit_is_2000() {
        let err = validate_mod_description(&"x".repeat(2001)).unwrap_err();
        assert_eq!(
            err,
            FieldError::TooLong {
                field: Field::Description,
                max: 2000
            }
        );
        assert!(err.to_string().contains("2000"));
        assert!(validate_mod_description(&"x".repeat(2000)).is_ok());
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        // 100 two-byte characters
        assert!(validate_game_name(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn version_has_no_upper_bound() {
        assert!(validate_mod_version(&"1".repeat(5000)).is_ok());
        assert_eq!(
            validate_mod_version("").unwrap_err(),
            FieldError::Required(Field::Version)
        );
    }

    #[test]
    fn file_count_and_size() {
        assert_eq!(
            validate_file_count(0).unwrap_err().to_string(),
            "At least one file is required"
        );
        assert_eq!(
            validate_file_count(11).unwrap_err().to_string(),
            "Maximum 10 files allowed"
        );
        assert!(validate_file_count(10).is_ok());

        assert!(validate_file_size(MAX_FILE_SIZE).is_ok());
        assert_eq!(
            validate_file_size(MAX_FILE_SIZE + 1).unwrap_err().to_string(),
            "File size must be less than 2MB"
        );
    }

    #[test]
    fn details_report_first_failure_in_form_order() {
        let err = validate_details("", "", "", "").unwrap_err();
        assert_eq!(err.field(), Some(Field::Title));

        let err = validate_details("Torch Fix", "1.0.0", "ok", "").unwrap_err();
        assert_eq!(err.field(), Some(Field::Prompt));
    }

    #[test]
    fn draft_revalidates_files() {
        let mut draft = ModDraft::new();
        draft.game_name = "Minecraft".into();
        draft.title = "Torch Fix".into();
        draft.description = "Fixes torch placement".into();
        draft.prompt = "Fix the bug".into();
        assert_eq!(validate_draft(&draft), Err(FieldError::NoFiles));

        draft
            .files
            .replace_files(vec![ModFile::new("fix.json", "application/json", vec![0; 512])])
            .unwrap();
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn story_and_showcase_required_fields() {
        assert!(validate_story_fields("Title", "Desc").is_ok());
        assert_eq!(
            validate_story_fields("Title", " ").unwrap_err().to_string(),
            "Title and description are required"
        );
        assert_eq!(
            validate_showcase_fields("t", "", "d").unwrap_err().to_string(),
            "All fields are required"
        );
    }
}
