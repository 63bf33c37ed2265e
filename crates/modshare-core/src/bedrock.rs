//! Minecraft Bedrock bundle checks
//!
//! Bedrock mods ship as `.mcpack` or `.mcaddon` archives. These checks run
//! on top of the generic file limits.

use crate::validation::{validate_file_count, validate_file_size, FieldError};

/// Accepted archive extensions
pub const BEDROCK_EXTENSIONS: [&str; 2] = [".mcpack", ".mcaddon"];

/// Rejected Bedrock bundle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BedrockError {
    /// Extension is not a Bedrock archive
    #[error("\"{0}\" is not a valid Minecraft Bedrock mod file. Only .mcpack and .mcaddon files are supported.")]
    InvalidExtension(String),

    /// File over the size limit
    #[error("\"{filename}\" is too large. {source}")]
    TooLarge {
        /// Offending file
        filename: String,
        /// Size failure
        #[source]
        source: FieldError,
    },

    /// Bundle has zero or too many files
    #[error(transparent)]
    Count(#[from] FieldError),
}

/// Check for a Bedrock archive extension, ignoring case
#[must_use]
pub fn is_bedrock_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    BEDROCK_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Extension including the dot, or empty when there is none
#[must_use]
pub fn file_extension(filename: &str) -> &str {
    filename.rfind('.').map_or("", |idx| &filename[idx..])
}

/// Validate one file by name and size
///
/// # Errors
/// Extension first, then size.
pub fn validate_bedrock_file(filename: &str, size: u64) -> Result<(), BedrockError> {
    if !is_bedrock_file(filename) {
        return Err(BedrockError::InvalidExtension(filename.to_string()));
    }
    validate_file_size(size).map_err(|source| BedrockError::TooLarge {
        filename: filename.to_string(),
        source,
    })
}

/// Validate a bundle of `(filename, size)` pairs
///
/// # Errors
/// The count check, then the first failing file in order.
pub fn validate_bedrock_files<'a, I>(files: I) -> Result<(), BedrockError>
where
    I: IntoIterator<Item = (&'a str, u64)>,
    I::IntoIter: ExactSizeIterator,
{
    let files = files.into_iter();
    validate_file_count(files.len())?;
    for (filename, size) in files {
        validate_bedrock_file(filename, size)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::MAX_FILE_SIZE;

    #[test]
    fn extensions_ignore_case() {
        assert!(is_bedrock_file("castle.mcpack"));
        assert!(is_bedrock_file("Castle.MCADDON"));
        assert!(!is_bedrock_file("castle.zip"));
        assert!(!is_bedrock_file("mcpack"));
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(file_extension("a.b.mcpack"), ".mcpack");
        assert_eq!(file_extension("README"), "");
    }

    #[test]
    fn messages() {
        let err = validate_bedrock_file("pack.zip", 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"pack.zip\" is not a valid Minecraft Bedrock mod file. Only .mcpack and .mcaddon files are supported."
        );

        let err = validate_bedrock_file("pack.mcpack", MAX_FILE_SIZE + 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"pack.mcpack\" is too large. File size must be less than 2MB"
        );
    }

    #[test]
    fn bundle_checks_count_first() {
        let empty: Vec<(&str, u64)> = Vec::new();
        assert_eq!(
            validate_bedrock_files(empty).unwrap_err().to_string(),
            "At least one file is required"
        );

        let bundle = vec![("a.mcpack", 10), ("b.txt", 10), ("c.zip", 10)];
        assert_eq!(
            validate_bedrock_files(bundle),
            Err(BedrockError::InvalidExtension("b.txt".into()))
        );

        assert!(validate_bedrock_files(vec![("a.mcpack", 1), ("b.mcaddon", 2)]).is_ok());
    }
}
