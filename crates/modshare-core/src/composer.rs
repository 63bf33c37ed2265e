//! Bounded file list for a mod draft
//!
//! The composer owns the files attached to a draft and enforces, after every
//! operation:
//! - at most [`MAX_FILE_COUNT`] entries,
//! - at most [`MAX_TEXT_FILE_COUNT`] entries with content type `text/plain`,
//! - every entry at most [`MAX_FILE_SIZE`] bytes.
//!
//! Entries are immutable once added; the list only changes by appending,
//! removing, or whole-list replacement.

use crate::limits::{
    DEFAULT_CONTENT_TYPE, MAX_FILE_COUNT, MAX_FILE_SIZE, MAX_TEXT_FILE_COUNT, TEXT_CONTENT_TYPE,
};
use crate::types::ModFile;

/// File chosen in a file picker, before it joins the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    /// Name reported by the picker
    pub name: String,
    /// MIME type reported by the picker, if any
    pub mime_type: Option<String>,
    /// File bytes
    pub content: Vec<u8>,
}

impl UploadCandidate {
    /// Create candidate without a MIME type
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    /// With MIME type; blank types count as missing
    #[inline]
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        self.mime_type = (!mime_type.trim().is_empty()).then_some(mime_type);
        self
    }

    fn into_file(self) -> ModFile {
        ModFile {
            filename: self.name,
            content_type: self
                .mime_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            content: self.content,
        }
    }
}

/// Reasons the composer refuses a file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    /// Total file cap reached
    #[error("Maximum {max} files allowed")]
    FileLimitReached { max: usize },

    /// Text file cap reached
    #[error("Maximum {max} text files allowed")]
    TextFileLimitReached { max: usize },

    /// File larger than the per-file limit
    #[error("{filename}: File size must be less than {max_mb}MB")]
    FileTooLarge { filename: String, max_mb: u64 },

    /// Text file created without a name
    #[error("Please enter a filename")]
    EmptyFilename,
}

/// A refused upload and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Name of the refused file
    pub filename: String,
    /// Reason shown to the user
    pub error: ComposerError,
}

/// Result of adding a picker selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Number of files appended
    pub added: usize,
    /// Files refused, in selection order
    pub rejected: Vec<Rejection>,
}

impl UploadOutcome {
    /// Success notice, when anything was added
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        (self.added > 0).then(|| format!("Added {} file(s)", self.added))
    }
}

/// Bounded, ordered file list of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileComposer {
    files: Vec<ModFile>,
}

impl FileComposer {
    /// Create empty composer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create composer from existing files
    ///
    /// # Errors
    /// Same as [`FileComposer::replace_files`].
    pub fn from_files(files: Vec<ModFile>) -> Result<Self, ComposerError> {
        let mut composer = Self::new();
        composer.replace_files(files)?;
        Ok(composer)
    }

    /// Attached files in order
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[ModFile] {
        &self.files
    }

    /// Number of attached files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no files are attached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of `text/plain` entries
    #[must_use]
    pub fn text_file_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_text()).count()
    }

    /// Whether the upload control should be enabled
    #[inline]
    #[must_use]
    pub fn can_upload(&self) -> bool {
        self.files.len() < MAX_FILE_COUNT
    }

    /// Whether the create-text-file control should be enabled
    #[inline]
    #[must_use]
    pub fn can_create_text_file(&self) -> bool {
        self.can_upload() && self.text_file_count() < MAX_TEXT_FILE_COUNT
    }

    /// Append a picker selection
    ///
    /// Each candidate is checked on its own; a refused file does not stop
    /// the rest of the selection from being processed.
    pub fn add_uploaded_files<I>(&mut self, selection: I) -> UploadOutcome
    where
        I: IntoIterator<Item = UploadCandidate>,
    {
        let mut outcome = UploadOutcome::default();

        for candidate in selection {
            let file = candidate.into_file();
            match self.check_admissible(&file) {
                Ok(()) => {
                    tracing::debug!(filename = %file.filename, size = file.size(), "file added");
                    self.files.push(file);
                    outcome.added += 1;
                }
                Err(error) => {
                    tracing::debug!(filename = %file.filename, %error, "file rejected");
                    outcome.rejected.push(Rejection {
                        filename: file.filename,
                        error,
                    });
                }
            }
        }

        outcome
    }

    /// Append a text file typed into the wizard
    ///
    /// # Errors
    /// - `EmptyFilename` if the trimmed name is empty
    /// - `TextFileLimitReached` if five text files already exist
    /// - `FileLimitReached` if the list is full
    /// - `FileTooLarge` if the UTF-8 content exceeds the size limit
    pub fn add_text_file(&mut self, filename: &str, text: &str) -> Result<(), ComposerError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(ComposerError::EmptyFilename);
        }

        let file = ModFile::new(filename, TEXT_CONTENT_TYPE, text.as_bytes());
        self.check_admissible(&file)?;

        tracing::debug!(filename, "text file created");
        self.files.push(file);
        Ok(())
    }

    /// Remove the file at `index`, keeping the order of the rest
    ///
    /// Out-of-range indexes leave the list untouched.
    pub fn remove_file(&mut self, index: usize) -> Option<ModFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    /// Replace the whole list
    ///
    /// # Errors
    /// The first invariant the new list would break; the current list is
    /// kept in that case.
    pub fn replace_files(&mut self, files: Vec<ModFile>) -> Result<(), ComposerError> {
        let mut staged = Self::new();
        for file in files {
            staged.check_admissible(&file)?;
            staged.files.push(file);
        }
        *self = staged;
        Ok(())
    }

    /// Remove every file
    #[inline]
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Consume into the file list
    #[inline]
    #[must_use]
    pub fn into_files(self) -> Vec<ModFile> {
        self.files
    }

    fn check_admissible(&self, file: &ModFile) -> Result<(), ComposerError> {
        if self.files.len() >= MAX_FILE_COUNT {
            return Err(ComposerError::FileLimitReached {
                max: MAX_FILE_COUNT,
            });
        }
        if file.is_text() && self.text_file_count() >= MAX_TEXT_FILE_COUNT {
            return Err(ComposerError::TextFileLimitReached {
                max: MAX_TEXT_FILE_COUNT,
            });
        }
        if file.size() > MAX_FILE_SIZE {
            return Err(ComposerError::FileTooLarge {
                filename: file.filename.clone(),
                max_mb: MAX_FILE_SIZE / 1024 / 1024,
            });
        }
        Ok(())
    }
}
