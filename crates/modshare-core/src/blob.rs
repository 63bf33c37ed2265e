//! Opaque media payloads stored by the backend
//!
//! An [`ExternalBlob`] is either a byte buffer about to be uploaded or a
//! reference to content the backend already serves by URL. Upload progress
//! is pushed to an observer as the backend ingests the bytes; nothing polls.

use std::fmt;
use std::sync::Arc;

/// Observer notified with upload completion percentages (0..=100)
pub trait UploadProgress: Send + Sync {
    /// Called each time more of the payload has been stored
    fn on_progress(&self, percentage: u8);
}

impl<F> UploadProgress for F
where
    F: Fn(u8) + Send + Sync,
{
    fn on_progress(&self, percentage: u8) {
        self(percentage);
    }
}

/// Blob access errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    /// Blob only references remote content
    #[error("blob content at {url} has not been fetched")]
    NotLoaded { url: String },
}

#[derive(Clone, PartialEq, Eq)]
enum BlobSource {
    Bytes(Arc<[u8]>),
    Url(String),
}

/// Media payload with an optional upload progress observer
#[derive(Clone)]
pub struct ExternalBlob {
    source: BlobSource,
    progress: Option<Arc<dyn UploadProgress>>,
}

impl ExternalBlob {
    /// Blob holding local bytes
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: BlobSource::Bytes(bytes.into().into()),
            progress: None,
        }
    }

    /// Blob referencing content served by the backend
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: BlobSource::Url(url.into()),
            progress: None,
        }
    }

    /// With an upload progress observer
    #[must_use]
    pub fn with_upload_progress(mut self, observer: impl UploadProgress + 'static) -> Self {
        self.progress = Some(Arc::new(observer));
        self
    }

    /// Local bytes
    ///
    /// # Errors
    /// `NotLoaded` for URL-backed blobs.
    pub fn bytes(&self) -> Result<&[u8], BlobError> {
        match &self.source {
            BlobSource::Bytes(bytes) => Ok(bytes),
            BlobSource::Url(url) => Err(BlobError::NotLoaded { url: url.clone() }),
        }
    }

    /// URL the backend serves this blob from, if already stored
    #[inline]
    #[must_use]
    pub fn direct_url(&self) -> Option<&str> {
        match &self.source {
            BlobSource::Url(url) => Some(url),
            BlobSource::Bytes(_) => None,
        }
    }

    /// Size of local bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        self.bytes().ok().map(<[u8]>::len)
    }

    /// Check for an empty local payload
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Push a progress update to the observer, if any
    pub fn notify_progress(&self, percentage: u8) {
        if let Some(observer) = &self.progress {
            observer.on_progress(percentage.min(100));
        }
    }

    /// Check if an observer is attached
    #[inline]
    #[must_use]
    pub fn has_progress_observer(&self) -> bool {
        self.progress.is_some()
    }
}

impl PartialEq for ExternalBlob {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for ExternalBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ExternalBlob");
        match &self.source {
            BlobSource::Bytes(bytes) => s.field("bytes", &bytes.len()),
            BlobSource::Url(url) => s.field("url", url),
        };
        s.field("observed", &self.progress.is_some()).finish()
    }
}
