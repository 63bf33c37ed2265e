//! Native share sheet with clipboard fallback

use crate::error::ShareError;
use async_trait::async_trait;

/// Content handed to the share sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    /// Link being shared
    pub url: String,
    /// Optional title
    pub title: Option<String>,
    /// Optional message
    pub text: Option<String>,
}

impl SharePayload {
    /// Share just a link
    #[inline]
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            text: None,
        }
    }

    /// Set title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set message
    #[inline]
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Platform share sheet
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Check if the platform can share this payload
    fn can_share(&self, payload: &SharePayload) -> bool;

    /// Open the share sheet
    async fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

/// Platform clipboard
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace clipboard contents
    async fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

/// How a link reached the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Shared through the share sheet
    Shared,
    /// Copied to the clipboard
    Copied,
    /// Neither worked
    Failed,
}

impl ShareOutcome {
    /// Toast shown for the outcome
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Shared => "Link shared!",
            Self::Copied => "Link copied to clipboard!",
            Self::Failed => "Failed to copy link",
        }
    }
}

/// Open the share sheet, falling back to copying the link
///
/// A cancelled share sheet also falls back, so the user always ends up
/// with the link somewhere.
pub async fn share_or_copy(
    sheet: &dyn ShareSheet,
    clipboard: &dyn Clipboard,
    payload: &SharePayload,
) -> ShareOutcome {
    if sheet.can_share(payload) {
        match sheet.share(payload).await {
            Ok(()) => return ShareOutcome::Shared,
            Err(e) => tracing::debug!(error = %e, "share sheet failed, copying instead"),
        }
    }
    copy_link(clipboard, &payload.url).await
}

/// Copy a link to the clipboard
pub async fn copy_link(clipboard: &dyn Clipboard, url: &str) -> ShareOutcome {
    match clipboard.write_text(url).await {
        Ok(()) => ShareOutcome::Copied,
        Err(e) => {
            tracing::warn!(error = %e, "clipboard write failed");
            ShareOutcome::Failed
        }
    }
}
