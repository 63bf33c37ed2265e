//! Voice-over recorder state
//!
//! Captured audio arrives as chunks from the platform recorder; a stopped
//! take becomes one [`ExternalBlob`] ready to attach to a scene.

use crate::error::RecorderError;
use modshare_core::ExternalBlob;

/// Recorder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// Nothing captured
    #[default]
    Idle,
    /// Capturing
    Recording,
    /// Take finished and available
    Stopped,
}

/// Accumulates one voice-over take
#[derive(Debug, Default)]
pub struct AudioRecorder {
    state: RecorderState,
    chunks: Vec<Vec<u8>>,
    elapsed_secs: u32,
}

impl AudioRecorder {
    /// Create idle recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Seconds captured so far
    #[inline]
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// Elapsed time as `m:ss`
    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format!("{}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }

    /// Begin a new take, discarding any previous one
    ///
    /// # Errors
    /// `AlreadyRecording` while a take is running.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.state == RecorderState::Recording {
            return Err(RecorderError::AlreadyRecording);
        }
        self.chunks.clear();
        self.elapsed_secs = 0;
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Append captured audio; ignored unless recording
    pub fn push_chunk(&mut self, chunk: impl Into<Vec<u8>>) {
        if self.state == RecorderState::Recording {
            let chunk = chunk.into();
            if !chunk.is_empty() {
                self.chunks.push(chunk);
            }
        }
    }

    /// One second of wall time passed
    pub fn tick(&mut self) {
        if self.state == RecorderState::Recording {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    /// Finish the take
    ///
    /// # Errors
    /// `NotRecording` when no take is running.
    pub fn stop(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        self.state = RecorderState::Stopped;
        tracing::debug!(chunks = self.chunks.len(), secs = self.elapsed_secs, "recording stopped");
        Ok(())
    }

    /// Finished take as one blob, if there is audio
    #[must_use]
    pub fn recording(&self) -> Option<ExternalBlob> {
        if self.state != RecorderState::Stopped || self.chunks.is_empty() {
            return None;
        }
        Some(ExternalBlob::from_bytes(self.chunks.concat()))
    }

    /// Drop the take and go back to idle
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.elapsed_secs = 0;
        self.state = RecorderState::Idle;
    }
}
