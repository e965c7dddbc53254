//! Audio output bridge.
//!
//! The core hands fully decoded PCM to the host for listening. The host owns
//! the audio device; the core only guarantees it never asks for two sessions at
//! once.

use crate::error::Result;
use uuid::Uuid;

/// Unique identifier for playback sessions managed by a host output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Request describing decoded audio the host should play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    /// Interleaved samples in the range `[-1.0, 1.0]`, frame-major.
    pub samples: Vec<f32>,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate the samples were framed at.
    pub sample_rate: u32,
    /// Speed multiplier applied on top of `sample_rate` (1.0 = as framed).
    pub speed: f32,
    /// Label surfaced by the host (e.g. the candidate name).
    pub label: String,
}

impl PlaybackRequest {
    /// Number of frames in the request.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Effective device rate (`sample_rate * speed`).
    pub fn effective_rate(&self) -> f32 {
        self.sample_rate as f32 * self.speed
    }
}

/// Host audio output.
#[async_trait::async_trait]
pub trait AudioOutput: Send + Sync {
    /// Begin playing `request`, returning a handle for later control.
    async fn start(&self, request: PlaybackRequest) -> Result<PlaybackSessionId>;

    /// Stop the session and release its resources. Stopping an unknown or
    /// already finished session is not an error.
    async fn stop(&self, session: PlaybackSessionId) -> Result<()>;
}
