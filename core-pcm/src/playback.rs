//! Single-slot playback control.
//!
//! At most one playback session is active. Starting a new one stops the
//! previous session first.

use std::sync::Arc;

use bridge_traits::playback::{AudioOutput, PlaybackRequest, PlaybackSessionId};
use core_runtime::config::ExplorerSettings;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{PcmError, Result};
use crate::format::{Candidate, DecodedBuffer};

pub struct PlaybackController {
    output: Option<Arc<dyn AudioOutput>>,
    active: Mutex<Option<PlaybackSessionId>>,
}

impl PlaybackController {
    pub fn new(output: Option<Arc<dyn AudioOutput>>) -> Self {
        Self {
            output,
            active: Mutex::new(None),
        }
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Play `buffer`, framed at the assumed rate and sped up to the playback rate.
    pub async fn play(
        &self,
        buffer: &DecodedBuffer,
        candidate: &Candidate,
        settings: &ExplorerSettings,
    ) -> Result<PlaybackSessionId> {
        let output = self.output.as_ref().ok_or(PcmError::NoAudioOutput)?;

        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            if let Err(e) = output.stop(previous).await {
                warn!(session = %previous.as_uuid(), error = %e, "Failed to stop previous playback");
            }
        }

        let request = PlaybackRequest {
            samples: buffer.interleaved(),
            channels: buffer.channel_count(),
            sample_rate: settings.assumed_sample_rate,
            speed: settings.playback_speed(),
            label: candidate.label.clone(),
        };
        let session = output.start(request).await?;
        debug!(session = %session.as_uuid(), candidate = %candidate.id, "Playback started");
        *active = Some(session);
        Ok(session)
    }

    /// Stop the active session, if any.
    pub async fn stop(&self) -> Result<()> {
        let Some(output) = self.output.as_ref() else {
            return Ok(());
        };
        let mut active = self.active.lock().await;
        if let Some(session) = active.take() {
            output.stop(session).await?;
            debug!(session = %session.as_uuid(), "Playback stopped");
        }
        Ok(())
    }

    pub async fn active(&self) -> Option<PlaybackSessionId> {
        *self.active.lock().await
    }
}
