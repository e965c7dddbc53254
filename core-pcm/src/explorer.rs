//! # Explorer
//!
//! Session facade tying the pieces together for a host UI.
//!
//! - Loading a file or changing settings restarts the preview run.
//! - Opening a detail view fully decodes one candidate; reopening replaces
//!   the decode in flight rather than queueing behind it.
//! - Full decodes, exports and playback decodes never overlap.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use core_pcm::Explorer;
//! use core_runtime::config::CoreConfig;
//!
//! # async fn demo(data: Vec<u8>) -> core_pcm::Result<()> {
//! let explorer = Explorer::new(CoreConfig::builder().build()?);
//! let run = explorer.load_file("capture.raw", Bytes::from(data))?;
//! run.wait().await;
//!
//! for verdict in explorer.snapshot().visible() {
//!     println!("{}", verdict.candidate.label);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use bridge_traits::playback::PlaybackSessionId;
use bytes::Bytes;
use core_runtime::config::{CoreConfig, ExplorerSettings};
use core_runtime::logging::strip_path;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::candidates::{find_candidate, is_supported_input};
use crate::engine::EngineCache;
use crate::error::{PcmError, Result};
use crate::format::{Candidate, DecodedBuffer};
use crate::full::FullDecoder;
use crate::playback::PlaybackController;
use crate::preview::{PreviewCoordinator, PreviewRun, PreviewSnapshot, PreviewStatus};
use crate::wav;

/// The loaded input file.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub data: Bytes,
}

/// A finished WAVE export.
#[derive(Debug, Clone)]
pub struct WavExport {
    pub file_name: String,
    pub data: Bytes,
}

pub struct Explorer {
    settings: RwLock<ExplorerSettings>,
    input: RwLock<Option<InputFile>>,
    previews: PreviewCoordinator,
    decoder: FullDecoder,
    decode_lock: AsyncMutex<()>,
    detail: Mutex<Option<AbortHandle>>,
    playback: PlaybackController,
}

impl Explorer {
    pub fn new(config: CoreConfig) -> Arc<Self> {
        let engines = Arc::new(EngineCache::from_config(&config));
        Arc::new(Self {
            settings: RwLock::new(config.settings),
            input: RwLock::new(None),
            previews: PreviewCoordinator::new(),
            decoder: FullDecoder::new(engines),
            decode_lock: AsyncMutex::new(()),
            detail: Mutex::new(None),
            playback: PlaybackController::new(config.audio_output),
        })
    }

    // ------------------------------------------------------------------------
    // Input and settings
    // ------------------------------------------------------------------------

    /// Load a new input file and start previewing it.
    ///
    /// Verdicts of the previous input are dropped immediately.
    pub fn load_file(&self, name: &str, data: Bytes) -> Result<PreviewRun> {
        if !is_supported_input(name) {
            return Err(PcmError::UnsupportedInput(strip_path(name).to_string()));
        }

        info!(file = %strip_path(name), bytes = data.len(), "Loaded input");
        self.cancel_detail();
        *self.input.write() = Some(InputFile {
            name: name.to_string(),
            data: data.clone(),
        });
        Ok(self.previews.start(data, self.settings()))
    }

    /// Replace the settings and restart the preview if an input is loaded.
    pub fn update_settings(&self, settings: ExplorerSettings) -> Result<Option<PreviewRun>> {
        settings.validate()?;
        *self.settings.write() = settings.clone();
        debug!(?settings, "Settings updated");

        Ok(self
            .input()
            .map(|input| self.previews.start(input.data, settings)))
    }

    /// Drop the input and all verdicts.
    pub fn unload(&self) {
        self.cancel_detail();
        self.input.write().take();
        self.previews.clear();
    }

    pub fn settings(&self) -> ExplorerSettings {
        self.settings.read().clone()
    }

    pub fn input(&self) -> Option<InputFile> {
        self.input.read().clone()
    }

    pub fn snapshot(&self) -> PreviewSnapshot {
        self.previews.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewStatus> {
        self.previews.subscribe()
    }

    // ------------------------------------------------------------------------
    // Full decode
    // ------------------------------------------------------------------------

    /// Fully decode one candidate for the detail view.
    ///
    /// A later call replaces this one; the replaced caller gets
    /// [`PcmError::Superseded`].
    pub async fn open_detail(self: &Arc<Self>, candidate_id: &str) -> Result<DecodedBuffer> {
        let candidate = lookup(candidate_id)?;
        let input = self.input().ok_or(PcmError::NoInputLoaded)?;
        let settings = self.settings();

        let this = Arc::clone(self);
        let task = {
            // Spawn and replace under one lock so the newest request owns the slot.
            let mut slot = self.detail.lock();
            let task = tokio::spawn(async move {
                this.decode_exclusive(&input.data, &candidate, &settings)
                    .await
            });
            if let Some(previous) = slot.replace(task.abort_handle()) {
                previous.abort();
            }
            task
        };

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(PcmError::Superseded),
            Err(e) => Err(PcmError::Internal(format!("detail decode task failed: {}", e))),
        }
    }

    /// Fully decode a candidate and wrap it in a WAVE container labeled with
    /// the playback sample rate.
    pub async fn export_wav(&self, candidate_id: &str) -> Result<WavExport> {
        let candidate = lookup(candidate_id)?;
        let input = self.input().ok_or(PcmError::NoInputLoaded)?;
        let settings = self.settings();

        let data = {
            let _guard = self.decode_lock.lock().await;
            self.decoder
                .export_candidate(&input.data, &candidate, &settings)
                .await?
        };
        info!(candidate = %candidate.id, bytes = data.len(), "Exported WAVE");
        Ok(WavExport {
            file_name: wav::export_file_name(&input.name, &candidate),
            data,
        })
    }

    // ------------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------------

    /// Fully decode a candidate and play it, stopping any active playback.
    pub async fn play(&self, candidate_id: &str) -> Result<PlaybackSessionId> {
        if !self.playback.has_output() {
            return Err(PcmError::NoAudioOutput);
        }
        let candidate = lookup(candidate_id)?;
        let input = self.input().ok_or(PcmError::NoInputLoaded)?;
        let settings = self.settings();

        let buffer = self.decode_exclusive(&input.data, &candidate, &settings).await?;
        self.playback.play(&buffer, &candidate, &settings).await
    }

    pub async fn stop_playback(&self) -> Result<()> {
        self.playback.stop().await
    }

    pub async fn active_playback(&self) -> Option<PlaybackSessionId> {
        self.playback.active().await
    }

    async fn decode_exclusive(
        &self,
        input: &Bytes,
        candidate: &Candidate,
        settings: &ExplorerSettings,
    ) -> Result<DecodedBuffer> {
        let _guard = self.decode_lock.lock().await;
        self.decoder.decode_full(input, candidate, settings).await
    }

    fn cancel_detail(&self) {
        if let Some(task) = self.detail.lock().take() {
            task.abort();
        }
    }
}

fn lookup(candidate_id: &str) -> Result<Candidate> {
    find_candidate(candidate_id).ok_or_else(|| PcmError::UnknownCandidate(candidate_id.to_string()))
}
