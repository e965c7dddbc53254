//! # Preview Pipeline
//!
//! Decodes a short prefix of the input under every candidate and publishes
//! one [`Verdict`] per candidate to a shared board.
//!
//! ## Runs and generations
//!
//! Every call to [`PreviewCoordinator::start`] opens a new generation and
//! clears the board. A run only publishes while its generation is still the
//! current one; the check and the write happen under the same lock, so a
//! superseded run can never add verdicts to a newer run's board. The
//! previous run's [`CancellationToken`] is also cancelled so it stops at the
//! next candidate boundary instead of burning CPU.
//!
//! ```text
//! start(A) ──► gen 1 ── publish ── publish ──╳ (cancelled, stale writes rejected)
//! start(B) ───────────────► gen 2 ── publish ── publish ── ... ── complete
//! ```
//!
//! Runs yield to the scheduler between candidates.

use std::sync::Arc;

use bytes::Bytes;
use core_runtime::config::ExplorerSettings;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn, Instrument};

use crate::candidates::limited_candidates;
use crate::codec;
use crate::format::{Candidate, FormatDescriptor, Verdict};
use crate::heuristics::SignalReport;

// ============================================================================
// Single-candidate preview
// ============================================================================

/// Frames decoded for a preview: the available frames capped by the
/// assumed rate times the preview length.
pub fn preview_frame_count(
    byte_len: usize,
    format: &FormatDescriptor,
    settings: &ExplorerSettings,
) -> usize {
    format
        .available_frames(byte_len)
        .min(settings.preview_frames())
}

/// Preview one candidate.
///
/// Returns `None` when the input holds no complete frame for the candidate.
/// ADPCM candidates are not decoded here and are reported as needing the
/// external decoder. Decode errors become a `DecodeFailed` verdict.
pub fn preview_candidate(
    input: &[u8],
    candidate: &Candidate,
    settings: &ExplorerSettings,
) -> Option<Verdict> {
    let frames = preview_frame_count(input.len(), &candidate.format, settings);
    if frames == 0 {
        trace!(candidate = %candidate.id, "No complete frame, skipping");
        return None;
    }

    if candidate.needs_external_decoder() {
        return Some(Verdict::needs_external(candidate.clone()));
    }

    match codec::decode(input, &candidate.format, Some(frames)) {
        Ok(buffer) => {
            let mono = codec::downmix(&buffer);
            let signals = SignalReport::analyze(&mono, &settings.thresholds);
            let hidden_reason = signals.hidden_reason(&settings.filters);
            trace!(
                candidate = %candidate.id,
                frames = buffer.frames(),
                std_dev = signals.stats.std_dev,
                hidden = ?hidden_reason,
                "Previewed candidate"
            );
            Some(Verdict {
                candidate: candidate.clone(),
                preview: Arc::new(buffer),
                hidden_reason,
                signals: Some(signals),
                error: None,
            })
        }
        Err(e) => {
            warn!(candidate = %candidate.id, error = %e, "Preview decode failed");
            Some(Verdict::failed(candidate.clone(), e.to_string()))
        }
    }
}

// ============================================================================
// Board
// ============================================================================

/// Consistent view of the published verdicts of one generation.
#[derive(Debug, Clone, Default)]
pub struct PreviewSnapshot {
    pub generation: u64,
    /// Verdicts in candidate enumeration order
    pub verdicts: Vec<Arc<Verdict>>,
    /// `true` once the run of this generation processed every candidate
    pub complete: bool,
}

impl PreviewSnapshot {
    /// Verdicts that no enabled filter hides.
    pub fn visible(&self) -> impl Iterator<Item = &Arc<Verdict>> {
        self.verdicts.iter().filter(|v| v.is_visible())
    }

    /// Verdicts hidden by a filter, a failure or the external-decoder rule.
    pub fn hidden(&self) -> impl Iterator<Item = &Arc<Verdict>> {
        self.verdicts.iter().filter(|v| !v.is_visible())
    }

    pub fn find(&self, candidate_id: &str) -> Option<&Arc<Verdict>> {
        self.verdicts.iter().find(|v| v.candidate.id == candidate_id)
    }
}

/// Lightweight change notification sent on every board update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewStatus {
    pub generation: u64,
    pub published: usize,
    pub complete: bool,
}

/// How a preview run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every candidate was processed and the board marked complete.
    Completed { published: usize },
    /// A newer run started first; remaining work was discarded.
    Superseded,
}

#[derive(Default)]
struct Board {
    generation: u64,
    verdicts: Vec<Arc<Verdict>>,
    complete: bool,
    cancel: Option<CancellationToken>,
}

impl Board {
    fn status(&self) -> PreviewStatus {
        PreviewStatus {
            generation: self.generation,
            published: self.verdicts.len(),
            complete: self.complete,
        }
    }
}

struct Inner {
    board: Mutex<Board>,
    status: watch::Sender<PreviewStatus>,
}

impl Inner {
    /// Open a new generation, cancelling whatever run owned the previous one.
    fn advance(&self, token: Option<CancellationToken>) -> u64 {
        let mut board = self.board.lock();
        board.generation += 1;
        board.verdicts.clear();
        board.complete = false;
        if let Some(previous) = std::mem::replace(&mut board.cancel, token) {
            previous.cancel();
        }
        self.status.send_replace(board.status());
        board.generation
    }

    fn publish(&self, generation: u64, verdict: Verdict) -> bool {
        let mut board = self.board.lock();
        if board.generation != generation {
            return false;
        }
        board.verdicts.push(Arc::new(verdict));
        self.status.send_replace(board.status());
        true
    }

    fn finish(&self, generation: u64) -> bool {
        let mut board = self.board.lock();
        if board.generation != generation {
            return false;
        }
        board.complete = true;
        board.cancel = None;
        self.status.send_replace(board.status());
        true
    }

    async fn run(
        &self,
        generation: u64,
        token: CancellationToken,
        input: Bytes,
        settings: ExplorerSettings,
    ) -> RunOutcome {
        let candidates = limited_candidates(settings.candidate_limit);
        debug!(
            candidates = candidates.len(),
            input_bytes = input.len(),
            "Preview run started"
        );

        let mut published = 0;
        for candidate in &candidates {
            if token.is_cancelled() {
                debug!(published, "Preview run cancelled");
                return RunOutcome::Superseded;
            }

            if let Some(verdict) = preview_candidate(&input, candidate, &settings) {
                if !self.publish(generation, verdict) {
                    debug!(candidate = %candidate.id, "Discarding stale verdict");
                    return RunOutcome::Superseded;
                }
                published += 1;
            }

            tokio::task::yield_now().await;
        }

        if self.finish(generation) {
            info!(published, "Preview run complete");
            RunOutcome::Completed { published }
        } else {
            RunOutcome::Superseded
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Handle to a spawned preview run.
#[derive(Debug)]
pub struct PreviewRun {
    generation: u64,
    handle: JoinHandle<RunOutcome>,
}

impl PreviewRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the run to end. An aborted task counts as superseded.
    pub async fn wait(self) -> RunOutcome {
        self.handle.await.unwrap_or(RunOutcome::Superseded)
    }
}

/// Owns the verdict board and the single live preview run.
///
/// Cloning yields another handle to the same board.
#[derive(Clone)]
pub struct PreviewCoordinator {
    inner: Arc<Inner>,
}

impl PreviewCoordinator {
    pub fn new() -> Self {
        let (status, _) = watch::channel(PreviewStatus::default());
        Self {
            inner: Arc::new(Inner {
                board: Mutex::new(Board::default()),
                status,
            }),
        }
    }

    /// Start a preview run over `input`, superseding any run in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, input: Bytes, settings: ExplorerSettings) -> PreviewRun {
        let token = CancellationToken::new();
        let generation = self.inner.advance(Some(token.clone()));
        let inner = Arc::clone(&self.inner);
        let span = tracing::info_span!("preview_run", generation);
        let handle = tokio::spawn(
            async move { inner.run(generation, token, input, settings).await }.instrument(span),
        );
        PreviewRun { generation, handle }
    }

    /// Drop all verdicts and stop the current run.
    pub fn clear(&self) -> u64 {
        self.inner.advance(None)
    }

    /// Copy of the current board.
    pub fn snapshot(&self) -> PreviewSnapshot {
        let board = self.inner.board.lock();
        PreviewSnapshot {
            generation: board.generation,
            verdicts: board.verdicts.clone(),
            complete: board.complete,
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.inner.board.lock().generation
    }

    /// Receive a [`PreviewStatus`] on every board change.
    ///
    /// Copy the status out of the receiver before calling back into the
    /// coordinator.
    pub fn subscribe(&self) -> watch::Receiver<PreviewStatus> {
        self.inner.status.subscribe()
    }
}

impl Default for PreviewCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
