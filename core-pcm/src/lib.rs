//! # Raw PCM Explorer Core
//!
//! Guesses how a headerless audio dump is encoded by decoding it under a
//! fixed set of format hypotheses and filtering out the implausible ones.
//!
//! ## Overview
//!
//! - [`codec`] - linear, companded and 16-bit export sample conversion
//! - [`heuristics`] - silence, clipping and scale plausibility checks
//! - [`candidates`] - the ordered candidate list and accepted input names
//! - [`preview`] - cancellable per-candidate preview runs
//! - [`full`] - whole-file decode, external decoder for ADPCM formats
//! - [`engine`] - lazily initialized, retry-on-failure decoder engine cache
//! - [`wav`] - RIFF/WAVE container export
//! - [`explorer`] - session facade for host UIs

pub mod candidates;
pub mod codec;
pub mod engine;
pub mod error;
pub mod explorer;
pub mod format;
pub mod full;
pub mod heuristics;
pub mod playback;
pub mod preview;
pub mod wav;

pub use candidates::{enumerate_candidates, find_candidate, is_supported_input};
pub use engine::EngineCache;
pub use error::{PcmError, Result};
pub use explorer::{Explorer, InputFile, WavExport};
pub use format::{Candidate, DecodedBuffer, Encoding, FormatDescriptor, HiddenReason, Verdict};
pub use full::FullDecoder;
pub use heuristics::{SignalReport, SignalStats};
pub use preview::{
    PreviewCoordinator, PreviewRun, PreviewSnapshot, PreviewStatus, RunOutcome,
};
pub use wav::make_container;
