//! # Raw PCM Format Types
//!
//! Data model shared by the codec, heuristics, preview pipeline and exporters.
//!
//! A [`FormatDescriptor`] is a hypothesis about how a headerless byte buffer
//! is laid out. A [`Candidate`] pairs a hypothesis with a stable identifier
//! and a human label; a [`Verdict`] records what happened when that
//! hypothesis was tried against the loaded input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::heuristics::SignalReport;

// ============================================================================
// Encodings
// ============================================================================

/// Sample encodings the explorer knows about.
///
/// Linear and companded encodings are decoded in-process. ADPCM-family
/// encodings carry no fixed bytes-per-sample and must go through the
/// external decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Unsigned 8-bit, biased at 128
    Unsigned8,
    /// Signed 16-bit little-endian
    Signed16Le,
    /// Signed 16-bit big-endian
    Signed16Be,
    /// Signed 24-bit little-endian
    Signed24Le,
    /// Signed 24-bit big-endian
    Signed24Be,
    /// Signed 32-bit little-endian
    Signed32Le,
    /// IEEE-754 32-bit float little-endian
    Float32Le,
    /// G.711 µ-law
    MuLaw,
    /// G.711 A-law
    ALaw,
    /// OKI/Dialogic 4-bit ADPCM
    OkiAdpcm,
    /// G.726 ADPCM (32 kbit/s code size)
    G726Adpcm,
}

impl Encoding {
    /// Bytes per sample on the wire, `None` for variable-rate ADPCM formats.
    pub fn bytes_per_sample(&self) -> Option<usize> {
        match self {
            Encoding::Unsigned8 | Encoding::MuLaw | Encoding::ALaw => Some(1),
            Encoding::Signed16Le | Encoding::Signed16Be => Some(2),
            Encoding::Signed24Le | Encoding::Signed24Be => Some(3),
            Encoding::Signed32Le | Encoding::Float32Le => Some(4),
            Encoding::OkiAdpcm | Encoding::G726Adpcm => None,
        }
    }

    /// Returns `true` if the encoding requires the external decoder.
    pub fn is_adpcm(&self) -> bool {
        matches!(self, Encoding::OkiAdpcm | Encoding::G726Adpcm)
    }

    /// Short machine name used in identifiers and file names.
    pub fn short_name(&self) -> &'static str {
        match self {
            Encoding::Unsigned8 => "u8",
            Encoding::Signed16Le => "s16le",
            Encoding::Signed16Be => "s16be",
            Encoding::Signed24Le => "s24le",
            Encoding::Signed24Be => "s24be",
            Encoding::Signed32Le => "s32le",
            Encoding::Float32Le => "f32le",
            Encoding::MuLaw => "mulaw",
            Encoding::ALaw => "alaw",
            Encoding::OkiAdpcm => "oki-adpcm",
            Encoding::G726Adpcm => "g726-adpcm",
        }
    }

    /// Human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Unsigned8 => "Unsigned 8-bit",
            Encoding::Signed16Le => "Signed 16-bit LE",
            Encoding::Signed16Be => "Signed 16-bit BE",
            Encoding::Signed24Le => "Signed 24-bit LE",
            Encoding::Signed24Be => "Signed 24-bit BE",
            Encoding::Signed32Le => "Signed 32-bit LE",
            Encoding::Float32Le => "Float 32-bit LE",
            Encoding::MuLaw => "G.711 µ-law",
            Encoding::ALaw => "G.711 A-law",
            Encoding::OkiAdpcm => "OKI/Dialogic ADPCM",
            Encoding::G726Adpcm => "G.726 ADPCM",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ============================================================================
// Format Descriptor
// ============================================================================

/// A hypothesis about the layout of a raw buffer.
///
/// Channels are interleaved frame by frame. Only mono and stereo layouts are
/// considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub encoding: Encoding,
    pub channels: u16,
}

impl FormatDescriptor {
    pub const fn new(encoding: Encoding, channels: u16) -> Self {
        Self { encoding, channels }
    }

    pub const fn mono(encoding: Encoding) -> Self {
        Self::new(encoding, 1)
    }

    pub const fn stereo(encoding: Encoding) -> Self {
        Self::new(encoding, 2)
    }

    /// Bytes per sample on the wire.
    pub fn bytes_per_sample(&self) -> Option<usize> {
        self.encoding.bytes_per_sample()
    }

    /// Bytes per interleaved frame.
    pub fn bytes_per_frame(&self) -> Option<usize> {
        self.bytes_per_sample()
            .map(|bytes| bytes * usize::from(self.channels.max(1)))
    }

    /// Number of whole frames in a buffer of `byte_len` bytes.
    ///
    /// Trailing partial frames are ignored. ADPCM formats report the byte
    /// count per channel, which is only an upper bound used for preview
    /// budgeting.
    pub fn available_frames(&self, byte_len: usize) -> usize {
        match self.bytes_per_frame() {
            Some(frame) => byte_len / frame,
            None => byte_len / usize::from(self.channels.max(1)),
        }
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    fn layout_label(&self) -> &'static str {
        if self.is_stereo() {
            "stereo"
        } else {
            "mono"
        }
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.encoding.label(), self.layout_label())
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// A format hypothesis with a stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique stable identifier (e.g. `s16le-1ch`)
    pub id: String,
    /// Human readable label
    pub label: String,
    pub format: FormatDescriptor,
}

impl Candidate {
    pub fn new(format: FormatDescriptor) -> Self {
        Self {
            id: format!("{}-{}ch", format.encoding.short_name(), format.channels),
            label: format.to_string(),
            format,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.format.encoding
    }

    pub fn channels(&self) -> u16 {
        self.format.channels
    }

    /// Returns `true` if the candidate must go through the external decoder.
    pub fn needs_external_decoder(&self) -> bool {
        self.format.encoding.is_adpcm()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

// ============================================================================
// Decoded Audio
// ============================================================================

/// Decoded audio as one float sequence per channel, values in `[-1, 1]`.
///
/// All channel sequences have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBuffer {
    channels: Vec<Vec<f32>>,
}

impl DecodedBuffer {
    /// Buffer with `channels` empty channel sequences.
    pub fn empty(channels: u16) -> Self {
        Self {
            channels: vec![Vec::new(); usize::from(channels)],
        }
    }

    /// Wrap per-channel sequences. Returns `None` if lengths differ.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Option<Self> {
        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if channels.iter().any(|c| c.len() != frames) {
            return None;
        }
        Some(Self { channels })
    }

    /// De-interleave samples. Trailing samples of an incomplete frame are dropped.
    pub fn from_interleaved(samples: &[f32], channels: u16) -> Self {
        let count = usize::from(channels.max(1));
        let mut planes = vec![Vec::with_capacity(samples.len() / count); count];
        for frame in samples.chunks_exact(count) {
            for (plane, sample) in planes.iter_mut().zip(frame) {
                plane.push(*sample);
            }
        }
        Self { channels: planes }
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Interleave back into `LRLR...` order.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for plane in &self.channels {
                out.push(plane[i]);
            }
        }
        out
    }

    /// Duration in seconds at the given sample rate.
    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(sample_rate)
    }
}

// ============================================================================
// Verdicts
// ============================================================================

/// Why a candidate is hidden from the default listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenReason {
    Silent,
    Clipped,
    ScaleAnomaly,
    DecodeFailed,
    NeedsExternalDecoder,
}

impl HiddenReason {
    pub fn label(&self) -> &'static str {
        match self {
            HiddenReason::Silent => "silent / flat",
            HiddenReason::Clipped => "clipped",
            HiddenReason::ScaleAnomaly => "scale anomaly",
            HiddenReason::DecodeFailed => "decode failed",
            HiddenReason::NeedsExternalDecoder => "needs external decoder",
        }
    }
}

impl fmt::Display for HiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of previewing one candidate.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub candidate: Candidate,
    /// Decoded preview, empty for failed or externally decoded candidates
    pub preview: Arc<DecodedBuffer>,
    pub hidden_reason: Option<HiddenReason>,
    /// Signal measurements of the downmixed preview, if it was decoded
    pub signals: Option<SignalReport>,
    /// Error text for [`HiddenReason::DecodeFailed`]
    pub error: Option<String>,
}

impl Verdict {
    pub fn is_visible(&self) -> bool {
        self.hidden_reason.is_none()
    }

    pub(crate) fn needs_external(candidate: Candidate) -> Self {
        let channels = candidate.channels();
        Self {
            candidate,
            preview: Arc::new(DecodedBuffer::empty(channels)),
            hidden_reason: Some(HiddenReason::NeedsExternalDecoder),
            signals: None,
            error: None,
        }
    }

    pub(crate) fn failed(candidate: Candidate, error: String) -> Self {
        let channels = candidate.channels();
        Self {
            candidate,
            preview: Arc::new(DecodedBuffer::empty(channels)),
            hidden_reason: Some(HiddenReason::DecodeFailed),
            signals: None,
            error: Some(error),
        }
    }
}
