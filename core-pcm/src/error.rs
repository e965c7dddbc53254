//! # Explorer Error Types
//!
//! Error types for decoding, previewing and exporting raw PCM candidates.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur in the explorer core.
#[derive(Error, Debug)]
pub enum PcmError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The uploaded file name does not carry an accepted suffix.
    #[error("Unsupported input file: {0} (expected .pcm, .raw, .vox, .g721, .g726 or .adpcm)")]
    UnsupportedInput(String),

    /// An operation needed the input buffer but none is loaded.
    #[error("No input file loaded")]
    NoInputLoaded,

    /// Candidate identifier is not part of the enumerated set.
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// The codec was asked to decode a format it cannot decode directly.
    ///
    /// ADPCM-family formats must be routed to the external decoder.
    #[error("Format cannot be decoded directly: {0}")]
    UnsupportedFormat(String),

    /// A single candidate failed to decode.
    #[error("Decoding failed for {candidate}: {reason}")]
    DecodeFailed { candidate: String, reason: String },

    /// Every hint variant of the external decoder failed or produced nothing.
    #[error(
        "External decoding failed for {candidate}: {}",
        describe_attempts(.attempts, .log)
    )]
    ExternalDecodeFailed {
        candidate: String,
        attempts: Vec<String>,
        log: Vec<String>,
    },

    /// The external decoder could not be initialized from any source.
    #[error("External decoder unavailable: {}", .attempts.join("; "))]
    InitError { attempts: Vec<String> },

    /// A newer detail decode replaced this one before it finished.
    #[error("Decode superseded by a newer request")]
    Superseded,

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// No audio output was configured.
    #[error("Audio output unavailable")]
    NoAudioOutput,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Error reported by a host bridge.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Runtime/configuration error.
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PcmError {
    /// Returns `true` if retrying the same operation later may succeed.
    ///
    /// Engine initialization failures are never cached, so they are retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PcmError::InitError { .. } | PcmError::Bridge(_))
    }

    /// Returns `true` if this error concerns a decode of a specific candidate.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            PcmError::UnsupportedFormat(_)
                | PcmError::DecodeFailed { .. }
                | PcmError::ExternalDecodeFailed { .. }
        )
    }

    /// Captured decoder log lines, if the error carries any.
    pub fn decoder_log(&self) -> &[String] {
        match self {
            PcmError::ExternalDecodeFailed { log, .. } => log,
            _ => &[],
        }
    }
}

fn describe_attempts(attempts: &[String], log: &[String]) -> String {
    let mut text = attempts.join("; ");
    if !log.is_empty() {
        text.push_str("\ndecoder log:\n");
        text.push_str(&log.join("\n"));
    }
    text
}

/// Result type for explorer operations.
pub type Result<T> = std::result::Result<T, PcmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_failure_message_includes_log() {
        let err = PcmError::ExternalDecodeFailed {
            candidate: "g726-adpcm-1ch".into(),
            attempts: vec!["g726le: engine exited with 1".into(), "g726: empty output".into()],
            log: vec!["Invalid data found when processing input".into()],
        };
        let text = err.to_string();
        assert!(text.contains("g726-adpcm-1ch"));
        assert!(text.contains("g726le: engine exited with 1; g726: empty output"));
        assert!(text.contains("Invalid data found"));
        assert_eq!(err.decoder_log().len(), 1);
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(PcmError::InitError { attempts: vec![] }.is_retryable());
        assert!(!PcmError::Superseded.is_retryable());
        assert!(!PcmError::UnsupportedFormat("oki".into()).is_retryable());
    }
}
