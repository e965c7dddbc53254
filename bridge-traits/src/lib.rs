//! # Host Bridge Traits
//!
//! Capability traits that a host must implement for the raw-PCM explorer core.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and the
//! environment it runs in. Each trait represents a capability that the core
//! requires but that is implemented differently per host (desktop process,
//! browser module, test double).
//!
//! ## Traits
//!
//! - [`EngineLoader`](decoder::EngineLoader) / [`DecoderEngine`](decoder::DecoderEngine) -
//!   external ADPCM/G.726 decoder with a byte-in/byte-out command surface
//! - [`AudioOutput`](playback::AudioOutput) - plays decoded PCM on the host device
//! - [`LoggerSink`](logging::LoggerSink) - forwards structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep messages actionable, since
//! the core surfaces them verbatim when a user-initiated decode fails.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks.

pub mod decoder;
pub mod error;
pub mod logging;
pub mod playback;

pub use error::BridgeError;

pub use decoder::{DecoderEngine, EngineLoader, EngineSource, EngineTransport};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use playback::{AudioOutput, PlaybackRequest, PlaybackSessionId};
