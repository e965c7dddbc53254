//! External decoder engine abstractions.
//!
//! ADPCM-family payloads (OKI/Dialogic VOX, G.721/G.726) are not decoded by the
//! core. Hosts provide an engine with a byte-in/byte-out command surface: write
//! an input file into the engine's workspace, execute a command line, read the
//! produced output back. The engine is opaque to the core beyond that contract.
//!
//! Engines are created through an [`EngineLoader`], which may be asked to try
//! several [`EngineSource`] locations and [`EngineTransport`] variants before one
//! initializes successfully.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where an engine implementation should be loaded from.
///
/// For a process-backed engine this is an executable path or a bare command
/// name resolved through `PATH`; other hosts may interpret it as a URL to a
/// bundled module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineSource {
    /// Location string understood by the loader.
    pub location: String,
}

impl EngineSource {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl fmt::Display for EngineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// How the engine executes its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineTransport {
    /// Engine may offload work onto a secondary worker channel (threads).
    WithWorker,
    /// Engine runs everything on its primary channel.
    Inline,
}

impl EngineTransport {
    /// Transports in the order loaders should attempt them.
    pub const ATTEMPT_ORDER: [EngineTransport; 2] =
        [EngineTransport::WithWorker, EngineTransport::Inline];
}

impl fmt::Display for EngineTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineTransport::WithWorker => f.write_str("with-worker"),
            EngineTransport::Inline => f.write_str("inline"),
        }
    }
}

/// An initialized external decoder.
///
/// File names are scoped to the engine's private workspace. Implementations
/// must tolerate concurrent calls that use distinct file names.
#[async_trait]
pub trait DecoderEngine: Send + Sync {
    /// Store `data` under `name` in the engine workspace.
    async fn write_input(&self, name: &str, data: Bytes) -> Result<()>;

    /// Run the engine with the given argument vector.
    ///
    /// Fails when the engine reports a non-successful exit.
    async fn execute(&self, argv: &[String]) -> Result<()>;

    /// Read a file produced by a previous [`execute`](Self::execute) call.
    async fn read_output(&self, name: &str) -> Result<Bytes>;

    /// Remove a file from the workspace. Missing files are not an error.
    async fn remove(&self, name: &str) -> Result<()> {
        let _ = name;
        Ok(())
    }

    /// Drain log lines the engine captured since the last call.
    fn take_log(&self) -> Vec<String> {
        Vec::new()
    }

    /// Human-readable description used in diagnostics.
    fn describe(&self) -> String;
}

/// Factory for [`DecoderEngine`] instances.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Initialize an engine from `source` using `transport`.
    ///
    /// Each call is independent: a failed attempt leaves no state behind and may
    /// be retried later.
    async fn initialize(
        &self,
        source: &EngineSource,
        transport: EngineTransport,
    ) -> Result<Arc<dyn DecoderEngine>>;

    /// Sources tried when the caller does not configure any.
    fn default_sources(&self) -> Vec<EngineSource> {
        Vec::new()
    }
}
