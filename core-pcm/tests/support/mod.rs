//! Hand-written bridge fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::decoder::{DecoderEngine, EngineLoader, EngineSource, EngineTransport};
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::playback::{AudioOutput, PlaybackRequest, PlaybackSessionId};
use bytes::Bytes;
use parking_lot::Mutex;

/// What the fake engine does for one `execute` call.
#[derive(Debug, Clone)]
pub enum Reply {
    Fail(&'static str),
    Empty,
    Pcm(Bytes),
}

type Responder = Box<dyn Fn(&[String]) -> Reply + Send + Sync>;

/// In-memory engine that answers `execute` through a responder closure and
/// writes the reply to the last argument (the output name).
pub struct FakeEngine {
    files: Mutex<HashMap<String, Bytes>>,
    calls: Mutex<Vec<Vec<String>>>,
    written: Mutex<Vec<String>>,
    log: Mutex<Vec<String>>,
    respond: Responder,
    delay: Option<Duration>,
}

impl FakeEngine {
    pub fn new(respond: impl Fn(&[String]) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            delay: None,
        }
    }

    /// Engine whose every call produces `pcm`.
    pub fn always(pcm: Bytes) -> Self {
        Self::new(move |_| Reply::Pcm(pcm.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    pub fn written_names(&self) -> Vec<String> {
        self.written.lock().clone()
    }

    pub fn stored_files(&self) -> usize {
        self.files.lock().len()
    }
}

#[async_trait]
impl DecoderEngine for FakeEngine {
    async fn write_input(&self, name: &str, data: Bytes) -> Result<()> {
        self.written.lock().push(name.to_string());
        self.files.lock().insert(name.to_string(), data);
        Ok(())
    }

    async fn execute(&self, argv: &[String]) -> Result<()> {
        self.calls.lock().push(argv.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let output = argv.last().cloned().unwrap_or_default();
        match (self.respond)(argv) {
            Reply::Fail(reason) => {
                self.log.lock().push(format!("error: {}", reason));
                Err(BridgeError::OperationFailed(reason.to_string()))
            }
            Reply::Empty => {
                self.files.lock().insert(output, Bytes::new());
                Ok(())
            }
            Reply::Pcm(pcm) => {
                self.files.lock().insert(output, pcm);
                Ok(())
            }
        }
    }

    async fn read_output(&self, name: &str) -> Result<Bytes> {
        self.files
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| BridgeError::OperationFailed(format!("no such file: {}", name)))
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.files.lock().remove(name);
        Ok(())
    }

    fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock())
    }

    fn describe(&self) -> String {
        "fake engine".to_string()
    }
}

/// Loader that always hands out the same engine.
pub struct StaticLoader {
    pub engine: Arc<FakeEngine>,
}

#[async_trait]
impl EngineLoader for StaticLoader {
    async fn initialize(
        &self,
        _source: &EngineSource,
        _transport: EngineTransport,
    ) -> Result<Arc<dyn DecoderEngine>> {
        let engine: Arc<dyn DecoderEngine> = self.engine.clone();
        Ok(engine)
    }
}

/// Audio output that records every start and stop.
#[derive(Default)]
pub struct RecordingOutput {
    pub started: Mutex<Vec<(PlaybackSessionId, PlaybackRequest)>>,
    pub stopped: Mutex<Vec<PlaybackSessionId>>,
}

#[async_trait]
impl AudioOutput for RecordingOutput {
    async fn start(&self, request: PlaybackRequest) -> Result<PlaybackSessionId> {
        let session = PlaybackSessionId::new();
        self.started.lock().push((session, request));
        Ok(session)
    }

    async fn stop(&self, session: PlaybackSessionId) -> Result<()> {
        self.stopped.lock().push(session);
        Ok(())
    }
}

/// Little-endian 16-bit mono sine, `frames` long.
pub fn sine_s16le(frames: usize, sample_rate: u32, frequency: f32) -> Vec<u8> {
    (0..frames)
        .flat_map(|i| {
            let t = i as f32 / sample_rate as f32;
            let value = (0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin() * 32767.0) as i16;
            value.to_le_bytes()
        })
        .collect()
}

/// True if `argv` contains `flag` immediately followed by `value`.
pub fn has_arg(argv: &[String], flag: &str, value: &str) -> bool {
    argv.windows(2).any(|w| w[0] == flag && w[1] == value)
}
