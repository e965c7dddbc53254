//! Process-backed external decoder engine.
//!
//! Drives an ffmpeg-compatible command-line decoder. Each engine owns a private
//! scratch directory; input and output names passed through the
//! [`DecoderEngine`] API are resolved inside it and the process runs with it as
//! working directory.

use async_trait::async_trait;
use bridge_traits::{
    decoder::{DecoderEngine, EngineLoader, EngineSource, EngineTransport},
    error::{BridgeError, Result},
};
use bytes::Bytes;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

/// Environment variable naming an explicit engine executable.
pub const ENGINE_ENV_VAR: &str = "RAWPCM_ENGINE";

/// Maximum number of captured log lines kept between drains.
const MAX_LOG_LINES: usize = 400;

/// Loader that spawns an external decoder executable.
pub struct ProcessEngineLoader {
    scratch_root: PathBuf,
}

impl ProcessEngineLoader {
    /// Create a loader placing engine workspaces under the user cache directory.
    pub fn new() -> Self {
        let scratch_root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("rawpcm-explorer");
        Self { scratch_root }
    }

    /// Create a loader with a custom scratch root.
    pub fn with_scratch_root(scratch_root: PathBuf) -> Self {
        Self { scratch_root }
    }

    /// Root directory engine workspaces are created in.
    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    fn base_args(transport: EngineTransport) -> Vec<String> {
        let threads = match transport {
            EngineTransport::WithWorker => "0",
            EngineTransport::Inline => "1",
        };
        ["-hide_banner", "-nostdin", "-y", "-threads", threads]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for ProcessEngineLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineLoader for ProcessEngineLoader {
    async fn initialize(
        &self,
        source: &EngineSource,
        transport: EngineTransport,
    ) -> Result<Arc<dyn DecoderEngine>> {
        if transport == EngineTransport::WithWorker {
            let parallelism = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            if parallelism < 2 {
                return Err(BridgeError::NotAvailable(
                    "no secondary worker available on this host".to_string(),
                ));
            }
        }

        let output = Command::new(&source.location)
            .arg("-version")
            .output()
            .await
            .map_err(|e| {
                BridgeError::NotAvailable(format!("cannot launch '{}': {}", source, e))
            })?;

        if !output.status.success() {
            return Err(BridgeError::OperationFailed(format!(
                "'{}' -version exited with {}",
                source, output.status
            )));
        }

        let workspace = self
            .scratch_root
            .join(format!("engine-{}", Uuid::new_v4().simple()));
        fs::create_dir_all(&workspace).await?;

        debug!(source = %source, %transport, workspace = ?workspace, "Initialized decoder engine");

        Ok(Arc::new(ProcessEngine::new(
            PathBuf::from(&source.location),
            workspace,
            Self::base_args(transport),
        )))
    }

    fn default_sources(&self) -> Vec<EngineSource> {
        let mut sources = Vec::new();
        if let Ok(explicit) = std::env::var(ENGINE_ENV_VAR) {
            if !explicit.trim().is_empty() {
                sources.push(EngineSource::new(explicit));
            }
        }
        for location in [
            "ffmpeg",
            "/usr/bin/ffmpeg",
            "/usr/local/bin/ffmpeg",
            "/opt/homebrew/bin/ffmpeg",
        ] {
            sources.push(EngineSource::new(location));
        }
        sources
    }
}

/// A decoder engine backed by an external executable.
pub struct ProcessEngine {
    program: PathBuf,
    workspace: PathBuf,
    base_args: Vec<String>,
    log: Mutex<Vec<String>>,
}

impl ProcessEngine {
    /// Create an engine running `program` inside `workspace`.
    ///
    /// `base_args` are prepended to every [`execute`](DecoderEngine::execute)
    /// call. The workspace directory must already exist.
    pub fn new(program: PathBuf, workspace: PathBuf, base_args: Vec<String>) -> Self {
        Self {
            program,
            workspace,
            base_args,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Workspace directory of this engine.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(BridgeError::OperationFailed(format!(
                "invalid engine file name '{}'",
                name
            )));
        }
        Ok(self.workspace.join(name))
    }

    fn capture(&self, stderr: &[u8]) {
        let text = String::from_utf8_lossy(stderr);
        let mut log = self.log.lock();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            log.push(line.to_string());
        }
        if log.len() > MAX_LOG_LINES {
            let excess = log.len() - MAX_LOG_LINES;
            log.drain(..excess);
        }
    }
}

#[async_trait]
impl DecoderEngine for ProcessEngine {
    async fn write_input(&self, name: &str, data: Bytes) -> Result<()> {
        let path = self.resolve(name)?;
        fs::write(&path, &data).await?;
        debug!(file = name, size = data.len(), "Wrote engine input");
        Ok(())
    }

    async fn execute(&self, argv: &[String]) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .args(argv)
            .current_dir(&self.workspace)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                BridgeError::OperationFailed(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        self.capture(&output.stderr);

        if output.status.success() {
            Ok(())
        } else {
            warn!(status = %output.status, "Decoder engine reported failure");
            Err(BridgeError::OperationFailed(format!(
                "engine exited with {}",
                output.status
            )))
        }
    }

    async fn read_output(&self, name: &str) -> Result<Bytes> {
        let path = self.resolve(name)?;
        let data = fs::read(&path).await?;
        debug!(file = name, size = data.len(), "Read engine output");
        Ok(Bytes::from(data))
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock())
    }

    fn describe(&self) -> String {
        format!("{} {}", self.program.display(), self.base_args.join(" "))
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.workspace) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(workspace = ?self.workspace, error = %e, "Failed to clean engine workspace");
            }
        }
    }
}
