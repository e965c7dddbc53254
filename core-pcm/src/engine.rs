//! # External Decoder Cache
//!
//! Lazily initializes the external decoder engine on first use and reuses it
//! for the rest of the session.
//!
//! Initialization walks every configured source, and for each source every
//! [`EngineTransport`] in [`EngineTransport::ATTEMPT_ORDER`]. The first
//! engine that comes up is cached. When every attempt fails, the collected
//! failures are returned and nothing is cached, so the next call starts over.

use std::sync::Arc;

use bridge_traits::decoder::{DecoderEngine, EngineLoader, EngineSource, EngineTransport};
use core_runtime::config::CoreConfig;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{PcmError, Result};

pub struct EngineCache {
    loader: Option<Arc<dyn EngineLoader>>,
    sources: Vec<EngineSource>,
    engine: Mutex<Option<Arc<dyn DecoderEngine>>>,
}

impl EngineCache {
    pub fn new(loader: Option<Arc<dyn EngineLoader>>, sources: Vec<EngineSource>) -> Self {
        Self {
            loader,
            sources,
            engine: Mutex::new(None),
        }
    }

    /// Build a cache from the loader and sources carried by `config`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.engine_loader.clone(), config.engine_sources.clone())
    }

    /// Return the cached engine, initializing it if needed.
    ///
    /// Concurrent callers wait for a single initialization.
    ///
    /// # Errors
    ///
    /// - [`PcmError::Runtime`] if no loader was configured
    /// - [`PcmError::InitError`] if every source/transport attempt failed
    pub async fn acquire(&self) -> Result<Arc<dyn DecoderEngine>> {
        let mut slot = self.engine.lock().await;
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| PcmError::Runtime(CoreConfig::engine_missing_error()))?;

        let sources = if self.sources.is_empty() {
            loader.default_sources()
        } else {
            self.sources.clone()
        };

        let mut attempts = Vec::new();
        for source in &sources {
            for transport in EngineTransport::ATTEMPT_ORDER {
                match loader.initialize(source, transport).await {
                    Ok(engine) => {
                        info!(
                            source = %source,
                            %transport,
                            engine = %engine.describe(),
                            "External decoder ready"
                        );
                        *slot = Some(Arc::clone(&engine));
                        return Ok(engine);
                    }
                    Err(e) => {
                        warn!(source = %source, %transport, error = %e, "Decoder init attempt failed");
                        attempts.push(format!("{} ({}): {}", source, transport, e));
                    }
                }
            }
        }

        if attempts.is_empty() {
            attempts.push("no decoder sources configured".to_string());
        }
        Err(PcmError::InitError { attempts })
    }

    pub async fn is_ready(&self) -> bool {
        self.engine.lock().await.is_some()
    }

    /// Forget the cached engine; the next [`acquire`](Self::acquire) reinitializes.
    pub async fn reset(&self) {
        self.engine.lock().await.take();
    }
}
