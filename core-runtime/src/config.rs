//! # Core Configuration Module
//!
//! Provides configuration management for the raw-PCM explorer core.
//!
//! ## Overview
//!
//! Two layers:
//!
//! - [`ExplorerSettings`] holds the user-adjustable values (assumed sample rate,
//!   preview length, filter toggles, candidate limit, playback rate, heuristic
//!   thresholds). It is plain data, serde-backed, and every field has a default.
//! - [`CoreConfig`] wires settings together with the host bridges the core
//!   needs. Use [`CoreConfig::builder`] to construct it; the builder validates
//!   settings before anything runs.
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `EngineLoader` - external ADPCM decoder (desktop default: process engine)
//! - `AudioOutput` - playback device (no default)
//!
//! When the `desktop-shims` feature is enabled, the process-backed engine
//! loader is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ExplorerSettings};
//!
//! let config = CoreConfig::builder()
//!     .settings(ExplorerSettings::default().with_assumed_sample_rate(8000))
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioOutput, EngineLoader, EngineSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Explorer Settings
// ============================================================================

/// Toggles for the individual plausibility filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFlags {
    /// Hide candidates whose preview is silent or flat.
    #[serde(default = "default_true")]
    pub silent: bool,
    /// Hide candidates whose preview is heavily clipped.
    #[serde(default = "default_true")]
    pub clipped: bool,
    /// Hide candidates whose preview has an implausible level.
    #[serde(default = "default_true")]
    pub scale: bool,
}

impl Default for FilterFlags {
    fn default() -> Self {
        Self {
            silent: true,
            clipped: true,
            scale: true,
        }
    }
}

impl FilterFlags {
    /// All filters disabled.
    pub fn none() -> Self {
        Self {
            silent: false,
            clipped: false,
            scale: false,
        }
    }
}

/// Cut-off values used by the signal heuristics.
///
/// These are empirical; they are kept configurable rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicThresholds {
    /// Population variance below which a buffer counts as silent/flat.
    #[serde(default = "default_silence_variance")]
    pub silence_variance: f64,
    /// Absolute sample value above which a sample counts as clipped.
    #[serde(default = "default_clip_level")]
    pub clip_level: f32,
    /// Fraction of clipped samples above which a buffer counts as clipped.
    #[serde(default = "default_clip_fraction")]
    pub clip_fraction: f64,
    /// Standard deviation below which the level is implausibly low.
    #[serde(default = "default_scale_min_stddev")]
    pub scale_min_stddev: f64,
    /// Standard deviation above which the level is implausibly high.
    #[serde(default = "default_scale_max_stddev")]
    pub scale_max_stddev: f64,
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self {
            silence_variance: default_silence_variance(),
            clip_level: default_clip_level(),
            clip_fraction: default_clip_fraction(),
            scale_min_stddev: default_scale_min_stddev(),
            scale_max_stddev: default_scale_max_stddev(),
        }
    }
}

impl HeuristicThresholds {
    /// Validate threshold values.
    pub fn validate(&self) -> Result<()> {
        if !(self.silence_variance >= 0.0) {
            return Err(Error::InvalidSetting {
                field: "thresholds.silence_variance",
                reason: "must be >= 0".to_string(),
            });
        }
        if !(self.clip_level > 0.0 && self.clip_level <= 1.0) {
            return Err(Error::InvalidSetting {
                field: "thresholds.clip_level",
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.clip_fraction) {
            return Err(Error::InvalidSetting {
                field: "thresholds.clip_fraction",
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if !(self.scale_min_stddev >= 0.0 && self.scale_min_stddev < self.scale_max_stddev) {
            return Err(Error::InvalidSetting {
                field: "thresholds.scale_min_stddev",
                reason: "must be >= 0 and below scale_max_stddev".to_string(),
            });
        }
        Ok(())
    }
}

/// Highest accepted sample rate. Keeps the WAVE byte rate of 16-bit stereo
/// audio within `u32`.
pub const MAX_SAMPLE_RATE: u32 = u32::MAX / 4;

/// User-adjustable explorer settings.
///
/// Any change to these invalidates the published preview verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerSettings {
    /// Sample rate assumed for framing previews and labeling decoded audio.
    ///
    /// Does not affect decode correctness.
    ///
    /// Default: 16000 Hz.
    #[serde(default = "default_assumed_sample_rate")]
    pub assumed_sample_rate: u32,

    /// Length of the preview decoded per candidate, in seconds.
    ///
    /// Default: 5.
    #[serde(default = "default_preview_seconds")]
    pub preview_seconds: u32,

    /// Filter toggles.
    #[serde(default)]
    pub filters: FilterFlags,

    /// Only the first `n` enumerated candidates are previewed.
    ///
    /// Default: all candidates.
    #[serde(default)]
    pub candidate_limit: Option<usize>,

    /// Device rate used for playback and export labeling.
    ///
    /// Default: same as `assumed_sample_rate`.
    #[serde(default)]
    pub playback_sample_rate: Option<u32>,

    /// Heuristic cut-offs.
    #[serde(default)]
    pub thresholds: HeuristicThresholds,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            assumed_sample_rate: default_assumed_sample_rate(),
            preview_seconds: default_preview_seconds(),
            filters: FilterFlags::default(),
            candidate_limit: None,
            playback_sample_rate: None,
            thresholds: HeuristicThresholds::default(),
        }
    }
}

impl ExplorerSettings {
    pub fn with_assumed_sample_rate(mut self, rate: u32) -> Self {
        self.assumed_sample_rate = rate;
        self
    }

    pub fn with_preview_seconds(mut self, seconds: u32) -> Self {
        self.preview_seconds = seconds;
        self
    }

    pub fn with_filters(mut self, filters: FilterFlags) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = Some(limit);
        self
    }

    pub fn with_playback_sample_rate(mut self, rate: u32) -> Self {
        self.playback_sample_rate = Some(rate);
        self
    }

    pub fn with_thresholds(mut self, thresholds: HeuristicThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate setting values.
    pub fn validate(&self) -> Result<()> {
        if self.assumed_sample_rate == 0 || self.assumed_sample_rate > MAX_SAMPLE_RATE {
            return Err(Error::InvalidSetting {
                field: "assumed_sample_rate",
                reason: format!("must be between 1 and {}", MAX_SAMPLE_RATE),
            });
        }

        if self.preview_seconds == 0 {
            return Err(Error::InvalidSetting {
                field: "preview_seconds",
                reason: "must be > 0".to_string(),
            });
        }

        if self.candidate_limit == Some(0) {
            return Err(Error::InvalidSetting {
                field: "candidate_limit",
                reason: "must be > 0 when set".to_string(),
            });
        }

        if matches!(self.playback_sample_rate, Some(rate) if rate == 0 || rate > MAX_SAMPLE_RATE) {
            return Err(Error::InvalidSetting {
                field: "playback_sample_rate",
                reason: format!("must be between 1 and {} when set", MAX_SAMPLE_RATE),
            });
        }

        self.thresholds.validate()
    }

    /// Number of frames a preview asks for (`assumed_sample_rate * preview_seconds`).
    pub fn preview_frames(&self) -> usize {
        self.assumed_sample_rate as usize * self.preview_seconds as usize
    }

    /// Rate audio is handed to the output device at.
    pub fn effective_playback_rate(&self) -> u32 {
        self.playback_sample_rate.unwrap_or(self.assumed_sample_rate)
    }

    /// Speed multiplier `playback_sample_rate / assumed_sample_rate`.
    pub fn playback_speed(&self) -> f32 {
        if self.assumed_sample_rate == 0 {
            return 1.0;
        }
        self.effective_playback_rate() as f32 / self.assumed_sample_rate as f32
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_assumed_sample_rate() -> u32 {
    16000
}

fn default_preview_seconds() -> u32 {
    5
}

fn default_silence_variance() -> f64 {
    1e-6
}

fn default_clip_level() -> f32 {
    0.99
}

fn default_clip_fraction() -> f64 {
    0.25
}

fn default_scale_min_stddev() -> f64 {
    1e-4
}

fn default_scale_max_stddev() -> f64 {
    5.0
}

// ============================================================================
// Core Config
// ============================================================================

/// Core configuration for the explorer.
///
/// Holds the settings plus the host bridges. Use [`CoreConfigBuilder`] to
/// construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Explorer settings
    pub settings: ExplorerSettings,

    /// External decoder loader (optional with desktop default)
    pub engine_loader: Option<Arc<dyn EngineLoader>>,

    /// Engine locations, tried in order
    pub engine_sources: Vec<EngineSource>,

    /// Playback device (optional)
    pub audio_output: Option<Arc<dyn AudioOutput>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings", &self.settings)
            .field(
                "engine_loader",
                &self.engine_loader.as_ref().map(|_| "EngineLoader { ... }"),
            )
            .field("engine_sources", &self.engine_sources)
            .field(
                "audio_output",
                &self.audio_output.as_ref().map(|_| "AudioOutput { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if self.engine_loader.is_some() && self.engine_sources.is_empty() {
            return Err(Error::Config(
                "An EngineLoader was provided without any engine sources. \
                 Add at least one source or rely on the loader's defaults."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Error returned when ADPCM decoding is requested without an engine.
    pub fn engine_missing_error() -> Error {
        Error::CapabilityMissing {
            capability: "EngineLoader".to_string(),
            message: "An external decoder is required for ADPCM-family candidates. \
                     Desktop: enable the 'desktop-shims' feature to use the process engine. \
                     Other hosts: inject an EngineLoader implementation."
                .to_string(),
        }
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_engine_loader() -> Option<Arc<dyn EngineLoader>> {
    use bridge_desktop::ProcessEngineLoader;

    let loader: Arc<dyn EngineLoader> = Arc::new(ProcessEngineLoader::new());
    Some(loader)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_engine_loader() -> Option<Arc<dyn EngineLoader>> {
    None
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings: Option<ExplorerSettings>,
    engine_loader: Option<Arc<dyn EngineLoader>>,
    engine_sources: Vec<EngineSource>,
    audio_output: Option<Arc<dyn AudioOutput>>,
}

impl CoreConfigBuilder {
    /// Sets the explorer settings. Defaults are used when not called.
    pub fn settings(mut self, settings: ExplorerSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the external decoder loader.
    ///
    /// If not provided, the desktop process engine is used when the
    /// `desktop-shims` feature is enabled.
    pub fn engine_loader(mut self, loader: Arc<dyn EngineLoader>) -> Self {
        self.engine_loader = Some(loader);
        self
    }

    /// Appends an engine source. Sources are tried in insertion order.
    pub fn engine_source(mut self, source: EngineSource) -> Self {
        self.engine_sources.push(source);
        self
    }

    /// Sets the playback device.
    pub fn audio_output(mut self, output: Arc<dyn AudioOutput>) -> Self {
        self.audio_output = Some(output);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn build(self) -> Result<CoreConfig> {
        let settings = self.settings.unwrap_or_default();

        let engine_loader = self.engine_loader.or_else(provide_default_engine_loader);

        let engine_sources = if self.engine_sources.is_empty() {
            engine_loader
                .as_ref()
                .map(|loader| loader.default_sources())
                .unwrap_or_default()
        } else {
            self.engine_sources
        };

        let config = CoreConfig {
            settings,
            engine_loader,
            engine_sources,
            audio_output: self.audio_output,
        };

        config.validate()?;
        Ok(config)
    }
}
