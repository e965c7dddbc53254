//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the raw-PCM explorer core:
//! - Logging and tracing infrastructure
//! - Configuration management (explorer settings, bridge wiring)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the core depends on. It
//! establishes the logging conventions and the validated configuration surface
//! consumed by the preview and full decode pipelines.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, ExplorerSettings, FilterFlags, HeuristicThresholds};
pub use error::{Error, Result};
