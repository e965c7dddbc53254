//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `EngineLoader` / `DecoderEngine` using an external ffmpeg-compatible
//!   executable driven through `tokio::process`, with a private scratch
//!   directory per engine
//! - `LoggerSink` writing to standard error
//!
//! Audio output is left to the embedding application; desktop audio stacks
//! vary too much to pick one here.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ProcessEngineLoader;
//! use bridge_traits::{EngineLoader, EngineTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let loader = ProcessEngineLoader::new();
//!     for source in loader.default_sources() {
//!         if let Ok(engine) = loader.initialize(&source, EngineTransport::Inline).await {
//!             println!("using {}", engine.describe());
//!             break;
//!         }
//!     }
//! }
//! ```

mod engine;
mod logger;

pub use engine::{ProcessEngine, ProcessEngineLoader, ENGINE_ENV_VAR};
pub use logger::ConsoleLogger;
