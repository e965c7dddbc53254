//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-pcm`, `core-runtime`). Host applications can depend
//! on `rawpcm-workspace` and enable the documented features without needing
//! to wire each crate individually.

#[cfg(feature = "core")]
pub use core_pcm;

#[cfg(feature = "core")]
pub use core_runtime;
