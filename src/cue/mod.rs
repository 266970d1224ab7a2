//! Cue playback resources.
//!
//! This module provides:
//! - [`CuePool`]: playback slot allocation with busy-until bookkeeping
//! - [`CueAssets`]: custom clip vs. synthesized fallback selection
//! - [`CueClipLoader`]: background read of the custom cue file
//! - [`CueDispatch`]: issues immediate and scheduled cue playback

mod assets;
mod dispatch;
mod loader;
mod pool;
pub mod synth;

pub use assets::CueAssets;
pub use dispatch::CueDispatch;
pub use loader::CueClipLoader;
pub use pool::CuePool;
