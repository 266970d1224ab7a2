use std::path::Path;

use anyhow::Result;

/// Handle for referencing decoded cue clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u64);

/// Handle for a pooled playback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// Abstraction over audio backends capable of scheduled playback.
/// Implementations: KiraCueBackend (production), mock backends (testing).
pub trait CueBackend {
    fn load_clip(&mut self, path: &Path) -> Result<ClipId>;
    fn load_clip_from_memory(&mut self, data: &[u8], ext: &str) -> Result<ClipId>;

    /// Length of a decoded clip in seconds.
    fn clip_duration(&self, id: ClipId) -> f64;

    /// Fire-and-forget playback on the primary one-shot source.
    fn play_now(&mut self, clip: ClipId) -> Result<()>;

    /// Begin playback on `slot` exactly at the audio-clock time `at`.
    fn play_at(&mut self, slot: SlotId, clip: ClipId, at: f64) -> Result<()>;

    fn stop_slot(&mut self, slot: SlotId) -> Result<()>;

    /// Force-stop the primary source and every slot.
    fn stop_all(&mut self) -> Result<()>;
}
