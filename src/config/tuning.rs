/// Non-persisted scheduling tunables.
///
/// Defaults reproduce the reference behavior; hosts with unusual frame
/// pacing or very short cue clips may need to adjust them.
#[derive(Debug, Clone)]
pub struct CueTuning {
    /// Maximum lead time for level-preview cues, in seconds.
    pub level_preview_horizon: f64,
    /// Maximum lead time for pattern-preview and listen-repeat cues.
    pub pattern_horizon: f64,
    /// How far past due a cue may still be honored immediately.
    pub late_grace: f64,
    /// Minimum spacing between immediate (late-grace) cues.
    pub min_cue_interval: f64,
    /// Hard cap on playback slots.
    pub pool_cap: usize,
    /// Floor on per-slot busy time, for very short clips.
    pub min_busy: f64,
    /// Beat window scanned by pattern preview each tick.
    pub bar_length: f64,
    /// Forward beat jump treated as a seek.
    pub seek_jump_beats: f64,
}

impl Default for CueTuning {
    fn default() -> Self {
        Self {
            level_preview_horizon: 0.2,
            pattern_horizon: 0.25,
            late_grace: 0.04,
            min_cue_interval: 0.03,
            pool_cap: 32,
            min_busy: 0.05,
            bar_length: 8.0,
            seek_jump_beats: 8.0,
        }
    }
}
