use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::CueTuning;
use crate::error::CueError;
use crate::traits::audio::CueBackend;

use super::assets::CueAssets;
use super::pool::CuePool;

/// Issues cue playback against a pooled set of backend slots.
///
/// All timing decisions happen in the scheduler; this layer only selects
/// the clip, allocates a slot, and hands the playback to the backend.
/// Wraps a `CueBackend` the way the rest of the crate sees audio.
pub struct CueDispatch<B: CueBackend> {
    backend: B,
    pool: CuePool,
    assets: CueAssets,
}

impl<B: CueBackend> CueDispatch<B> {
    pub fn new(mut backend: B, custom_cue_path: PathBuf, tuning: &CueTuning) -> Result<Self> {
        let assets = CueAssets::new(&mut backend, custom_cue_path)?;
        Ok(Self {
            backend,
            pool: CuePool::new(tuning.pool_cap, tuning.min_busy),
            assets,
        })
    }

    /// Poll background asset loading. Called once per tick.
    pub fn poll(&mut self) {
        self.assets.poll(&mut self.backend);
    }

    /// Best-effort immediate playback; the late-grace fallback path.
    pub fn play_now(&mut self) {
        let Some(clip) = self.assets.select() else {
            return;
        };
        if let Err(e) = self.backend.play_now(clip) {
            warn!("failed to play cue: {e:#}");
        }
    }

    /// Schedule a cue to become audible exactly at `due`.
    /// Pool exhaustion drops the cue; the moment has passed by the next
    /// tick, so there is no retry.
    pub fn play_at(&mut self, due: f64, now: f64) {
        if let Err(err) = self.try_play_at(due, now) {
            debug!("cue dropped: {err}");
        }
    }

    fn try_play_at(&mut self, due: f64, now: f64) -> Result<(), CueError> {
        let Some(clip) = self.assets.select() else {
            // Custom clip still loading; skip rather than flash the
            // fallback sound.
            return Ok(());
        };
        let clip_len = self.backend.clip_duration(clip);
        let slot = self
            .pool
            .acquire(due, now, clip_len)
            .ok_or(CueError::PoolExhausted)?;
        if let Err(e) = self.backend.play_at(slot, clip, due.max(now)) {
            warn!("failed to schedule cue: {e:#}");
        }
        Ok(())
    }

    /// Force-stop every slot and the primary source.
    /// Used on mode exit, pause entry, and phase changes.
    pub fn stop_all(&mut self) {
        self.pool.release_all();
        if let Err(e) = self.backend.stop_all() {
            warn!("failed to stop cues: {e:#}");
        }
    }

    pub fn slot_count(&self) -> usize {
        self.pool.slot_count()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::traits::audio::{ClipId, SlotId};

    #[derive(Default)]
    struct MockBackend {
        next_id: u64,
        immediate: Vec<ClipId>,
        scheduled: Vec<(SlotId, ClipId, f64)>,
        stop_all_calls: usize,
    }

    impl CueBackend for MockBackend {
        fn load_clip(&mut self, _path: &Path) -> Result<ClipId> {
            self.next_id += 1;
            Ok(ClipId(self.next_id))
        }

        fn load_clip_from_memory(&mut self, _data: &[u8], _ext: &str) -> Result<ClipId> {
            self.next_id += 1;
            Ok(ClipId(self.next_id))
        }

        fn clip_duration(&self, _id: ClipId) -> f64 {
            0.045
        }

        fn play_now(&mut self, clip: ClipId) -> Result<()> {
            self.immediate.push(clip);
            Ok(())
        }

        fn play_at(&mut self, slot: SlotId, clip: ClipId, at: f64) -> Result<()> {
            self.scheduled.push((slot, clip, at));
            Ok(())
        }

        fn stop_slot(&mut self, _slot: SlotId) -> Result<()> {
            Ok(())
        }

        fn stop_all(&mut self) -> Result<()> {
            self.stop_all_calls += 1;
            Ok(())
        }
    }

    fn dispatch() -> CueDispatch<MockBackend> {
        CueDispatch::new(
            MockBackend::default(),
            PathBuf::from("/nonexistent/cue.wav"),
            &CueTuning::default(),
        )
        .unwrap()
    }

    #[test]
    fn play_at_schedules_on_a_slot() {
        let mut dispatch = dispatch();
        dispatch.play_at(0.5, 0.4);
        let backend = dispatch.backend();
        assert_eq!(backend.scheduled.len(), 1);
        assert_eq!(backend.scheduled[0].2, 0.5);
    }

    #[test]
    fn play_now_uses_primary_path() {
        let mut dispatch = dispatch();
        dispatch.play_now();
        assert_eq!(dispatch.backend().immediate.len(), 1);
        assert_eq!(dispatch.backend().scheduled.len(), 0);
    }

    #[test]
    fn pool_exhaustion_drops_silently() {
        let tuning = CueTuning {
            pool_cap: 1,
            ..CueTuning::default()
        };
        let mut dispatch = CueDispatch::new(
            MockBackend::default(),
            PathBuf::from("/nonexistent/cue.wav"),
            &tuning,
        )
        .unwrap();

        dispatch.play_at(0.10, 0.0);
        dispatch.play_at(0.12, 0.0);
        assert_eq!(dispatch.backend().scheduled.len(), 1);
    }

    #[test]
    fn stop_all_resets_pool_and_backend() {
        let mut dispatch = dispatch();
        dispatch.play_at(0.10, 0.0);
        dispatch.stop_all();
        assert_eq!(dispatch.backend().stop_all_calls, 1);
        // Slot is free again immediately.
        dispatch.play_at(0.11, 0.0);
        assert_eq!(dispatch.backend().scheduled.len(), 2);
        assert_eq!(dispatch.backend().scheduled[1].0, SlotId(0));
    }
}
