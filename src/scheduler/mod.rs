//! Predictive cue scheduling.
//!
//! [`CueScheduler`] is the shared dedup/horizon core; the mode types
//! ([`LevelPreviewMode`], [`PatternPreviewMode`], [`ListenRepeatMode`])
//! choose which timeline events it considers and at what due times.

mod level_preview;
mod listen_repeat;
mod pattern_preview;

pub use level_preview::LevelPreviewMode;
pub use listen_repeat::{ListenRepeatMode, Phase};
pub use pattern_preview::PatternPreviewMode;

use std::collections::HashSet;

use crate::config::CueTuning;
use crate::cue::CueDispatch;
use crate::timeline::EventId;
use crate::traits::audio::CueBackend;

/// Outcome of considering one candidate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueDecision {
    /// Scheduled for playback at its due time.
    Scheduled,
    /// Played (or throttled) through the immediate late-grace path.
    Immediate,
    /// Past the late-grace window; marked handled and skipped.
    TooLate,
    /// Still beyond the horizon; reconsidered next tick.
    NotYet,
    /// Already handled, or not player-actionable.
    Skipped,
}

/// Shared dedup/horizon scheduling core used by every play mode.
///
/// An event id in the handled set is never scheduled again until the set
/// is cleared, which bounds every timeline event to at most one cue per
/// handled-set epoch.
pub struct CueScheduler {
    handled: HashSet<EventId>,
    horizon: f64,
    late_grace: f64,
    min_cue_interval: f64,
    last_immediate: Option<f64>,
}

impl CueScheduler {
    pub fn new(horizon: f64, tuning: &CueTuning) -> Self {
        Self {
            handled: HashSet::new(),
            horizon,
            late_grace: tuning.late_grace,
            min_cue_interval: tuning.min_cue_interval,
            last_immediate: None,
        }
    }

    /// Forget every handled event. Called on mode transitions, phase
    /// changes, pause, seeks, and level reloads.
    pub fn reset(&mut self) {
        self.handled.clear();
        self.last_immediate = None;
    }

    pub fn is_handled(&self, id: EventId) -> bool {
        self.handled.contains(&id)
    }

    pub fn handled_count(&self) -> usize {
        self.handled.len()
    }

    /// Run one candidate event through the decision ladder.
    ///
    /// `due` is the cue's audio-clock due time, `now` the current
    /// audio-clock time.
    pub fn consider<B: CueBackend>(
        &mut self,
        dispatch: &mut CueDispatch<B>,
        id: EventId,
        automatic: bool,
        due: f64,
        now: f64,
    ) -> CueDecision {
        if automatic || self.handled.contains(&id) {
            return CueDecision::Skipped;
        }

        let until_due = due - now;
        if until_due < -self.late_grace {
            // Too late to usefully cue; consume the event so it is not
            // reconsidered every tick.
            self.handled.insert(id);
            return CueDecision::TooLate;
        }
        if until_due > self.horizon {
            return CueDecision::NotYet;
        }

        self.handled.insert(id);
        if until_due >= 0.0 {
            dispatch.play_at(due, now);
            return CueDecision::Scheduled;
        }

        // Slightly past due from frame jitter; play immediately, throttled
        // so event bursts cannot stack audibly.
        if self
            .last_immediate
            .is_none_or(|at| now - at >= self.min_cue_interval)
        {
            self.last_immediate = Some(now);
            dispatch.play_now();
        }
        CueDecision::Immediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use anyhow::Result;

    use crate::traits::audio::{ClipId, SlotId};

    #[derive(Default)]
    pub(crate) struct MockBackend {
        next_id: u64,
        pub immediate: Vec<f64>,
        pub scheduled: Vec<f64>,
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

        fn play_now(&mut self, _clip: ClipId) -> Result<()> {
            self.immediate.push(0.0);
            Ok(())
        }

        fn play_at(&mut self, _slot: SlotId, _clip: ClipId, at: f64) -> Result<()> {
            self.scheduled.push(at);
            Ok(())
        }

        fn stop_slot(&mut self, _slot: SlotId) -> Result<()> {
            Ok(())
        }

        fn stop_all(&mut self) -> Result<()> {
            Ok(())
        }
    }

    pub(crate) fn mock_dispatch() -> CueDispatch<MockBackend> {
        CueDispatch::new(
            MockBackend::default(),
            PathBuf::from("/nonexistent/cue.wav"),
            &CueTuning::default(),
        )
        .unwrap()
    }

    fn scheduler() -> CueScheduler {
        CueScheduler::new(0.25, &CueTuning::default())
    }

    #[test]
    fn schedules_inside_the_window() {
        let mut sched = scheduler();
        let mut dispatch = mock_dispatch();
        let decision = sched.consider(&mut dispatch, EventId(1), false, 10.1, 10.0);
        assert_eq!(decision, CueDecision::Scheduled);
        assert_eq!(dispatch.backend().scheduled, vec![10.1]);
    }

    #[test]
    fn at_most_once_per_epoch() {
        let mut sched = scheduler();
        let mut dispatch = mock_dispatch();
        sched.consider(&mut dispatch, EventId(1), false, 10.1, 10.0);
        for _ in 0..5 {
            let decision = sched.consider(&mut dispatch, EventId(1), false, 10.1, 10.0);
            assert_eq!(decision, CueDecision::Skipped);
        }
        assert_eq!(dispatch.backend().scheduled.len(), 1);

        sched.reset();
        let decision = sched.consider(&mut dispatch, EventId(1), false, 10.1, 10.0);
        assert_eq!(decision, CueDecision::Scheduled);
    }

    #[test]
    fn automatic_events_never_cue() {
        let mut sched = scheduler();
        let mut dispatch = mock_dispatch();
        let decision = sched.consider(&mut dispatch, EventId(1), true, 10.1, 10.0);
        assert_eq!(decision, CueDecision::Skipped);
        assert!(!sched.is_handled(EventId(1)));
        assert!(dispatch.backend().scheduled.is_empty());
    }

    #[test]
    fn horizon_boundary_is_inclusive() {
        let mut sched = scheduler();
        let mut dispatch = mock_dispatch();

        let at_horizon = sched.consider(&mut dispatch, EventId(1), false, 10.25, 10.0);
        assert_eq!(at_horizon, CueDecision::Scheduled);

        let beyond = sched.consider(&mut dispatch, EventId(2), false, 10.25 + 1e-6, 10.0);
        assert_eq!(beyond, CueDecision::NotYet);
        assert!(!sched.is_handled(EventId(2)));

        // The same event enters the window on a later tick.
        let later = sched.consider(&mut dispatch, EventId(2), false, 10.25 + 1e-6, 10.1);
        assert_eq!(later, CueDecision::Scheduled);
    }

    #[test]
    fn late_grace_boundary() {
        let mut sched = scheduler();
        let mut dispatch = mock_dispatch();

        // now = 0 keeps until_due exactly equal to the due literal.
        let at_grace = sched.consider(&mut dispatch, EventId(1), false, -0.04, 0.0);
        assert_eq!(at_grace, CueDecision::Immediate);
        assert_eq!(dispatch.backend().immediate.len(), 1);

        let past_grace = sched.consider(&mut dispatch, EventId(2), false, -0.04 - 1e-6, 0.0);
        assert_eq!(past_grace, CueDecision::TooLate);
        assert!(sched.is_handled(EventId(2)));
        assert_eq!(dispatch.backend().immediate.len(), 1);
    }

    #[test]
    fn immediate_cues_are_throttled() {
        let mut sched = scheduler();
        let mut dispatch = mock_dispatch();

        sched.consider(&mut dispatch, EventId(1), false, 9.99, 10.0);
        sched.consider(&mut dispatch, EventId(2), false, 9.995, 10.0);
        // Both are handled but only one made a sound.
        assert!(sched.is_handled(EventId(1)));
        assert!(sched.is_handled(EventId(2)));
        assert_eq!(dispatch.backend().immediate.len(), 1);

        // Past the throttle window a new immediate cue is allowed.
        sched.consider(&mut dispatch, EventId(3), false, 10.03, 10.05);
        assert_eq!(dispatch.backend().immediate.len(), 2);
    }
}
