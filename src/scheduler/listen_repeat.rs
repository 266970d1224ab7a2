use tracing::trace;

use crate::config::CueTuning;
use crate::cue::CueDispatch;
use crate::timeline::Timeline;
use crate::traits::audio::CueBackend;
use crate::traits::host::{HostHooks, TickContext};

use super::CueScheduler;

/// Listen-repeat phase; group parity on the beat axis decides which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The host plays automatically while the next group's pattern is
    /// previewed.
    Listen,
    /// The player reproduces the pattern; nothing is scheduled.
    Repeat,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::Listen => "Listen",
            Phase::Repeat => "Repeat",
        }
    }
}

/// Alternates fixed-size beat groups between hearing the upcoming pattern
/// and reproducing it.
///
/// During Listen, the next group's events are scheduled shifted backward
/// by the start-time delta between the two groups, so the repeat group's
/// internal rhythm plays at the listen group's wall-clock position.
pub struct ListenRepeatMode {
    scheduler: CueScheduler,
    group_size: f64,
    phase: Option<Phase>,
}

impl ListenRepeatMode {
    pub fn new(group_size: u32, tuning: &CueTuning) -> Self {
        Self {
            scheduler: CueScheduler::new(tuning.pattern_horizon, tuning),
            group_size: group_size.max(1) as f64,
            phase: None,
        }
    }

    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.phase = None;
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn scheduler(&self) -> &CueScheduler {
        &self.scheduler
    }

    pub fn tick<B: CueBackend, H: HostHooks>(
        &mut self,
        dispatch: &mut CueDispatch<B>,
        timeline: &Timeline,
        ctx: &TickContext,
        host: &mut H,
    ) {
        let group_index = (ctx.current_beat / self.group_size).floor() as i64;
        let phase = if group_index.rem_euclid(2) == 0 {
            Phase::Listen
        } else {
            Phase::Repeat
        };

        if self.phase != Some(phase) {
            self.phase = Some(phase);
            self.scheduler.reset();
            dispatch.stop_all();
            host.set_auto_play(phase == Phase::Listen);
            host.announce(phase.label(), true);
        }

        match phase {
            Phase::Listen => {
                host.set_auto_play(true);
                self.schedule_next_group(dispatch, timeline, ctx, group_index);
            }
            Phase::Repeat => host.set_auto_play(false),
        }
    }

    /// Schedule the repeat group's events at the listen group's wall-clock
    /// position.
    fn schedule_next_group<B: CueBackend>(
        &mut self,
        dispatch: &mut CueDispatch<B>,
        timeline: &Timeline,
        ctx: &TickContext,
        listen_group: i64,
    ) {
        let listen_start_beat = listen_group as f64 * self.group_size;
        let repeat_start_beat = listen_start_beat + self.group_size;
        let repeat_end_beat = repeat_start_beat + self.group_size;

        let (listen_start, repeat_start) = match (
            timeline.beat_to_time(listen_start_beat),
            timeline.beat_to_time(repeat_start_beat),
        ) {
            (Ok(listen), Ok(repeat)) => (listen, repeat),
            _ => {
                trace!("no timeline data; retrying next tick");
                return;
            }
        };
        let shift = repeat_start - listen_start;

        for event in timeline.events() {
            if event.beat < repeat_start_beat {
                continue;
            }
            if event.beat >= repeat_end_beat {
                break;
            }

            let Ok(natural_due) = timeline.beat_to_time(event.beat) else {
                return;
            };
            self.scheduler.consider(
                dispatch,
                event.id,
                event.automatic,
                natural_due - shift,
                ctx.now,
            );
        }
    }
}
