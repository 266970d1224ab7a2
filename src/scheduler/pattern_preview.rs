use tracing::trace;

use crate::config::CueTuning;
use crate::cue::CueDispatch;
use crate::timeline::Timeline;
use crate::traits::audio::CueBackend;
use crate::traits::host::TickContext;

use super::CueScheduler;

/// Cues every actionable event in the upcoming bar, `ahead_beats` beats
/// earlier than its natural position.
///
/// The shifted beat runs through the same beat-time mapper as the event
/// itself, so tempo changes between "now" and "then" are respected;
/// shifted beats before the timeline start extrapolate with the first
/// segment's slope.
pub struct PatternPreviewMode {
    scheduler: CueScheduler,
    ahead_beats: f64,
    bar_length: f64,
}

impl PatternPreviewMode {
    pub fn new(ahead_beats: u32, tuning: &CueTuning) -> Self {
        Self {
            scheduler: CueScheduler::new(tuning.pattern_horizon, tuning),
            ahead_beats: ahead_beats.max(1) as f64,
            bar_length: tuning.bar_length,
        }
    }

    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    pub fn scheduler(&self) -> &CueScheduler {
        &self.scheduler
    }

    pub fn tick<B: CueBackend>(
        &mut self,
        dispatch: &mut CueDispatch<B>,
        timeline: &Timeline,
        ctx: &TickContext,
    ) {
        let window_end = ctx.current_beat + self.bar_length;
        for event in timeline.events() {
            if event.beat < ctx.current_beat {
                continue;
            }
            if event.beat > window_end {
                break;
            }

            let due = match timeline.beat_to_time(event.beat - self.ahead_beats) {
                Ok(due) => due,
                Err(_) => {
                    trace!("no timeline data; retrying next tick");
                    return;
                }
            };
            self.scheduler
                .consider(dispatch, event.id, event.automatic, due, ctx.now);
        }
    }
}
