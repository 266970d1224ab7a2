use tracing::trace;

use crate::config::CueTuning;
use crate::cue::CueDispatch;
use crate::timeline::Timeline;
use crate::traits::audio::CueBackend;
use crate::traits::host::TickContext;

use super::CueScheduler;

/// Cues the single next actionable event at its natural time while the
/// host plays the level automatically.
pub struct LevelPreviewMode {
    scheduler: CueScheduler,
}

impl LevelPreviewMode {
    pub fn new(tuning: &CueTuning) -> Self {
        Self {
            scheduler: CueScheduler::new(tuning.level_preview_horizon, tuning),
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
        let Some(cursor) = ctx.cursor else {
            return;
        };
        let Some(target) = timeline.events().get(cursor + 1) else {
            return;
        };

        let due = match timeline.beat_to_time(target.beat) {
            Ok(due) => due,
            Err(_) => {
                trace!("no timeline data; retrying next tick");
                return;
            }
        };
        self.scheduler
            .consider(dispatch, target.id, target.automatic, due, ctx.now);
    }
}
