mod mapper;

pub use mapper::BeatTimeMap;

use crate::error::CueError;

/// Stable, process-unique identifier for a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub u64);

/// One timing keyframe: a (beat, time) correspondence for a level event.
///
/// `time` is an audio-clock timestamp on the same clock as
/// [`TickContext::now`](crate::traits::host::TickContext). Events arrive
/// from the host in non-decreasing `beat` order; `time` is expected but
/// not guaranteed non-decreasing.
#[derive(Debug, Clone, Copy)]
pub struct TimelineEvent {
    pub id: EventId,
    pub beat: f64,
    pub time: f64,
    /// Host-controlled events are not player-actionable and never
    /// produce cues.
    pub automatic: bool,
}

impl TimelineEvent {
    pub fn new(id: u64, beat: f64, time: f64) -> Self {
        Self {
            id: EventId(id),
            beat,
            time,
            automatic: false,
        }
    }

    pub fn automatic(mut self) -> Self {
        self.automatic = true;
        self
    }
}

/// Ordered keyframe store for the active level.
///
/// The host constructs one per level load and lends it to every tick.
/// Interpolation segments are derived once here so per-query mapping
/// never re-divides.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
    map: BeatTimeMap,
}

impl Timeline {
    pub fn new(events: Vec<TimelineEvent>) -> Self {
        let map = BeatTimeMap::from_events(&events);
        Self { events, map }
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Map a musical beat position to audio-clock time.
    pub fn beat_to_time(&self, beat: f64) -> Result<f64, CueError> {
        self.map.beat_to_time(beat)
    }
}
