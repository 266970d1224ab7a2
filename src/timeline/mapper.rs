use crate::error::CueError;

use super::TimelineEvent;

/// One valid interpolation segment between consecutive keyframes.
#[derive(Debug, Clone, Copy)]
struct Segment {
    beat0: f64,
    time0: f64,
    /// Seconds per beat across this segment.
    slope: f64,
}

/// Piecewise-linear beat to audio-clock-time mapping.
///
/// Built once per level; queries interpolate inside a bracketing segment
/// and extrapolate with the first/last segment's slope outside it.
#[derive(Debug, Clone, Default)]
pub struct BeatTimeMap {
    segments: Vec<Segment>,
}

impl BeatTimeMap {
    /// Derive segments from consecutive keyframe pairs.
    ///
    /// Pairs with non-increasing beat are malformed input and skipped.
    pub fn from_events(events: &[TimelineEvent]) -> Self {
        let mut segments = Vec::new();
        for pair in events.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b.beat > a.beat {
                segments.push(Segment {
                    beat0: a.beat,
                    time0: a.time,
                    slope: (b.time - a.time) / (b.beat - a.beat),
                });
            }
        }
        Self { segments }
    }

    /// Map a beat position to audio-clock time.
    ///
    /// Fails with [`CueError::NoTimelineData`] when the store is empty or
    /// entirely degenerate.
    pub fn beat_to_time(&self, beat: f64) -> Result<f64, CueError> {
        if self.segments.is_empty() {
            return Err(CueError::NoTimelineData);
        }

        // First segment starting past the query; the one before brackets
        // the beat or carries the extrapolation slope.
        let idx = self.segments.partition_point(|s| s.beat0 <= beat);
        let seg = if idx == 0 {
            &self.segments[0]
        } else {
            &self.segments[idx - 1]
        };
        Ok(seg.time0 + (beat - seg.beat0) * seg.slope)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn keyframes() -> Vec<TimelineEvent> {
        vec![
            TimelineEvent::new(1, 0.0, 0.0),
            TimelineEvent::new(2, 4.0, 2.0),
            TimelineEvent::new(3, 8.0, 3.0),
        ]
    }

    #[test]
    fn interpolates_between_keyframes() {
        let map = BeatTimeMap::from_events(&keyframes());
        assert_abs_diff_eq!(map.beat_to_time(2.0).unwrap(), 1.0);
        assert_abs_diff_eq!(map.beat_to_time(6.0).unwrap(), 2.5);
    }

    #[test]
    fn keyframe_beats_map_to_their_own_times() {
        let map = BeatTimeMap::from_events(&keyframes());
        assert_abs_diff_eq!(map.beat_to_time(0.0).unwrap(), 0.0);
        assert_abs_diff_eq!(map.beat_to_time(4.0).unwrap(), 2.0);
        assert_abs_diff_eq!(map.beat_to_time(8.0).unwrap(), 3.0);
    }

    #[test]
    fn extrapolates_before_start_with_first_slope() {
        let map = BeatTimeMap::from_events(&keyframes());
        // First segment slope is 0.5 s/beat.
        assert_abs_diff_eq!(map.beat_to_time(-2.0).unwrap(), -1.0);
    }

    #[test]
    fn extrapolates_past_end_with_last_slope() {
        let map = BeatTimeMap::from_events(&keyframes());
        // Last segment slope is 0.25 s/beat.
        assert_abs_diff_eq!(map.beat_to_time(10.0).unwrap(), 3.5);
    }

    #[test]
    fn skips_non_increasing_beat_pairs() {
        let events = vec![
            TimelineEvent::new(1, 0.0, 0.0),
            TimelineEvent::new(2, 4.0, 2.0),
            TimelineEvent::new(3, 4.0, 2.1),
            TimelineEvent::new(4, 8.0, 3.0),
        ];
        let map = BeatTimeMap::from_events(&events);
        assert_eq!(map.segment_count(), 2);
        // The degenerate (4.0 -> 4.0) pair contributes nothing; queries
        // past it use the (4.0, 2.1) -> (8.0, 3.0) segment.
        assert_abs_diff_eq!(map.beat_to_time(6.0).unwrap(), 2.55, epsilon = 1e-9);
    }

    #[test]
    fn empty_store_fails() {
        let map = BeatTimeMap::from_events(&[]);
        assert!(matches!(
            map.beat_to_time(1.0),
            Err(CueError::NoTimelineData)
        ));
    }

    #[test]
    fn fully_degenerate_store_fails() {
        let events = vec![
            TimelineEvent::new(1, 2.0, 0.0),
            TimelineEvent::new(2, 2.0, 1.0),
        ];
        let map = BeatTimeMap::from_events(&events);
        assert!(map.beat_to_time(2.0).is_err());
    }

    #[test]
    fn single_segment_covers_both_extrapolations() {
        let events = vec![
            TimelineEvent::new(1, 0.0, 0.0),
            TimelineEvent::new(2, 2.0, 1.0),
        ];
        let map = BeatTimeMap::from_events(&events);
        assert_abs_diff_eq!(map.beat_to_time(-2.0).unwrap(), -1.0);
        assert_abs_diff_eq!(map.beat_to_time(4.0).unwrap(), 2.0);
    }
}
