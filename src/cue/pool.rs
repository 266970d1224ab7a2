use crate::traits::audio::SlotId;

/// A slot counts as free once its busy window has expired to within this
/// many seconds of now.
const BUSY_EPSILON: f64 = 1e-4;

/// Slots seeded at construction.
const INITIAL_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct CueSlot {
    busy_until: f64,
}

/// Playback slot pool with busy-until bookkeeping.
///
/// Owns no timing logic: callers decide when a cue is due, the pool only
/// decides which resource carries it. Grows lazily up to `cap`; at cap a
/// request that finds no free slot is dropped by the caller.
#[derive(Debug)]
pub struct CuePool {
    slots: Vec<CueSlot>,
    cap: usize,
    min_busy: f64,
}

impl CuePool {
    pub fn new(cap: usize, min_busy: f64) -> Self {
        Self {
            slots: vec![CueSlot { busy_until: 0.0 }; INITIAL_SLOTS.min(cap)],
            cap,
            min_busy,
        }
    }

    /// Reserve a slot for playback starting at `max(due, now)` and lasting
    /// `clip_len` seconds. Returns `None` when the pool is at cap and
    /// every slot is still busy.
    pub fn acquire(&mut self, due: f64, now: f64, clip_len: f64) -> Option<SlotId> {
        let start = due.max(now);
        let busy_until = start + clip_len.max(self.min_busy);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.busy_until <= now + BUSY_EPSILON {
                slot.busy_until = busy_until;
                return Some(SlotId(index));
            }
        }

        if self.slots.len() >= self.cap {
            return None;
        }

        self.slots.push(CueSlot { busy_until });
        Some(SlotId(self.slots.len() - 1))
    }

    /// Mark every slot free again. Pairs with a backend `stop_all`.
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.busy_until = 0.0;
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
