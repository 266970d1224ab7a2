use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Result, anyhow};
use kira::backend::DefaultBackend;
use kira::clock::{ClockHandle, ClockSpeed};
use kira::sound::PlaybackState;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, StartTime, Tween};

use crate::traits::audio::{ClipId, CueBackend, SlotId};

/// Resolution of the cue clock used for scheduled starts.
const TICKS_PER_SECOND: f64 = 1000.0;

/// Cue backend driven by kira, with scheduled starts pinned to a
/// driver-owned clock.
pub struct KiraCueBackend {
    manager: AudioManager,
    clock: ClockHandle,
    /// Decoded clip data keyed by ClipId.
    sounds: HashMap<u64, StaticSoundData>,
    /// Pending/active playback handle per pool slot.
    slot_handles: HashMap<usize, StaticSoundHandle>,
    /// Untracked one-shot handles from `play_now`.
    one_shots: Vec<StaticSoundHandle>,
    /// Next clip ID to assign.
    next_id: u64,
}

impl KiraCueBackend {
    /// Create the backend and start its cue clock.
    pub fn new() -> Result<Self> {
        let mut manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| anyhow!("Failed to create audio manager: {e}"))?;
        let mut clock = manager
            .add_clock(ClockSpeed::TicksPerSecond(TICKS_PER_SECOND))
            .map_err(|e| anyhow!("Failed to create cue clock: {e}"))?;
        clock.start();
        Ok(Self {
            manager,
            clock,
            sounds: HashMap::new(),
            slot_handles: HashMap::new(),
            one_shots: Vec::new(),
            next_id: 1,
        })
    }

    /// Current audio-clock time in seconds; the host feeds this into
    /// `TickContext::now`.
    pub fn now(&self) -> f64 {
        self.clock.time().ticks as f64 / TICKS_PER_SECOND
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn sound(&self, id: ClipId) -> Result<StaticSoundData> {
        self.sounds
            .get(&id.0)
            .cloned()
            .ok_or_else(|| anyhow!("Clip not found: {id:?}"))
    }

    fn prune_one_shots(&mut self) {
        self.one_shots
            .retain(|handle| handle.state() == PlaybackState::Playing);
    }
}

impl CueBackend for KiraCueBackend {
    fn load_clip(&mut self, path: &Path) -> Result<ClipId> {
        let data = StaticSoundData::from_file(path)
            .map_err(|e| anyhow!("Failed to load clip {}: {e}", path.display()))?;
        let id = self.alloc_id();
        self.sounds.insert(id, data);
        Ok(ClipId(id))
    }

    fn load_clip_from_memory(&mut self, data: &[u8], ext: &str) -> Result<ClipId> {
        let cursor = Cursor::new(data.to_vec());
        let sound_data = match ext.to_lowercase().as_str() {
            "wav" | "wave" | "ogg" | "mp3" | "flac" => StaticSoundData::from_cursor(cursor),
            _ => return Err(anyhow!("Unsupported audio format: {ext}")),
        }
        .map_err(|e| anyhow!("Failed to load clip from memory ({ext}): {e}"))?;

        let id = self.alloc_id();
        self.sounds.insert(id, sound_data);
        Ok(ClipId(id))
    }

    fn clip_duration(&self, id: ClipId) -> f64 {
        self.sounds
            .get(&id.0)
            .map(|data| data.duration().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn play_now(&mut self, clip: ClipId) -> Result<()> {
        self.prune_one_shots();
        let data = self.sound(clip)?;
        let handle = self
            .manager
            .play(data)
            .map_err(|e| anyhow!("Failed to play cue: {e}"))?;
        self.one_shots.push(handle);
        Ok(())
    }

    fn play_at(&mut self, slot: SlotId, clip: ClipId, at: f64) -> Result<()> {
        // The pool only hands out slots whose previous playback has
        // finished, but a stale pending handle must not fire later.
        if let Some(mut old) = self.slot_handles.remove(&slot.0) {
            old.stop(Tween::default());
        }

        let mut start = self.clock.time();
        start.ticks = ((at * TICKS_PER_SECOND).round() as u64).max(start.ticks);
        let data = self.sound(clip)?.start_time(StartTime::ClockTime(start));
        let handle = self
            .manager
            .play(data)
            .map_err(|e| anyhow!("Failed to schedule cue: {e}"))?;
        self.slot_handles.insert(slot.0, handle);
        Ok(())
    }

    fn stop_slot(&mut self, slot: SlotId) -> Result<()> {
        if let Some(mut handle) = self.slot_handles.remove(&slot.0) {
            handle.stop(Tween::default());
        }
        Ok(())
    }

    fn stop_all(&mut self) -> Result<()> {
        for (_, mut handle) in self.slot_handles.drain() {
            handle.stop(Tween::default());
        }
        for mut handle in self.one_shots.drain(..) {
            handle.stop(Tween::default());
        }
        Ok(())
    }
}
