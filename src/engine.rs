use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AccessSettings, CueTuning};
use crate::cue::CueDispatch;
use crate::error::CueError;
use crate::scheduler::{LevelPreviewMode, ListenRepeatMode, PatternPreviewMode};
use crate::timeline::Timeline;
use crate::traits::audio::CueBackend;
use crate::traits::host::{HostHooks, TickContext};

/// Backward beat movement beyond this is treated as a seek or restart.
const BEAT_EPSILON: f64 = 1e-6;

/// The accessibility play modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    LevelPreview,
    PatternPreview,
    ListenRepeat,
}

impl PlayMode {
    pub fn label(self) -> &'static str {
        match self {
            PlayMode::LevelPreview => "level preview",
            PlayMode::PatternPreview => "pattern preview",
            PlayMode::ListenRepeat => "listen-repeat",
        }
    }
}

/// Host flag values captured at activation, restored exactly once on exit.
#[derive(Debug, Clone, Copy)]
struct FlagSnapshot {
    auto_play: bool,
    practice_mode: bool,
    speed_trial: Option<f32>,
}

impl FlagSnapshot {
    fn capture<H: HostHooks>(host: &H) -> Self {
        Self {
            auto_play: host.auto_play(),
            practice_mode: host.practice_mode(),
            speed_trial: host.speed_trial(),
        }
    }

    fn restore<H: HostHooks>(&self, host: &mut H) {
        host.set_auto_play(self.auto_play);
        host.set_practice_mode(self.practice_mode);
        host.set_speed_trial(self.speed_trial);
    }
}

enum ActiveMode {
    LevelPreview(LevelPreviewMode),
    PatternPreview(PatternPreviewMode),
    ListenRepeat(ListenRepeatMode),
}

impl ActiveMode {
    fn kind(&self) -> PlayMode {
        match self {
            ActiveMode::LevelPreview(_) => PlayMode::LevelPreview,
            ActiveMode::PatternPreview(_) => PlayMode::PatternPreview,
            ActiveMode::ListenRepeat(_) => PlayMode::ListenRepeat,
        }
    }

    fn reset(&mut self) {
        match self {
            ActiveMode::LevelPreview(mode) => mode.reset(),
            ActiveMode::PatternPreview(mode) => mode.reset(),
            ActiveMode::ListenRepeat(mode) => mode.reset(),
        }
    }
}

/// Accessibility cue engine: owns the mode state machine, the host-flag
/// overrides, and the cue dispatch pool.
///
/// The host drives it with `activate`/`deactivate`/`cycle_mode` and one
/// `tick` per rendered frame. All state is owned here; no statics.
pub struct AccessEngine<B: CueBackend> {
    dispatch: CueDispatch<B>,
    settings: AccessSettings,
    tuning: CueTuning,
    active: Option<ActiveMode>,
    snapshot: Option<FlagSnapshot>,
    last_beat: Option<f64>,
    paused: bool,
}

impl<B: CueBackend> AccessEngine<B> {
    /// Create an engine using the well-known custom cue location.
    pub fn new(backend: B, settings: AccessSettings, tuning: CueTuning) -> Result<Self> {
        let cue_path = AccessSettings::cue_file_path();
        Self::with_cue_path(backend, settings, tuning, cue_path)
    }

    pub fn with_cue_path(
        backend: B,
        settings: AccessSettings,
        tuning: CueTuning,
        cue_path: PathBuf,
    ) -> Result<Self> {
        let dispatch = CueDispatch::new(backend, cue_path, &tuning)?;
        Ok(Self {
            dispatch,
            settings,
            tuning,
            active: None,
            snapshot: None,
            last_beat: None,
            paused: false,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_mode(&self) -> Option<PlayMode> {
        self.active.as_ref().map(ActiveMode::kind)
    }

    /// Enter `mode`, or switch to it from another active mode.
    ///
    /// Rejected when the host is not in a schedulable context; the
    /// rejection is announced as a transient notice.
    pub fn activate<H: HostHooks>(
        &mut self,
        mode: PlayMode,
        host: &mut H,
        ctx: &TickContext,
    ) -> Result<(), CueError> {
        if !ctx.in_gameplay {
            host.announce("Play mode unavailable here", true);
            return Err(CueError::ActivationRejected);
        }

        if let Some(active) = &self.active {
            if active.kind() == mode {
                return Ok(());
            }
            // Switching: put the host back the way we found it before the
            // new mode applies its own overrides.
            if let Some(snapshot) = &self.snapshot {
                snapshot.restore(host);
            }
        } else {
            self.snapshot = Some(FlagSnapshot::capture(host));
        }

        self.dispatch.stop_all();
        self.active = Some(self.make_mode(mode));
        self.apply_overrides(mode, host);
        info!(mode = mode.label(), "play mode active");
        match mode {
            PlayMode::LevelPreview => host.announce("Level preview on", true),
            _ => host.announce(&format!("Play mode {}", mode.label()), true),
        }
        Ok(())
    }

    /// Leave the active mode and restore host flags.
    pub fn deactivate<H: HostHooks>(&mut self, host: &mut H) {
        self.stop(host, true);
    }

    /// Step to the next mode: off, level preview, pattern preview,
    /// listen-repeat, off.
    pub fn cycle_mode<H: HostHooks>(&mut self, host: &mut H, ctx: &TickContext) {
        let next = match self.current_mode() {
            None => Some(PlayMode::LevelPreview),
            Some(PlayMode::LevelPreview) => Some(PlayMode::PatternPreview),
            Some(PlayMode::PatternPreview) => Some(PlayMode::ListenRepeat),
            Some(PlayMode::ListenRepeat) => None,
        };
        match next {
            Some(mode) => {
                let _ = self.activate(mode, host, ctx);
            }
            None => self.deactivate(host),
        }
    }

    /// Run one frame of scheduling work.
    pub fn tick<H: HostHooks>(&mut self, host: &mut H, timeline: &Timeline, ctx: &TickContext) {
        self.dispatch.poll();

        if self.active.is_none() {
            self.last_beat = Some(ctx.current_beat);
            return;
        }

        if !ctx.in_gameplay {
            // Context lost (left gameplay); deactivate quietly.
            self.stop(host, false);
            return;
        }

        // Pause clears transient scheduling state but keeps the flag
        // overrides, so resuming does not desynchronize restored state.
        if ctx.paused || !ctx.in_player_control {
            if !self.paused {
                self.paused = true;
                self.dispatch.stop_all();
                if let Some(active) = &mut self.active {
                    active.reset();
                }
            }
            return;
        }
        self.paused = false;

        if self.beat_jumped(ctx.current_beat) {
            // Seek or restart: every pending window is stale.
            self.dispatch.stop_all();
            if let Some(active) = &mut self.active {
                active.reset();
            }
        }
        self.last_beat = Some(ctx.current_beat);

        let Some(active) = self.active.as_mut() else {
            return;
        };
        match active {
            ActiveMode::LevelPreview(mode) => {
                // Keep the preview safety flags enforced while active.
                host.set_practice_mode(true);
                host.set_speed_trial(None);
                host.set_auto_play(true);
                mode.tick(&mut self.dispatch, timeline, ctx);
            }
            ActiveMode::PatternPreview(mode) => {
                if let Some(snapshot) = &self.snapshot {
                    host.set_auto_play(snapshot.auto_play);
                }
                mode.tick(&mut self.dispatch, timeline, ctx);
            }
            ActiveMode::ListenRepeat(mode) => {
                mode.tick(&mut self.dispatch, timeline, ctx, host);
            }
        }
    }

    /// Host observer for level completion.
    ///
    /// Returns true when the engine consumed the event (level preview was
    /// active): the preview is announced complete, the mode exits, and a
    /// restart is requested so the player can take over from the top.
    pub fn notify_level_complete<H: HostHooks>(&mut self, host: &mut H) -> bool {
        if !matches!(self.current_mode(), Some(PlayMode::LevelPreview)) {
            return false;
        }
        host.announce("Preview complete", true);
        self.stop(host, false);
        host.request_restart();
        true
    }

    /// Host observer for level load/reload; every scheduling window from
    /// the previous level is invalid.
    pub fn notify_level_loaded(&mut self) {
        self.dispatch.stop_all();
        if let Some(active) = &mut self.active {
            active.reset();
        }
        self.last_beat = None;
    }

    pub fn dispatch(&self) -> &CueDispatch<B> {
        &self.dispatch
    }

    fn stop<H: HostHooks>(&mut self, host: &mut H, announce: bool) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.dispatch.stop_all();
        if let Some(snapshot) = self.snapshot.take() {
            snapshot.restore(host);
        }
        self.paused = false;

        if announce {
            match active.kind() {
                PlayMode::LevelPreview => host.announce("Level preview off", true),
                _ => host.announce("Play mode off", true),
            }
        }
        info!(mode = active.kind().label(), "play mode inactive");
    }

    fn beat_jumped(&self, beat: f64) -> bool {
        let Some(last) = self.last_beat else {
            return false;
        };
        beat < last - BEAT_EPSILON || beat - last > self.tuning.seek_jump_beats
    }

    fn make_mode(&self, mode: PlayMode) -> ActiveMode {
        match mode {
            PlayMode::LevelPreview => {
                ActiveMode::LevelPreview(LevelPreviewMode::new(&self.tuning))
            }
            PlayMode::PatternPreview => ActiveMode::PatternPreview(PatternPreviewMode::new(
                self.settings.beats_ahead,
                &self.tuning,
            )),
            PlayMode::ListenRepeat => ActiveMode::ListenRepeat(ListenRepeatMode::new(
                self.settings.beats_ahead,
                &self.tuning,
            )),
        }
    }

    fn apply_overrides<H: HostHooks>(&self, mode: PlayMode, host: &mut H) {
        match mode {
            PlayMode::LevelPreview => {
                host.set_practice_mode(true);
                host.set_speed_trial(None);
                host.set_auto_play(true);
            }
            // Pattern preview leaves the player in control; listen-repeat
            // drives auto-play per phase on its first tick.
            PlayMode::PatternPreview | PlayMode::ListenRepeat => {}
        }
    }
}
