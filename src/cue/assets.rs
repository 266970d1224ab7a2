use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::error::CueError;
use crate::traits::audio::{ClipId, CueBackend};

use super::loader::CueClipLoader;
use super::synth;

/// Load state of the user-supplied cue clip.
#[derive(Debug)]
enum CustomClip {
    /// No custom file on disk.
    Absent,
    /// Worker still reading; never substitute the fallback meanwhile.
    Loading,
    Loaded(ClipId),
    /// Missing or corrupt; the fallback tone is used for the rest of the
    /// session.
    Failed,
}

/// Chooses between the user's custom cue clip and the synthesized
/// fallback tone.
pub struct CueAssets {
    fallback: ClipId,
    custom: CustomClip,
    custom_path: PathBuf,
    loader: Option<CueClipLoader>,
}

impl CueAssets {
    /// Decode the fallback tone and, when the custom file exists, start
    /// its background load.
    pub fn new<B: CueBackend>(backend: &mut B, custom_path: PathBuf) -> Result<Self> {
        let fallback = backend.load_clip_from_memory(&synth::fallback_tone_wav(), "wav")?;
        let mut assets = Self {
            fallback,
            custom: CustomClip::Absent,
            custom_path,
            loader: None,
        };
        assets.begin_custom_load();
        Ok(assets)
    }

    fn begin_custom_load(&mut self) {
        if self.custom_path.exists() {
            self.loader = Some(CueClipLoader::start(self.custom_path.clone()));
            self.custom = CustomClip::Loading;
        }
    }

    /// Poll the background load, decoding the clip on completion.
    /// Called once per tick; a no-op once the load has settled.
    pub fn poll<B: CueBackend>(&mut self, backend: &mut B) {
        let Some(loader) = &self.loader else {
            return;
        };
        let Some(result) = loader.take_result() else {
            return;
        };
        self.loader = None;

        match result.and_then(|bytes| backend.load_clip_from_memory(&bytes, "wav")) {
            Ok(clip) => {
                info!(path = %self.custom_path.display(), "custom cue clip loaded");
                self.custom = CustomClip::Loaded(clip);
            }
            Err(source) => {
                let err = CueError::AssetLoadFailed {
                    path: self.custom_path.clone(),
                };
                warn!("{err}: {source:#}");
                self.custom = CustomClip::Failed;
            }
        }
    }

    /// The clip to play right now, or `None` while a custom load is
    /// pending (playing the fallback first would flash the wrong sound).
    pub fn select(&self) -> Option<ClipId> {
        match self.custom {
            CustomClip::Loaded(clip) => Some(clip),
            CustomClip::Loading => None,
            CustomClip::Absent | CustomClip::Failed => Some(self.fallback),
        }
    }
}
