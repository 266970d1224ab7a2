use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for cue scheduling.
///
/// None of these are fatal: every variant degrades to "skip this cue" or
/// "use the fallback sound", and the next tick re-evaluates from current
/// host state.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("timeline has no usable keyframes")]
    NoTimelineData,

    #[error("no free cue slot available")]
    PoolExhausted,

    #[error("failed to load custom cue asset: {path}")]
    AssetLoadFailed { path: PathBuf },

    #[error("activation rejected: host context is not schedulable")]
    ActivationRejected,
}
