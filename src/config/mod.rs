mod settings;
mod tuning;

pub use settings::{AccessSettings, BEATS_AHEAD_MAX, BEATS_AHEAD_MIN};
pub use tuning::CueTuning;
