pub mod cancel;
pub mod cursor;
pub mod engine;

pub use cancel::CancelToken;
pub use cursor::PlaybackCursor;
pub use engine::{PlaybackEngine, PlaybackSummary};

use std::time::Duration;

/// Records skipped between two emitted view-states
pub const DEFAULT_STRIDE: u64 = 200;

/// Wall-clock time between two emitted view-states
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Cursor state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorState {
    /// More records may be available
    Active,
    /// End of stream reached, terminal
    Exhausted,
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// First record index, `None` for the start of stream
    pub start_index: Option<u64>,
    pub stride: u64,
    pub interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_index: None,
            stride: DEFAULT_STRIDE,
            interval: DEFAULT_INTERVAL,
        }
    }
}
