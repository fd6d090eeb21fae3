//! Beat and song time conversion for rhythm game charts.
//!
//! [`TimingData`] holds a chart's tempo changes, stops, delays, warps and
//! fake regions. [`TimingEngine`] times them once, then converts between
//! beats and song time.

pub mod beat;
pub mod engine;
pub mod error;
#[cfg(feature = "bevy")]
pub mod plugin;
pub mod timing;
pub mod utils;

pub use beat::Beat;
pub use engine::{EventTag, SongTime, TimingEngine};
pub use error::{TimingError, TimingKind};
pub use timing::{BeatValue, BeatValues, DisplayBpm, TimingData, TimingFields};
pub use utils::Strictness;
