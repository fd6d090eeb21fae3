use num_rational::BigRational;

use crate::beat::Beat;

/// Kinds of timeline events, in the order they resolve when several land on
/// the same beat. A delay must finish before a stop on its beat begins, and a
/// warp must end before a tempo change it coincides with applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTag {
    Fake,
    FakeEnd,
    Warp,
    WarpEnd,
    Bpm,
    Delay,
    DelayEnd,
    Stop,
    StopEnd,
}

impl EventTag {
    /// The tag closing a pause started by `self`.
    pub fn pause_end(self) -> Option<Self> {
        match self {
            Self::Delay => Some(Self::DelayEnd),
            Self::Stop => Some(Self::StopEnd),
            _ => None,
        }
    }

    pub fn is_pause(self) -> bool {
        self.pause_end().is_some()
    }
}

/// Queries default to the moment a note on the beat has to be struck.
impl Default for EventTag {
    fn default() -> Self {
        Self::Stop
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEvent {
    pub beat: Beat,
    pub value: BigRational,
    pub tag: EventTag,
}

impl TaggedEvent {
    pub fn new(beat: Beat, value: BigRational, tag: EventTag) -> Self {
        Self { beat, value, tag }
    }

    /// Events are timed in this order.
    pub fn key(&self) -> (&Beat, EventTag) {
        (&self.beat, self.tag)
    }
}
