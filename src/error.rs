use derive_more::Display;
use thiserror::Error;

use crate::beat::Beat;

/// Which declared timing list a problem was found in.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingKind {
    #[display(fmt = "BPMS")]
    Bpms,
    #[display(fmt = "STOPS")]
    Stops,
    #[display(fmt = "DELAYS")]
    Delays,
    #[display(fmt = "WARPS")]
    Warps,
    #[display(fmt = "FAKES")]
    Fakes,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimingError {
    #[error("beat/value pair must have exactly one '=': {row:?}")]
    MalformedPair { row: String },

    #[error("junk data in {field}: {text:?}")]
    JunkData { field: &'static str, text: String },

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("no tempo declared")]
    MissingTempo,

    #[error("first BPM change should be on beat 0, found {0}")]
    FirstTempoNotAtZero(Beat),

    #[error("BPM at beat {0} must be positive")]
    NonPositiveTempo(Beat),

    #[error("{kind} out of order at beat {beat}")]
    Unsorted { kind: TimingKind, beat: Beat },

    #[error("{kind} declares more than one event on beat {beat}")]
    DuplicateBeat { kind: TimingKind, beat: Beat },

    #[error("{kind} region at beat {beat} has a negative length")]
    NegativeLength { kind: TimingKind, beat: Beat },

    #[error("{kind} event at beat {beat} comes before beat 0")]
    NegativeBeat { kind: TimingKind, beat: Beat },
}
