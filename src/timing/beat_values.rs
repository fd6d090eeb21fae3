use std::fmt;
use std::str::FromStr;

use derive_more::{Deref, DerefMut, From};
use itertools::Itertools;
use log::warn;
use num_rational::BigRational;
use tap::Pipe;

use crate::{beat::Beat, error::TimingError, utils::*};

/// Something that happens on a beat, e.g. a BPM change or a stop.
///
/// What `value` means depends on the list it lives in:
///
/// * BPMS: the new BPM
/// * STOPS, DELAYS: seconds to pause
/// * WARPS: beats to skip
/// * FAKES: beats whose notes aren't judged
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeatValue {
    pub beat: Beat,
    pub value: BigRational,
}

impl BeatValue {
    pub fn new(beat: Beat, value: BigRational) -> Self {
        Self { beat, value }
    }

    /// Where the region starting at this event stops, for warps and fakes.
    pub fn region_end(&self) -> Beat {
        &self.beat + &Beat::from(self.value.clone()).round_to_tick()
    }
}

/// A single timing list such as `BPMS` or `STOPS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, From)]
pub struct BeatValues(pub Vec<BeatValue>);

impl BeatValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the value of a timing property:
    ///
    /// ```text
    /// #BPMS:0.000=128.000,64.000=140.000;
    ///       ^^^^^^^^^^^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn parse(text: &str, strictness: Strictness) -> Result<Self, TimingError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }

        let mut values = Self::new();
        for row in text.split(',') {
            let Some((beat, value)) = row.split('=').map(str::trim).collect_tuple() else {
                if strictness.is_strict() {
                    return Err(TimingError::MalformedPair { row: row.to_string() });
                }
                warn!("skipping beat/value pair without exactly one '=': {row:?}");
                continue;
            };

            let beat = enforce_float_str(beat, "beat", strictness)?;
            let value = enforce_float_str(value, "value", strictness)?;

            values.push(BeatValue {
                beat: read_number(beat, strictness)?.pipe(Beat::from).round_to_tick(),
                value: read_number(value, strictness)?,
            });
        }

        Ok(values)
    }
}

impl FromStr for BeatValues {
    type Err = TimingError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text, Strictness::Strict)
    }
}

impl FromIterator<BeatValue> for BeatValues {
    fn from_iter<I: IntoIterator<Item = BeatValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BeatValues {
    type Item = &'a BeatValue;
    type IntoIter = std::slice::Iter<'a, BeatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Back to the property's MSD value.
impl fmt::Display for BeatValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .iter()
            .map(|event| format!("{}={}", event.beat, format_decimal(&event.value)))
            .join(",\n");
        f.write_str(&text)
    }
}
