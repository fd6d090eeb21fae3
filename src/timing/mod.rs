mod beat_values;
mod display_bpm;

pub use beat_values::*;
pub use display_bpm::*;

use std::cmp::Ordering;

use itertools::Itertools;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{
    beat::Beat,
    error::{TimingError, TimingKind},
    utils::*,
};

/// Raw timing property values as they appear in a chart, before parsing.
///
/// Missing properties are `None`. Which source the values came from (song
/// or per-chart split timing) is up to the loader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimingFields<'a> {
    pub bpms: Option<&'a str>,
    pub stops: Option<&'a str>,
    pub delays: Option<&'a str>,
    pub warps: Option<&'a str>,
    pub fakes: Option<&'a str>,
    pub offset: Option<&'a str>,
    pub displaybpm: Option<&'a str>,
}

/// Everything needed to map beats to song time for one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingData {
    pub bpms: BeatValues,
    pub stops: BeatValues,
    pub delays: BeatValues,
    pub warps: BeatValues,
    pub fakes: BeatValues,
    /// Seconds by which beat 0 precedes the start of the music.
    pub offset: BigRational,
}

impl TimingData {
    pub fn new(bpms: BeatValues) -> Self {
        Self {
            bpms,
            stops: BeatValues::new(),
            delays: BeatValues::new(),
            warps: BeatValues::new(),
            fakes: BeatValues::new(),
            offset: BigRational::zero(),
        }
    }

    pub fn with_stops(self, stops: BeatValues) -> Self {
        Self { stops, ..self }
    }

    pub fn with_delays(self, delays: BeatValues) -> Self {
        Self { delays, ..self }
    }

    pub fn with_warps(self, warps: BeatValues) -> Self {
        Self { warps, ..self }
    }

    pub fn with_fakes(self, fakes: BeatValues) -> Self {
        Self { fakes, ..self }
    }

    pub fn with_offset(self, offset: BigRational) -> Self {
        Self { offset, ..self }
    }

    /// Parses every timing property. A missing or blank offset is zero.
    pub fn from_fields(fields: &TimingFields, strictness: Strictness) -> Result<Self, TimingError> {
        let list = |text: Option<&str>| BeatValues::parse(text.unwrap_or_default(), strictness);

        let offset = match fields.offset.map(str::trim) {
            Some(text) if !text.is_empty() => {
                read_number(enforce_float_str(text, "offset", strictness)?, strictness)?
            }
            _ => BigRational::zero(),
        };

        Ok(Self {
            bpms: list(fields.bpms)?,
            stops: list(fields.stops)?,
            delays: list(fields.delays)?,
            warps: list(fields.warps)?,
            fakes: list(fields.fakes)?,
            offset,
        })
    }

    pub fn offset_seconds(&self) -> f64 {
        self.offset.to_f64().unwrap_or_default()
    }

    /// Checks the invariants the engine relies on:
    ///
    /// * the first BPM change is on beat 0 and every BPM is positive
    /// * BPMS, STOPS and DELAYS are strictly ordered by beat
    /// * WARPS and FAKES are ordered by start beat and have non-negative lengths
    /// * nothing happens before beat 0
    pub fn validate(&self) -> Result<(), TimingError> {
        let first = self.bpms.first().ok_or(TimingError::MissingTempo)?;
        if first.beat != Beat::zero() {
            return Err(TimingError::FirstTempoNotAtZero(first.beat.clone()));
        }

        if let Some(bpm) = self.bpms.iter().find(|bpm| !bpm.value.is_positive()) {
            return Err(TimingError::NonPositiveTempo(bpm.beat.clone()));
        }

        [
            (TimingKind::Bpms, &self.bpms),
            (TimingKind::Stops, &self.stops),
            (TimingKind::Delays, &self.delays),
        ]
        .into_iter()
        .try_for_each(|(kind, list)| check_order(kind, list, false))?;

        [(TimingKind::Warps, &self.warps), (TimingKind::Fakes, &self.fakes)]
            .into_iter()
            .try_for_each(|(kind, list)| {
                check_order(kind, list, true)?;
                match list.iter().find(|region| region.value.is_negative()) {
                    Some(region) => Err(TimingError::NegativeLength {
                        kind,
                        beat: region.beat.clone(),
                    }),
                    None => Ok(()),
                }
            })?;

        // Lists are ordered by now, so only the first event can be early.
        [
            (TimingKind::Stops, &self.stops),
            (TimingKind::Delays, &self.delays),
            (TimingKind::Warps, &self.warps),
            (TimingKind::Fakes, &self.fakes),
        ]
        .into_iter()
        .filter_map(|(kind, list)| list.first().map(|first| (kind, first)))
        .find(|(_, first)| first.beat < Beat::zero())
        .map_or(Ok(()), |(kind, first)| {
            Err(TimingError::NegativeBeat {
                kind,
                beat: first.beat.clone(),
            })
        })
    }
}

fn check_order(kind: TimingKind, list: &BeatValues, allow_shared: bool) -> Result<(), TimingError> {
    list.iter()
        .tuple_windows()
        .try_for_each(|(prev, curr)| match prev.beat.cmp(&curr.beat) {
            Ordering::Greater => Err(TimingError::Unsorted {
                kind,
                beat: curr.beat.clone(),
            }),
            Ordering::Equal if !allow_shared => Err(TimingError::DuplicateBeat {
                kind,
                beat: curr.beat.clone(),
            }),
            _ => Ok(()),
        })
}
