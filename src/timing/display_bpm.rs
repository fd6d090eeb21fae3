use std::fmt;

use log::warn;
use num_rational::BigRational;

use super::{BeatValues, TimingFields};
use crate::{error::TimingError, utils::*};

/// The BPM advertised on the song select screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBpm {
    Static(BigRational),
    Range { min: BigRational, max: BigRational },
    /// Obfuscated with random numbers, written `*`. Keeps the chart's real
    /// tempo range.
    Random { min: BigRational, max: BigRational },
}

impl DisplayBpm {
    pub fn value(&self) -> Option<&BigRational> {
        match self {
            Self::Static(value) => Some(value),
            _ => None,
        }
    }

    pub fn min(&self) -> &BigRational {
        match self {
            Self::Static(value) | Self::Range { min: value, .. } | Self::Random { min: value, .. } => value,
        }
    }

    pub fn max(&self) -> &BigRational {
        match self {
            Self::Static(value) | Self::Range { max: value, .. } | Self::Random { max: value, .. } => value,
        }
    }

    pub fn range(&self) -> Option<(&BigRational, &BigRational)> {
        match self {
            Self::Range { min, max } => Some((min, max)),
            _ => None,
        }
    }

    /// Static if the chart has one BPM, otherwise the range it spans.
    pub fn from_bpms(bpms: &BeatValues) -> Option<Self> {
        let min = bpms.iter().map(|bpm| &bpm.value).min()?;
        let max = bpms.iter().map(|bpm| &bpm.value).max()?;

        Some(match bpms.len() {
            1 => Self::Static(min.clone()),
            _ => Self::Range {
                min: min.clone(),
                max: max.clone(),
            },
        })
    }

    /// Reads a `DISPLAYBPM` value: `*`, `min:max` or a single BPM. `*` takes
    /// its range from `bpms`.
    pub fn parse(text: &str, bpms: &BeatValues) -> Result<Self, TimingError> {
        let text = text.trim();
        match text.split_once(':') {
            _ if text == "*" => Self::from_bpms(bpms)
                .map(|real| Self::Random {
                    min: real.min().clone(),
                    max: real.max().clone(),
                })
                .ok_or(TimingError::MissingTempo),
            Some((min, max)) => Ok(Self::Range {
                min: parse_decimal(min.trim())?,
                max: parse_decimal(max.trim())?,
            }),
            None => parse_decimal(text).map(Self::Static),
        }
    }

    /// Uses the `DISPLAYBPM` property when there is a readable one (unless
    /// `ignore_specified`), falling back to the chart's actual BPMs.
    pub fn from_fields(
        fields: &TimingFields,
        ignore_specified: bool,
        strictness: Strictness,
    ) -> Result<Self, TimingError> {
        let bpms = BeatValues::parse(fields.bpms.unwrap_or_default(), strictness)?;

        if let Some(text) = fields.displaybpm.filter(|_| !ignore_specified) {
            match Self::parse(text, &bpms) {
                Ok(display_bpm) => return Ok(display_bpm),
                Err(error) => warn!("ignoring DISPLAYBPM: {error}"),
            }
        }

        Self::from_bpms(&bpms).ok_or(TimingError::MissingTempo)
    }
}

/// Rounded to whole BPMs, ties to even: `150`, `120:300` or `*`.
impl fmt::Display for DisplayBpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.write_str(&format_half_even(value)),
            Self::Range { min, max } => {
                write!(f, "{}:{}", format_half_even(min), format_half_even(max))
            }
            Self::Random { .. } => f.write_str("*"),
        }
    }
}
