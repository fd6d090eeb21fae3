use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

use derive_more::{Add, AddAssign, From, Neg, Sub, SubAssign};
use noisy_float::prelude::*;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::{error::TimingError, utils::*};

pub const MEASURE_SUBDIVISION: i64 = 192;
pub const BEAT_SUBDIVISION: i64 = MEASURE_SUBDIVISION / 4;

/// Vertical chart position in quarter notes, kept as an exact fraction.
///
/// Beats read from text or floats are rounded to the nearest [`Beat::tick`];
/// beats built from other beats through arithmetic stay exact.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, From, Add, Sub, Neg, AddAssign, SubAssign)]
pub struct Beat(BigRational);

impl Beat {
    /// Exact `numer / denom`. Panics if `denom` is zero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Self {
        Self(BigRational::new(numer.into(), denom.into()))
    }

    pub fn from_integer(beat: i64) -> Self {
        Self(BigRational::from_integer(beat.into()))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// 1/48 of a beat, i.e. 1/192 of a measure.
    pub fn tick() -> Self {
        Self::new(1, BEAT_SUBDIVISION)
    }

    pub fn round_to_tick(&self) -> Self {
        let ticks = BigRational::from_integer(BEAT_SUBDIVISION.into());
        Self(BigRational::new((&self.0 * &ticks).round().to_integer(), BEAT_SUBDIVISION.into()))
    }

    pub fn is_on_tick(&self) -> bool {
        (BigInt::from(BEAT_SUBDIVISION) % self.0.denom()).is_zero()
    }

    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl Default for Beat {
    fn default() -> Self {
        Self::zero()
    }
}

/// Rounds to the nearest tick.
impl From<R64> for Beat {
    fn from(beat: R64) -> Self {
        let ticks = (beat.raw() * BEAT_SUBDIVISION as f64).round();
        Self::new(BigInt::from_f64(ticks).unwrap_or_default(), BEAT_SUBDIVISION)
    }
}

impl From<i64> for Beat {
    fn from(beat: i64) -> Self {
        Self::from_integer(beat)
    }
}

/// Parses a decimal string, rounding to the nearest tick.
impl FromStr for Beat {
    type Err = TimingError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_decimal(text.trim()).map(|beat| Self(beat).round_to_tick())
    }
}

impl Mul for Beat {
    type Output = Beat;

    fn mul(self, rhs: Beat) -> Beat {
        Beat(self.0 * rhs.0)
    }
}

impl Div for Beat {
    type Output = Beat;

    /// Panics on division by a zero beat.
    fn div(self, rhs: Beat) -> Beat {
        Beat(self.0 / rhs.0)
    }
}

impl Mul<&Beat> for &Beat {
    type Output = Beat;

    fn mul(self, rhs: &Beat) -> Beat {
        Beat(&self.0 * &rhs.0)
    }
}

impl<'a> std::ops::Add<&'a Beat> for &'a Beat {
    type Output = Beat;

    fn add(self, rhs: &Beat) -> Beat {
        Beat(&self.0 + &rhs.0)
    }
}

impl<'a> std::ops::Sub<&'a Beat> for &'a Beat {
    type Output = Beat;

    fn sub(self, rhs: &Beat) -> Beat {
        Beat(&self.0 - &rhs.0)
    }
}

/// The usual MSD representation: three decimal digits.
impl fmt::Display for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(&self.0, 3))
    }
}

impl fmt::Debug for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_tick() {
            let text = self.to_string();
            write!(f, "Beat({})", text.trim_end_matches('0').trim_end_matches('.'))
        } else {
            write!(f, "Beat({}/{})", self.0.numer(), self.0.denom())
        }
    }
}
