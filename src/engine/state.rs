use std::fmt;

use derive_more::{Add, Deref, From, Neg, Sub};
use noisy_float::prelude::*;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::tag::*;
use crate::{beat::Beat, timing::BeatValue};

/// Seconds since the start of the music. Negative before it.
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deref, From, Add, Sub, Neg)]
pub struct SongTime(pub R64);

impl SongTime {
    /// Non finite seconds are read as zero.
    pub fn new(seconds: f64) -> Self {
        Self(R64::try_new(seconds).unwrap_or_else(|| r64(0.)))
    }

    pub fn seconds(&self) -> f64 {
        self.0.raw()
    }

    fn after(self, seconds: f64) -> Self {
        Self::new(self.seconds() + seconds)
    }
}

impl Default for SongTime {
    fn default() -> Self {
        Self(r64(0.))
    }
}

impl From<f64> for SongTime {
    fn from(seconds: f64) -> Self {
        Self::new(seconds)
    }
}

impl fmt::Display for SongTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.seconds())
    }
}

fn to_seconds(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub beat: Beat,
    pub value: BigRational,
    pub tag: EventTag,
    pub time: SongTime,
}

/// What the timeline looks like right after `event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingState {
    pub event: TimedEvent,
    pub bpm: BigRational,
    pub warp: bool,
    pub fake: bool,
}

impl TimingState {
    /// The first tempo on beat 0, heard `offset` seconds before the music starts.
    pub fn seed(first_bpm: &BeatValue, offset: &BigRational) -> Self {
        Self {
            event: TimedEvent {
                beat: Beat::zero(),
                value: first_bpm.value.clone(),
                tag: EventTag::Bpm,
                time: SongTime::new(-to_seconds(offset)),
            },
            bpm: first_bpm.value.clone(),
            warp: false,
            fake: false,
        }
    }

    /// Seconds from this state to `(beat, tag)`, assuming nothing happens in
    /// between.
    pub fn time_until(&self, beat: &Beat, tag: EventTag) -> f64 {
        let travel = match self.warp {
            true => 0.,
            false => {
                let beats = (beat - &self.event.beat).as_ratio().clone();
                to_seconds(&(beats * BigRational::from_integer(60.into()) / &self.bpm))
            }
        };

        match self.event.tag.pause_end() == Some(tag) {
            true => travel + to_seconds(&self.event.value),
            false => travel,
        }
    }

    /// Beats from this state to `time`, rounded to a tick. Times inside a
    /// pause all land on the pause's beat.
    pub fn beats_until(&self, time: SongTime) -> Beat {
        if self.event.tag.is_pause() {
            return Beat::zero();
        }

        let elapsed = time.seconds() - self.event.time.seconds();
        R64::try_new(elapsed / 60. * to_seconds(&self.bpm))
            .map(Beat::from)
            .unwrap_or_default()
    }

    pub fn advance(&self, event: TaggedEvent) -> Self {
        let time = self.event.time.after(self.time_until(&event.beat, event.tag));

        let bpm = match event.tag {
            EventTag::Bpm => event.value.clone(),
            _ => self.bpm.clone(),
        };

        let warp = match event.tag {
            EventTag::Warp => true,
            EventTag::WarpEnd => false,
            _ => self.warp,
        };

        let fake = match event.tag {
            EventTag::Fake => true,
            EventTag::FakeEnd => false,
            _ => self.fake,
        };

        Self {
            event: TimedEvent {
                beat: event.beat,
                value: event.value,
                tag: event.tag,
                time,
            },
            bpm,
            warp,
            fake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn number(text: &str) -> BigRational {
        crate::utils::parse_decimal(text).unwrap()
    }

    fn beat(text: &str) -> Beat {
        text.parse().unwrap()
    }

    fn event(beat_text: &str, value: &str, tag: EventTag) -> TaggedEvent {
        TaggedEvent::new(beat(beat_text), number(value), tag)
    }

    fn seed() -> TimingState {
        TimingState::seed(&BeatValue::new(Beat::zero(), number("120")), &number("-0.009"))
    }

    fn assert_close(found: f64, expected: f64) {
        assert!((found - expected).abs() < 1e-9, "{found} != {expected}");
    }

    #[test]
    fn seed_starts_at_negative_offset() {
        let state = seed();
        assert_close(state.event.time.seconds(), 0.009);
        assert_eq!(state.bpm, number("120"));
        assert!(!state.warp && !state.fake);
    }

    #[test_case("1", EventTag::Stop, 0.5; "one beat")]
    #[test_case("-1", EventTag::Stop, -0.5; "backwards")]
    #[test_case("0", EventTag::StopEnd, 0.; "no pause to end")]
    fn time_until(beat_text: &str, tag: EventTag, expected: f64) {
        assert_close(seed().time_until(&beat(beat_text), tag), expected);
    }

    #[test]
    fn pauses_take_their_value_once_ended() {
        let stop = seed().advance(event("2", "0.25", EventTag::Stop));
        assert_close(stop.event.time.seconds(), 1.009);
        assert_close(stop.time_until(&beat("2"), EventTag::Stop), 0.);
        assert_close(stop.time_until(&beat("2"), EventTag::StopEnd), 0.25);
        assert_close(stop.time_until(&beat("2"), EventTag::DelayEnd), 0.);

        let end = stop.advance(event("2", "0.25", EventTag::StopEnd));
        assert_close(end.event.time.seconds(), 1.259);
    }

    #[test]
    fn warps_take_no_time() {
        let warp = seed().advance(event("1", "0", EventTag::Warp));
        assert!(warp.warp);
        assert_close(warp.time_until(&beat("3"), EventTag::Stop), 0.);

        let end = warp.advance(event("3", "0", EventTag::WarpEnd));
        assert!(!end.warp);
        assert_eq!(end.event.time, warp.event.time);
    }

    #[test]
    fn flags_and_tempo() {
        let state = seed()
            .advance(event("1", "0", EventTag::Fake))
            .advance(event("2", "240", EventTag::Bpm));
        assert!(state.fake);
        assert_eq!(state.bpm, number("240"));
        assert_close(state.event.time.seconds(), 1.009);
        assert!(!state.advance(event("3", "0", EventTag::FakeEnd)).fake);
    }

    #[test]
    fn beats_until() {
        let state = seed();
        assert_eq!(state.beats_until(SongTime::new(1.009)), beat("2"));
        assert_eq!(state.beats_until(SongTime::new(-0.491)), beat("-1"));
        assert_eq!(state.beats_until(SongTime::new(0.0195)), Beat::tick());

        let stop = state.advance(event("2", "0.25", EventTag::Stop));
        assert_eq!(stop.beats_until(SongTime::new(1.2)), Beat::zero());
    }

    #[test]
    fn song_time_display() {
        assert_eq!(SongTime::new(201.2090001).to_string(), "201.209");
        assert_eq!(SongTime::new(-0.0094).to_string(), "-0.009");
        assert_eq!(SongTime::new(f64::NAN), SongTime::default());
    }
}
