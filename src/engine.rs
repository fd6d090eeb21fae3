mod coalesce;
mod state;
mod tag;

pub use coalesce::*;
pub use state::*;
pub use tag::*;

use std::iter;

use itertools::Itertools;
use log::debug;
use num_rational::BigRational;
use tap::Pipe;

use crate::{beat::Beat, error::TimingError, timing::*};

fn tagged<'a>(values: impl IntoIterator<Item = &'a BeatValue>, tag: EventTag) -> Vec<TaggedEvent> {
    values
        .into_iter()
        .map(|event| TaggedEvent::new(event.beat.clone(), event.value.clone(), tag))
        .collect()
}

/// Converts between beats and song time for one chart.
///
/// Every timing event is timed once up front. Queries search the resulting
/// states and extrapolate from the nearest one, so they never fail and never
/// mutate the engine.
#[derive(Debug, Clone)]
pub struct TimingEngine {
    timing_data: TimingData,
    states: Vec<TimingState>,
    /// `(beat, tag, state)`, ordered.
    by_beat: Vec<(Beat, EventTag, usize)>,
    /// `(time, beat, tag, state)`, ordered.
    by_time: Vec<(SongTime, Beat, EventTag, usize)>,
}

impl TimingEngine {
    pub fn new(timing_data: TimingData) -> Result<Self, TimingError> {
        timing_data.validate()?;
        let first_bpm = timing_data.bpms.first().ok_or(TimingError::MissingTempo)?;

        let (warp_starts, warp_ends) = coalesce(&timing_data.warps);
        let (fake_starts, fake_ends) = coalesce(&timing_data.fakes);

        let events = vec![
            tagged(&fake_starts, EventTag::Fake),
            tagged(&fake_ends, EventTag::FakeEnd),
            tagged(&warp_starts, EventTag::Warp),
            tagged(&warp_ends, EventTag::WarpEnd),
            tagged(timing_data.bpms.iter().skip(1), EventTag::Bpm),
            tagged(&timing_data.delays, EventTag::Delay),
            tagged(&timing_data.delays, EventTag::DelayEnd),
            tagged(&timing_data.stops, EventTag::Stop),
            tagged(&timing_data.stops, EventTag::StopEnd),
        ]
        .into_iter()
        .kmerge_by(|a, b| a.key() < b.key());

        let seed = TimingState::seed(first_bpm, &timing_data.offset);
        let states = events
            .scan(seed.clone(), |state, event| {
                *state = state.advance(event);
                Some(state.clone())
            })
            .pipe(|rest| iter::once(seed).chain(rest))
            .collect::<Vec<_>>();

        // The seed goes before anything else on beat 0.
        let sort_tag = |index: usize, state: &TimingState| match index {
            0 => EventTag::Fake,
            _ => state.event.tag,
        };

        let by_beat = states
            .iter()
            .enumerate()
            .map(|(index, state)| (state.event.beat.clone(), sort_tag(index, state), index))
            .sorted()
            .collect();

        let by_time = states
            .iter()
            .enumerate()
            .map(|(index, state)| {
                let (beat, tag) = (state.event.beat.clone(), sort_tag(index, state));
                (state.event.time, beat, tag, index)
            })
            .sorted()
            .collect();

        debug!(
            "timed {} states ({} warps, {} fake regions)",
            states.len(),
            warp_starts.len(),
            fake_starts.len()
        );

        Ok(Self {
            timing_data,
            states,
            by_beat,
            by_time,
        })
    }

    pub fn timing_data(&self) -> &TimingData {
        &self.timing_data
    }

    /// Every timed state, in the order the events were processed.
    pub fn states(&self) -> &[TimingState] {
        &self.states
    }

    /// The last state at or before `(beat, tag)`, or the seed for anything
    /// before it.
    fn state_at(&self, beat: &Beat, tag: EventTag) -> &TimingState {
        let after = self.by_beat.partition_point(|(b, t, _)| (b, *t) <= (beat, tag));
        &self.states[self.by_beat[after.saturating_sub(1)].2]
    }

    /// Warps, stops and delays leave the tempo alone.
    pub fn bpm_at(&self, beat: &Beat) -> &BigRational {
        match *beat < Beat::zero() {
            true => &self.states[0].bpm,
            false => &self.state_at(beat, EventTag::Bpm).bpm,
        }
    }

    /// When a note on `beat` has to be hit.
    ///
    /// On a stop that's when the stop begins, on a delay when it ends.
    pub fn time_at(&self, beat: &Beat) -> SongTime {
        self.time_at_tag(beat, EventTag::default())
    }

    /// Time at `beat` once every event on it up to `tag` has resolved. Use
    /// [`EventTag::Stop`] for the start of a stop and [`EventTag::StopEnd`]
    /// for its end, likewise for delays.
    pub fn time_at_tag(&self, beat: &Beat, tag: EventTag) -> SongTime {
        let state = self.state_at(beat, tag);
        SongTime::new(state.event.time.seconds() + state.time_until(beat, tag))
    }

    /// When `beat` is on the receptors: from before its first pause to after
    /// its last. Both ends are the same for beats without pauses.
    pub fn time_range(&self, beat: &Beat) -> (SongTime, SongTime) {
        (
            self.time_at_tag(beat, EventTag::Fake),
            self.time_at_tag(beat, EventTag::StopEnd),
        )
    }

    pub fn beat_at(&self, time: SongTime) -> Beat {
        self.beat_at_tag(time, EventTag::default())
    }

    /// A time shared by several states can only be a warp. `tag` at or before
    /// [`EventTag::Warp`] picks the beat the warp starts on, later tags the
    /// one it ends on.
    pub fn beat_at_tag(&self, time: SongTime, tag: EventTag) -> Beat {
        let after = self.by_time.partition_point(|(t, ..)| *t <= time);
        let first_at = self.by_time.partition_point(|(t, ..)| *t < time);

        let position = match after {
            0 => 0,
            _ if tag <= EventTag::Warp && first_at < after => first_at,
            _ => after - 1,
        };

        let state = &self.states[self.by_time[position].3];
        &state.event.beat + &state.beats_until(time)
    }

    /// Whether a note on `beat` would be judged. Notes inside fake regions
    /// aren't, nor are notes skipped by a warp. A stop or delay on the beat
    /// inside a warp still makes it hittable.
    pub fn hittable(&self, beat: &Beat) -> bool {
        let state = self.state_at(beat, EventTag::StopEnd);

        match (state.fake, state.warp) {
            (true, _) => false,
            (false, true) => {
                matches!(state.event.tag, EventTag::StopEnd | EventTag::DelayEnd)
                    && state.event.beat == *beat
            }
            (false, false) => true,
        }
    }
}
