use bevy::prelude::{App, Plugin, Res, ResMut, Resource};
use derive_more::{Deref, DerefMut, From};

use crate::{beat::Beat, engine::*};

/// Timing of the chart being played. Inserted by whatever loads the chart.
#[derive(Deref, From, Resource)]
pub struct ChartTiming(pub TimingEngine);

/// The beat under the receptors at the current [`SongTime`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref, DerefMut, From, Resource)]
pub struct SongBeat(pub Beat);

pub fn track_song_beat(
    timing: Option<Res<ChartTiming>>,
    song_time: Res<SongTime>,
    mut song_beat: ResMut<SongBeat>,
) {
    if let Some(timing) = timing {
        let beat = timing.beat_at(*song_time);
        if **song_beat != beat {
            **song_beat = beat;
        }
    }
}

pub struct TimingPlugin;

impl Plugin for TimingPlugin {
    fn build(&self, game: &mut App) {
        game.init_resource::<SongTime>()
            .init_resource::<SongBeat>()
            .add_system(track_song_beat);
    }
}
