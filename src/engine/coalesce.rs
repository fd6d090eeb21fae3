use itertools::Itertools;
use log::warn;
use num_rational::BigRational;
use num_traits::Zero;

use crate::{beat::Beat, timing::*};

/// Merges warp or fake regions into the fewest disjoint regions covering the
/// same beats. Regions that touch or overlap become one.
///
/// Returns zero valued start and end markers, both ordered by beat. Expects
/// `regions` ordered by start beat.
pub fn coalesce(regions: &BeatValues) -> (BeatValues, BeatValues) {
    let marker = |beat: Beat| BeatValue::new(beat, BigRational::zero());

    let (starts, ends): (Vec<_>, Vec<_>) = regions
        .iter()
        .map(|region| (region.beat.clone(), region.region_end()))
        .coalesce(|(start, end), (next_start, next_end)| {
            if next_start > end {
                return Err(((start, end), (next_start, next_end)));
            }
            if next_start < end {
                warn!("region at beat {next_start} overlaps the one at beat {start}, merging");
            }
            Ok((start, end.max(next_end)))
        })
        .map(|(start, end)| (marker(start), marker(end)))
        .unzip();

    (BeatValues(starts), BeatValues(ends))
}
