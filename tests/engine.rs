use chart_timing::{
    engine::EventTag, Beat, BeatValues, DisplayBpm, SongTime, Strictness, TimingData,
    TimingEngine, TimingError, TimingFields, TimingKind,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn beat(text: &str) -> Beat {
    text.parse().unwrap()
}

fn assert_time(found: SongTime, expected: f64) {
    assert!(
        (found.seconds() - expected).abs() < 1e-6,
        "expected {expected}, found {found}"
    );
}

/// Fields as a chart loader would hand them over, with the usual line breaks.
const FIELDS: TimingFields = TimingFields {
    bpms: Some("0.000=150.000,\n32.000=75.000,\n48.000=150.000"),
    stops: Some("16.000=0.400,\n47.750=0.200"),
    delays: Some("31.500=0.200"),
    warps: Some("40.000=2.000,\n41.000=2.000"),
    fakes: Some("60.000=4.000"),
    offset: Some("0.120"),
    displaybpm: None,
};

fn chart() -> TimingEngine {
    TimingData::from_fields(&FIELDS, Strictness::Strict)
        .and_then(TimingEngine::new)
        .unwrap()
}

#[test_case("0", -0.12)]
#[test_case("16", 6.28; "start of a stop")]
#[test_case("31.5", 13.08; "after a delay")]
#[test_case("32", 13.28; "half speed")]
#[test_case("40", 19.68; "start of a warp")]
#[test_case("42.5", 19.68; "inside overlapping warps")]
#[test_case("43", 19.68; "end of the merged warp")]
#[test_case("44", 20.48)]
#[test_case("48", 23.88; "after a stop before a tempo change")]
#[test_case("64", 30.28)]
fn loaded_chart_times(beat_text: &str, expected: f64) {
    assert_time(chart().time_at(&beat(beat_text)), expected);
}

#[test]
fn loaded_chart_beats() {
    let engine = chart();
    assert_eq!(engine.beat_at(SongTime::new(-0.12)), beat("0"));
    assert_eq!(engine.beat_at(SongTime::new(6.5)), beat("16"));
    assert_eq!(engine.beat_at(SongTime::new(13.68)), beat("32.5"));

    let warp = engine.time_at(&beat("42"));
    assert_eq!(engine.beat_at(warp), beat("43"));
    assert_eq!(engine.beat_at_tag(warp, EventTag::Warp), beat("40"));
    assert_eq!(engine.beat_at(engine.time_at(&beat("64"))), beat("64"));
}

#[test]
fn loaded_chart_tempo_and_judging() {
    let engine = chart();
    assert_eq!(engine.bpm_at(&beat("41")).to_string(), "75");
    assert_eq!(engine.bpm_at(&beat("48")).to_string(), "150");

    assert!(engine.hittable(&beat("39.979")));
    assert!(!engine.hittable(&beat("41.5")));
    assert!(engine.hittable(&beat("43")));
    assert!(!engine.hittable(&beat("62")));
    assert!(engine.hittable(&beat("64")));
}

#[test]
fn pauses_span_a_range() {
    let engine = chart();
    let (start, end) = engine.time_range(&beat("16"));
    assert_time(start, 6.28);
    assert_time(end, 6.68);

    let (start, end) = engine.time_range(&beat("31.5"));
    assert_time(start, 12.88);
    assert_time(end, engine.time_at(&beat("31.5")).seconds());
}

#[test]
fn lists_survive_the_engine() {
    let engine = chart();
    let timing = engine.timing_data();
    assert_eq!(timing.stops.to_string(), "16.000=0.400,\n47.750=0.200");

    let reparsed: BeatValues = timing.bpms.to_string().parse().unwrap();
    assert_eq!(reparsed, timing.bpms);
}

#[test]
fn tolerant_loading() {
    let fields = TimingFields {
        bpms: Some("0.000=120.000bpm,\n4.000=240.000,\n,8.000"),
        stops: Some("2.000=0.5s"),
        offset: Some("-0.05 (estimated)"),
        ..Default::default()
    };

    assert!(TimingData::from_fields(&fields, Strictness::Strict).is_err());

    let engine = TimingData::from_fields(&fields, Strictness::Tolerant)
        .and_then(TimingEngine::new)
        .unwrap();
    assert_eq!(engine.timing_data().bpms.len(), 2);
    assert_time(engine.time_at(&beat("4")), 2.55);
}

#[test]
fn broken_charts_are_rejected() {
    let load = |fields: TimingFields| {
        TimingData::from_fields(&fields, Strictness::Strict).and_then(TimingEngine::new)
    };

    assert!(matches!(
        load(TimingFields { bpms: Some("0=120=1"), ..FIELDS }),
        Err(TimingError::MalformedPair { .. })
    ));
    assert_eq!(
        load(TimingFields { bpms: None, ..FIELDS }).unwrap_err(),
        TimingError::MissingTempo
    );
    assert_eq!(
        load(TimingFields { stops: Some("16=0.4,8=0.2"), ..FIELDS }).unwrap_err(),
        TimingError::Unsorted { kind: TimingKind::Stops, beat: beat("8") }
    );
}

#[test_case(None, false, "75:150")]
#[test_case(Some("150"), false, "150")]
#[test_case(Some("*"), false, "*")]
#[test_case(Some("*"), true, "75:150"; "specified ignored")]
fn display_bpm(displaybpm: Option<&str>, ignore_specified: bool, expected: &str) {
    let fields = TimingFields { displaybpm, ..FIELDS };
    let display_bpm = DisplayBpm::from_fields(&fields, ignore_specified, Strictness::Strict);
    assert_eq!(display_bpm.unwrap().to_string(), expected);
}
