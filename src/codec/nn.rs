//! NN reader and writer
//!
//! ```text
//! 120.0 4 4 2 19 0 0 0 0 0
//! 1
//!  啊 a 0 8 23 50 50 0 0 0 0 100,50,50,...,50 100,50,50,...,50 0
//! ```
//!
//! Line one is `tempo beats_per_bar beat_unit bar_count` followed by
//! constant fields, line two the note count, then one whitespace-separated
//! record per note. Pitch is stored inverted (`83 - midi`) and each curve
//! is a comma list of a `100` marker plus exactly 100 samples.
//!
//! Writing emits notes in stable start order from a sorted view; the
//! caller's project keeps its own order. Text and reading must each be a
//! single non-empty word.

use crate::defaults::{
    NN_CURVE_LEN, NN_CURVE_MARKER, NN_HEADER_TRAILER, NN_PITCH_INVERSION, NN_UNITS_PER_WHOLE,
};
use crate::error::{Result, UtauError};
use crate::models::{Curve, NnNote, NnProject};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Fields in every note record
const NOTE_FIELDS: usize = 14;

/// Read and parse an NN file
pub fn open(path: impl AsRef<Path>) -> Result<NnProject> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    log::info!("opened NN {} ({} bytes)", path.display(), text.len());
    parse(&text)
}

/// Write `project` as an NN file (notes sorted by start)
pub fn save(project: &NnProject, path: impl AsRef<Path>) -> Result<()> {
    let text = to_string(project)?;
    let mut file = fs::File::create(path.as_ref())?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// Parse NN text
pub fn parse(text: &str) -> Result<NnProject> {
    let mut lines = text.lines().enumerate();

    let (_, header) = lines.next().ok_or_else(|| malformed(1, "missing header line"))?;
    let header: Vec<&str> = header.split_whitespace().collect();
    if header.len() < 3 {
        return Err(malformed(1, "header needs tempo, beats per bar and beat unit"));
    }
    let tempo: f64 = field(&header, 0, 1, "tempo")?;
    let beats: (u32, u32) = (
        field(&header, 1, 1, "beats per bar")?,
        field(&header, 2, 1, "beat unit")?,
    );
    if beats.0 == 0 || beats.1 == 0 {
        return Err(malformed(1, "beats per bar and beat unit must be positive"));
    }

    // The stored note count is recomputed on save, never trusted
    lines.next();

    let mut project = NnProject::new(tempo, beats);
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        project.notes.push(parse_note(line, index + 1)?);
    }

    log::info!("parsed NN: {} notes at {} bpm", project.notes.len(), project.tempo);
    Ok(project)
}

/// Serialize `project` to NN text
///
/// Notes are written in stable start order; the project itself is left
/// untouched. Fails with `EmptyProject` because the bar count needs a
/// last note.
pub fn to_string(project: &NnProject) -> Result<String> {
    let (beats_per_bar, beat_unit) = project.beats;
    if beats_per_bar == 0 || beat_unit == 0 {
        return Err(UtauError::InvalidMeter {
            beats_per_bar,
            beat_unit,
        });
    }
    for (index, note) in project.notes.iter().enumerate() {
        for lyric in [&note.text, &note.reading] {
            if lyric.is_empty() || lyric.contains(char::is_whitespace) {
                return Err(UtauError::InvalidLyric {
                    index,
                    lyric: lyric.clone(),
                });
            }
        }
    }

    let mut notes: Vec<&NnNote> = project.notes.iter().collect();
    notes.sort_by_key(|n| n.start);
    let last = notes.last().ok_or(UtauError::EmptyProject)?;

    // floor(end / units_per_bar) with units_per_bar = 32 * beats / unit
    let bar_count = (last.end() as u128 * beat_unit as u128
        / (NN_UNITS_PER_WHOLE as u128 * beats_per_bar as u128)) as u64
        + 1;

    let mut out = format!(
        "{:.1} {} {} {} {}\n{}\n",
        project.tempo,
        beats_per_bar,
        beat_unit,
        bar_count,
        NN_HEADER_TRAILER,
        notes.len()
    );
    for note in notes {
        out.push_str(&NoteRecord(note).to_string());
    }
    Ok(out)
}

fn malformed(line: usize, reason: impl Into<String>) -> UtauError {
    UtauError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn field<T: FromStr>(fields: &[&str], index: usize, line: usize, name: &str) -> Result<T> {
    let raw = fields
        .get(index)
        .ok_or_else(|| malformed(line, format!("missing {}", name)))?;
    raw.parse()
        .map_err(|_| malformed(line, format!("invalid {} `{}`", name, raw)))
}

fn parse_note(line: &str, line_no: usize) -> Result<NnNote> {
    let f: Vec<&str> = line.split_whitespace().collect();
    if f.len() < NOTE_FIELDS {
        return Err(malformed(
            line_no,
            format!("expected {} fields, found {}", NOTE_FIELDS, f.len()),
        ));
    }

    let stored_pitch: i32 = field(&f, 4, line_no, "pitch")?;
    Ok(NnNote {
        text: f[0].to_string(),
        reading: f[1].to_string(),
        start: field(&f, 2, line_no, "start")?,
        length: field(&f, 3, line_no, "length")?,
        pitch: NN_PITCH_INVERSION - stored_pitch,
        clarity: field(&f, 5, line_no, "clarity")?,
        velocity: field(&f, 6, line_no, "velocity")?,
        portamento: field(&f, 7, line_no, "portamento")?,
        vibrato_length: field(&f, 8, line_no, "vibrato length")?,
        vibrato_depth: field(&f, 9, line_no, "vibrato depth")?,
        vibrato_rate: field(&f, 10, line_no, "vibrato rate")?,
        dynamics_curve: parse_curve(f[11], line_no, "dynamics")?,
        pitch_curve: parse_curve(f[12], line_no, "pitch")?,
        pitch_bend_sensitivity: field(&f, 13, line_no, "pitch bend sensitivity")?,
    })
}

/// `100,s0,s1,...,s99`: the leading marker is skipped, not validated
fn parse_curve(raw: &str, line: usize, name: &str) -> Result<Curve> {
    let samples = raw
        .split(',')
        .skip(1)
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| malformed(line, format!("invalid {} sample `{}`", name, s)))
        })
        .collect::<Result<Vec<f64>>>()?;

    Curve::from_samples(samples).map_err(|s| {
        malformed(
            line,
            format!("{} curve has {} samples, expected {}", name, s.len(), NN_CURVE_LEN),
        )
    })
}

struct CurveField<'a>(&'a Curve);

impl fmt::Display for CurveField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NN_CURVE_MARKER)?;
        for sample in self.0.iter() {
            // Samples are truncated toward zero, as NN expects integers
            write!(f, ",{}", sample as i64)?;
        }
        Ok(())
    }
}

struct NoteRecord<'a>(&'a NnNote);

impl fmt::Display for NoteRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        writeln!(
            f,
            " {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            n.text,
            n.reading,
            n.start,
            n.length,
            NN_PITCH_INVERSION - n.pitch,
            n.clarity,
            n.velocity,
            n.portamento,
            n.vibrato_length,
            n.vibrato_depth,
            n.vibrato_rate,
            CurveField(&n.dynamics_curve),
            CurveField(&n.pitch_curve),
            n.pitch_bend_sensitivity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat_curve_field(value: i32) -> String {
        let mut s = NN_CURVE_MARKER.to_string();
        for _ in 0..NN_CURVE_LEN {
            s.push_str(&format!(",{}", value));
        }
        s
    }

    fn sample_text() -> String {
        let dyn_curve = flat_curve_field(50);
        let pit_curve = flat_curve_field(50);
        format!(
            "96.0 3 4 2 19 0 0 0 0 0\n2\n 啊 a 0 8 23 50 50 0 0 0 0 {d} {p} 0\n 哦 o 12 4 21 60 40 5 1 2 3 {d} {p} 4\n",
            d = dyn_curve,
            p = pit_curve
        )
    }

    #[test]
    fn test_parse_header_and_notes() {
        let project = parse(&sample_text()).unwrap();
        assert_eq!(project.tempo, 96.0);
        assert_eq!(project.beats, (3, 4));
        assert_eq!(project.notes.len(), 2);

        let second = &project.notes[1];
        assert_eq!(second.text, "哦");
        assert_eq!(second.reading, "o");
        assert_eq!((second.start, second.length), (12, 4));
        assert_eq!(second.pitch, 62);
        assert_eq!(second.clarity, 60);
        assert_eq!(second.velocity, 40);
        assert_eq!(second.portamento, 5);
        assert_eq!(
            (second.vibrato_length, second.vibrato_depth, second.vibrato_rate),
            (1, 2, 3)
        );
        assert_eq!(second.pitch_bend_sensitivity, 4);
        assert_eq!(second.dynamics_curve, Curve::flat(50.0));
    }

    #[test]
    fn test_short_record_is_malformed() {
        let text = "120.0 4 4 1 19 0 0 0 0 0\n1\n a a 0 8 23 50\n";
        assert!(matches!(parse(text), Err(UtauError::MalformedRecord { line: 3, .. })));
    }

    #[test]
    fn test_curve_with_wrong_length_is_malformed() {
        let short = "100,50,50,50";
        let text = format!(
            "120.0 4 4 1 19 0 0 0 0 0\n1\n a a 0 8 23 50 50 0 0 0 0 {} {} 0\n",
            short,
            flat_curve_field(50)
        );
        assert!(matches!(parse(&text), Err(UtauError::MalformedRecord { .. })));
    }

    #[test]
    fn test_serialize_sorts_and_counts_bars() {
        let mut project = NnProject::new(120.0, (4, 4));
        project.notes.push(NnNote::new("b", "b", 40, 8, 60));
        project.notes.push(NnNote::new("a", "a", 0, 8, 60));
        let text = to_string(&project).unwrap();

        let mut lines = text.lines();
        // last note ends at unit 48; 32 units per 4/4 bar -> floor(1.5) + 1
        assert_eq!(lines.next(), Some("120.0 4 4 2 19 0 0 0 0 0"));
        assert_eq!(lines.next(), Some("2"));
        assert!(lines.next().unwrap().starts_with(" a a 0 8 23 "));
        assert!(lines.next().unwrap().starts_with(" b b 40 8 23 "));

        // the caller's project is not reordered
        assert_eq!(project.notes[0].text, "b");
    }

    #[test]
    fn test_bar_count_in_six_eight() {
        let mut project = NnProject::new(120.0, (6, 8));
        project.notes.push(NnNote::new("a", "a", 0, 24, 60));
        let text = to_string(&project).unwrap();
        // 24 units per 6/8 bar, note ends exactly on the bar line
        assert!(text.starts_with("120.0 6 8 2 "));
    }

    #[test]
    fn test_serialize_empty_project_fails() {
        let project = NnProject::default();
        assert!(matches!(to_string(&project), Err(UtauError::EmptyProject)));
    }

    #[test]
    fn test_curves_are_truncated_integers() {
        let mut note = NnNote::new("a", "a", 0, 8, 60);
        note.pitch_curve = Curve::from_fn(|i| if i == 0 { 66.9 } else { 50.0 });
        let record = NoteRecord(&note).to_string();
        assert!(record.contains(" 100,66,50,50,"));
    }

    #[test]
    fn test_round_trip() {
        let project = parse(&sample_text()).unwrap();
        let reparsed = parse(&to_string(&project).unwrap()).unwrap();
        assert_eq!(reparsed, project);
    }

    #[test]
    fn test_zero_meter_is_malformed() {
        let text = "120.0 0 4 1 19 0 0 0 0 0\n0\n";
        assert!(matches!(parse(text), Err(UtauError::MalformedRecord { line: 1, .. })));
        let text = "120.0 4 0 1 19 0 0 0 0 0\n0\n";
        assert!(matches!(parse(text), Err(UtauError::MalformedRecord { line: 1, .. })));
    }

    #[test]
    fn test_serialize_zero_meter_fails() {
        let mut project = NnProject::new(120.0, (0, 4));
        project.notes.push(NnNote::new("a", "a", 0, 8, 60));
        assert!(matches!(
            to_string(&project),
            Err(UtauError::InvalidMeter { beats_per_bar: 0, .. })
        ));
    }

    #[test]
    fn test_bar_count_of_far_note() {
        let mut project = NnProject::new(120.0, (1, 32));
        project.notes.push(NnNote::new("a", "a", u32::MAX, u32::MAX, 60));
        let text = to_string(&project).unwrap();
        // one unit per bar: end = 2 * u32::MAX
        let bars = format!("120.0 1 32 {} ", u32::MAX as u64 * 2 + 1);
        assert!(text.starts_with(&bars));
    }

    #[test]
    fn test_whitespace_lyric_is_rejected() {
        let mut project = NnProject::default();
        project.notes.push(NnNote::new("a", "a", 0, 8, 60));
        project.notes.push(NnNote::new("a ka", "ka", 8, 8, 60));
        assert!(matches!(
            to_string(&project),
            Err(UtauError::InvalidLyric { index: 1, .. })
        ));

        project.notes[1].text = String::new();
        assert!(matches!(to_string(&project), Err(UtauError::InvalidLyric { .. })));
    }

    proptest! {
        #[test]
        fn prop_serialized_project_parses_back(project in arb_project()) {
            let reparsed = parse(&to_string(&project).unwrap()).unwrap();
            let mut expected = project;
            expected.sort();
            prop_assert_eq!(reparsed, expected);
        }
    }

    fn arb_curve() -> impl Strategy<Value = Curve> {
        prop::collection::vec(0u8..=100, NN_CURVE_LEN)
            .prop_map(|v| Curve::from_fn(|i| v[i] as f64))
    }

    prop_compose! {
        fn arb_note()(
            text in "[a-z\u{554a}-\u{55ef}]{1,3}",
            reading in "[a-z]{1,6}",
            start in 0u32..10_000,
            length in 1u32..500,
            pitch in 24i32..108,
            clarity in 0i32..=100,
            expression in (0i32..=100, 0i32..=100, 0i32..=100, 0i32..=100, 0i32..=100),
            dynamics_curve in arb_curve(),
            pitch_curve in arb_curve(),
            sensitivity in 0i32..12,
        ) -> NnNote {
            let mut note = NnNote::new(text, reading, start, length, pitch);
            note.clarity = clarity;
            note.velocity = expression.0;
            note.portamento = expression.1;
            note.vibrato_length = expression.2;
            note.vibrato_depth = expression.3;
            note.vibrato_rate = expression.4;
            note.dynamics_curve = dynamics_curve;
            note.pitch_curve = pitch_curve;
            note.pitch_bend_sensitivity = sensitivity;
            note
        }
    }

    prop_compose! {
        fn arb_project()(
            tempo in 40u32..240,
            beats_per_bar in 1u32..8,
            beat_unit in prop::sample::select(vec![2u32, 4, 8, 16]),
            notes in prop::collection::vec(arb_note(), 1..12),
        ) -> NnProject {
            let mut project = NnProject::new(tempo as f64, (beats_per_bar, beat_unit));
            project.notes = notes;
            project
        }
    }
}
