//! UST ↔ NN conversion
//!
//! UST describes time implicitly (each note, rests included, follows the
//! previous one), NN positions every note absolutely. Going to NN, rests
//! become gaps; coming back, gaps become explicit rest notes.

use crate::defaults::{nn_units_to_ticks, ticks_to_nn_units, REST_LYRIC, REST_PITCH};
use crate::error::{Result, UtauError};
use crate::models::{NnNote, NnProject, UstNote, UstProject};

/// Convert a UST project to NN
///
/// Lyrics are copied into both the text and reading fields; no phonetic
/// transliteration happens here. A VCV lyric (`a ka`) keeps only its last
/// word, since NN fields cannot hold whitespace. Fails when a position
/// lies past the NN unit range.
pub fn ust_to_nn(ust: &UstProject) -> Result<NnProject> {
    let mut nn = NnProject {
        tempo: ust.tempo(),
        ..NnProject::default()
    };

    let mut elapsed = 0u64;
    for note in &ust.notes {
        let before = elapsed;
        elapsed += note.length as u64;
        if note.is_rest() {
            continue;
        }
        let start = nn_units(before)?;
        let lyric = nn_lyric(&note.lyric);
        nn.notes.push(NnNote::new(
            lyric,
            lyric,
            start,
            nn_units(elapsed)? - start,
            note.pitch,
        ));
    }

    log::debug!(
        "ust_to_nn: {} UST notes -> {} NN notes",
        ust.notes.len(),
        nn.notes.len()
    );
    Ok(nn)
}

/// Convert an NN project to UST
///
/// Gaps between notes are filled with rest notes. `use_text` picks the
/// ideographic text as lyric, otherwise the reading is used. Notes are
/// taken in stored order; overlapping notes are emitted back to back.
/// Fails when a length in ticks does not fit a UST note.
pub fn nn_to_ust(nn: &NnProject, use_text: bool) -> Result<UstProject> {
    let mut ust = UstProject::new();
    ust.set_tempo(nn.tempo);

    let mut cursor = 0u64;
    for note in &nn.notes {
        let start = note.start as u64;
        if start > cursor {
            ust.notes
                .push(UstNote::new(ust_length(start - cursor)?, REST_LYRIC, REST_PITCH));
        }
        ust.notes.push(UstNote::new(
            ust_length(note.length as u64)?,
            note.lyric(use_text),
            note.pitch,
        ));
        cursor = note.end();
    }

    log::debug!(
        "nn_to_ust: {} NN notes -> {} UST notes",
        nn.notes.len(),
        ust.notes.len()
    );
    Ok(ust)
}

/// Last whitespace-separated word of a lyric
fn nn_lyric(lyric: &str) -> &str {
    lyric.split_whitespace().last().unwrap_or(lyric)
}

fn nn_units(ticks: u64) -> Result<u32> {
    ticks_to_nn_units(ticks).ok_or(UtauError::OutOfRange {
        value: ticks,
        target: "NN position",
    })
}

fn ust_length(units: u64) -> Result<u32> {
    let ticks = nn_units_to_ticks(units);
    u32::try_from(ticks).map_err(|_| UtauError::OutOfRange {
        value: ticks,
        target: "UST note length",
    })
}

impl UstProject {
    pub fn to_nn(&self) -> Result<NnProject> {
        ust_to_nn(self)
    }
}

impl NnProject {
    pub fn to_ust(&self, use_text: bool) -> Result<UstProject> {
        nn_to_ust(self, use_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::error::UtauError;
    use crate::models::Value;

    #[test]
    fn test_rests_become_gaps() {
        let mut ust = UstProject::new();
        ust.set_tempo(140.0);
        ust.notes.push(UstNote::new(480, "a", 60));
        ust.notes.push(UstNote::new(240, "R", 60));
        ust.notes.push(UstNote::new(250, "ka", 64));

        let nn = ust_to_nn(&ust).unwrap();
        assert_eq!(nn.tempo, 140.0);
        assert_eq!(nn.notes.len(), 2);
        assert_eq!((nn.notes[0].start, nn.notes[0].length), (0, 8));
        // 720..970 ticks -> units 12..16
        assert_eq!((nn.notes[1].start, nn.notes[1].length), (12, 4));
        assert_eq!(nn.notes[1].text, "ka");
        assert_eq!(nn.notes[1].reading, "ka");
        assert_eq!(nn.notes[1].pitch, 64);
    }

    #[test]
    fn test_missing_tempo_defaults_to_120() {
        let ust = UstProject::new();
        assert_eq!(ust_to_nn(&ust).unwrap().tempo, 120.0);
    }

    #[test]
    fn test_gap_becomes_single_rest() {
        let mut nn = NnProject::default();
        nn.notes.push(NnNote::new("啊", "a", 4, 4, 60));
        nn.notes.push(NnNote::new("哦", "o", 10, 2, 62));

        let ust = nn_to_ust(&nn, false).unwrap();
        let summary: Vec<_> = ust
            .notes
            .iter()
            .map(|n| (n.length, n.lyric.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![(240, "R"), (240, "a"), (120, "R"), (120, "o")]
        );
        assert_eq!(ust.properties.get("Tempo"), Some(&Value::Float(120.0)));
    }

    #[test]
    fn test_use_text_selects_lyric() {
        let mut nn = NnProject::default();
        nn.notes.push(NnNote::new("啊", "a", 0, 8, 60));
        assert_eq!(nn.to_ust(true).unwrap().notes[0].lyric, "啊");
        assert_eq!(nn.to_ust(false).unwrap().notes[0].lyric, "a");
    }

    #[test]
    fn test_all_rest_project_has_no_nn_notes() {
        let mut ust = UstProject::new();
        ust.notes.push(UstNote::new(480, "R", 60));
        ust.notes.push(UstNote::new(480, "", 60));
        let nn = ust.to_nn().unwrap();
        assert!(nn.notes.is_empty());
        assert!(matches!(codec::nn::to_string(&nn), Err(UtauError::EmptyProject)));
    }

    #[test]
    fn test_vcv_lyric_keeps_syllable() {
        let mut ust = UstProject::new();
        ust.notes.push(UstNote::new(480, "a ka", 60));
        ust.notes.push(UstNote::new(480, "- sa", 62));
        let nn = ust.to_nn().unwrap();
        assert_eq!(nn.notes[0].text, "ka");
        assert_eq!(nn.notes[0].reading, "ka");
        assert_eq!(nn.notes[1].reading, "sa");

        let reparsed = codec::nn::parse(&codec::nn::to_string(&nn).unwrap()).unwrap();
        assert_eq!(reparsed.notes, nn.notes);
    }

    #[test]
    fn test_long_nn_note_is_out_of_range() {
        let mut nn = NnProject::default();
        nn.notes.push(NnNote::new("a", "a", 0, 100_000_000, 60));
        assert!(matches!(
            nn.to_ust(false),
            Err(UtauError::OutOfRange { value: 6_000_000_000, .. })
        ));
    }

    #[test]
    fn test_late_nn_gap_is_out_of_range() {
        let mut nn = NnProject::default();
        nn.notes.push(NnNote::new("a", "a", u32::MAX, 1, 60));
        assert!(matches!(nn.to_ust(false), Err(UtauError::OutOfRange { .. })));
    }

    #[test]
    fn test_ust_past_nn_range_is_out_of_range() {
        let mut ust = UstProject::new();
        for _ in 0..61 {
            ust.notes.push(UstNote::new(u32::MAX, "R", 60));
        }
        ust.notes.push(UstNote::new(480, "a", 60));
        assert!(matches!(ust.to_nn(), Err(UtauError::OutOfRange { .. })));
    }
}
