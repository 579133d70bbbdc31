//! Generic score stream
//!
//! A format-neutral rest/note sequence with rational quarter-note
//! durations, for analysis or hand-off to a notation renderer. The key is
//! estimated from the pitch content and each note is spelled for that key,
//! with accidentals shown only where the key signature does not already
//! imply them.

use crate::defaults::TICKS_PER_QUARTER;
use crate::error::Result;
use crate::models::{Key, Mode, NnProject, Tonic, UstProject};
use num_rational::Ratio;
use std::fmt;

/// Letters in line-of-fifths order, F (-1) through B (5)
const FIFTHS_LETTERS: [char; 7] = ['F', 'C', 'G', 'D', 'A', 'E', 'B'];

/// Krumhansl-Kessler key profiles, tonic first
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpelledPitch {
    pub step: char,
    /// Semitones of alteration, sharps positive
    pub alter: i8,
    pub octave: i32,
    /// Accidental to print, `None` when the key signature covers it
    pub display_accidental: Option<i8>,
}

impl fmt::Display for SpelledPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step)?;
        let symbol = if self.alter > 0 { "#" } else { "b" };
        for _ in 0..self.alter.unsigned_abs() {
            f.write_str(symbol)?;
        }
        write!(f, "{}", self.octave)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreEvent {
    Rest {
        quarter_length: Ratio<u32>,
    },
    Note {
        quarter_length: Ratio<u32>,
        pitch: i32,
        lyric: String,
        spelling: SpelledPitch,
    },
}

impl ScoreEvent {
    pub fn quarter_length(&self) -> Ratio<u32> {
        match self {
            ScoreEvent::Rest { quarter_length } | ScoreEvent::Note { quarter_length, .. } => {
                *quarter_length
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Estimated key; `None` when there is nothing pitched to analyze
    pub key: Option<Key>,
    pub events: Vec<ScoreEvent>,
}

impl Score {
    pub fn notes(&self) -> impl Iterator<Item = &ScoreEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ScoreEvent::Note { .. }))
    }

    /// Total length in quarter notes
    pub fn quarter_length(&self) -> Ratio<u32> {
        self.events
            .iter()
            .fold(Ratio::from_integer(0), |acc, e| acc + e.quarter_length())
    }
}

/// Estimates a key from a duration-weighted pitch-class histogram
pub trait KeyAnalyzer {
    fn analyze(&self, weights: &[f64; 12]) -> Option<Key>;
}

/// Correlation against the Krumhansl-Kessler profiles
#[derive(Debug, Clone, Copy, Default)]
pub struct KrumhanslKessler;

impl KeyAnalyzer for KrumhanslKessler {
    fn analyze(&self, weights: &[f64; 12]) -> Option<Key> {
        let mut best: Option<(f64, Key)> = None;
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            for tonic in 0..12u8 {
                let rotated: [f64; 12] =
                    std::array::from_fn(|pc| profile[(pc + 12 - tonic as usize) % 12]);
                let Some(r) = correlation(weights, &rotated) else {
                    continue;
                };
                if best.map_or(true, |(score, _)| r > score) {
                    best = Some((r, Key::new(Tonic::for_key(tonic, mode), mode)));
                }
            }
        }
        best.map(|(_, key)| key)
    }
}

fn correlation(x: &[f64; 12], y: &[f64; 12]) -> Option<f64> {
    let mean_x = x.iter().sum::<f64>() / 12.0;
    let mean_y = y.iter().sum::<f64>() / 12.0;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }
    let denom = (var_x * var_y).sqrt();
    (denom > 0.0).then(|| cov / denom)
}

/// Spell a MIDI pitch for `key`
///
/// In-key pitches use the key signature's spelling. Chromatic pitches take
/// the spelling nearest the key on the line of fifths, leaning to sharps in
/// sharp keys and flats in flat keys.
pub fn spell(pitch: i32, key: Key) -> SpelledPitch {
    let sig = key.signature() as i32;
    let pitch_class = pitch.rem_euclid(12);
    let window = if sig >= 0 { sig - 3..=sig + 8 } else { sig - 4..=sig + 7 };

    let position = window
        .into_iter()
        .find(|p| (p * 7).rem_euclid(12) == pitch_class)
        .unwrap_or(0);

    let step = FIFTHS_LETTERS[(position + 1).rem_euclid(7) as usize];
    let alter = (position + 1).div_euclid(7) as i8;
    let in_key = (sig - 1..=sig + 5).contains(&position);
    let natural = pitch - alter as i32;

    SpelledPitch {
        step,
        alter,
        octave: natural.div_euclid(12) - 1,
        display_accidental: if in_key { None } else { Some(alter) },
    }
}

/// Duration-weighted pitch-class histogram of the pitched notes
pub fn pitch_class_weights(ust: &UstProject) -> [f64; 12] {
    let mut weights = [0.0; 12];
    for note in ust.notes.iter().filter(|n| !n.is_rest()) {
        weights[note.pitch.rem_euclid(12) as usize] += note.length as f64;
    }
    weights
}

/// Key estimate for a project with the default analyzer
pub fn analyze_key(ust: &UstProject) -> Option<Key> {
    KrumhanslKessler.analyze(&pitch_class_weights(ust))
}

/// Build a score with the default key analyzer
pub fn to_score(ust: &UstProject) -> Score {
    to_score_with(ust, &KrumhanslKessler)
}

pub fn to_score_with(ust: &UstProject, analyzer: &dyn KeyAnalyzer) -> Score {
    let key = analyzer.analyze(&pitch_class_weights(ust));
    let spelling_key = key.unwrap_or_default();
    log::debug!("score key estimate: {:?}", key);

    let events = ust
        .notes
        .iter()
        .map(|note| {
            let quarter_length = Ratio::new(note.length, TICKS_PER_QUARTER);
            if note.is_rest() {
                ScoreEvent::Rest { quarter_length }
            } else {
                ScoreEvent::Note {
                    quarter_length,
                    pitch: note.pitch,
                    lyric: note.lyric.clone(),
                    spelling: spell(note.pitch, spelling_key),
                }
            }
        })
        .collect();

    Score { key, events }
}

impl UstProject {
    pub fn to_score(&self) -> Score {
        to_score(self)
    }
}

impl NnProject {
    /// NN goes through UST so gaps become explicit rests
    pub fn to_score(&self, use_text: bool) -> Result<Score> {
        Ok(to_score(&self.to_ust(use_text)?))
    }
}
