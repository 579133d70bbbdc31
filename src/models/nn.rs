//! NN project model
//!
//! NN notes are positioned on an absolute grid of 32nd-note units and carry
//! two fixed-length curves: dynamics (0-100) and pitch (50 = no bend).

use crate::defaults::{
    DEFAULT_BEATS, DEFAULT_TEMPO_BPM, NN_CURVE_LEN, NN_MAX_BEND_SEMITONES, NN_PITCH_CENTER,
};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A curve of exactly `NN_CURVE_LEN` samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Curve(Vec<f64>);

impl Curve {
    /// A curve holding `value` at every sample
    pub fn flat(value: f64) -> Self {
        Curve(vec![value; NN_CURVE_LEN])
    }

    /// Wrap `samples`, returning them back if the length is wrong
    pub fn from_samples(samples: Vec<f64>) -> Result<Self, Vec<f64>> {
        if samples.len() == NN_CURVE_LEN {
            Ok(Curve(samples))
        } else {
            Err(samples)
        }
    }

    pub fn from_fn(f: impl FnMut(usize) -> f64) -> Self {
        Curve((0..NN_CURVE_LEN).map(f).collect())
    }

    pub fn samples(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn map(&self, f: impl FnMut(f64) -> f64) -> Self {
        Curve(self.0.iter().copied().map(f).collect())
    }

    /// Largest absolute sample
    pub fn peak(&self) -> f64 {
        self.iter().fold(0.0, |acc, x| acc.max(x.abs()))
    }
}

impl TryFrom<Vec<f64>> for Curve {
    type Error = String;

    fn try_from(samples: Vec<f64>) -> Result<Self, Self::Error> {
        Curve::from_samples(samples).map_err(|s| {
            format!("curve must have {} samples, got {}", NN_CURVE_LEN, s.len())
        })
    }
}

impl From<Curve> for Vec<f64> {
    fn from(curve: Curve) -> Self {
        curve.0
    }
}

impl Index<usize> for Curve {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NnNote {
    /// Ideographic lyric (hanzi)
    pub text: String,
    /// Phonetic lyric (pinyin)
    pub reading: String,
    /// Start in 32nd-note units
    pub start: u32,
    /// Length in 32nd-note units
    pub length: u32,
    /// MIDI note number; the file stores `83 - pitch`
    pub pitch: i32,
    pub clarity: i32,
    pub velocity: i32,
    pub portamento: i32,
    pub vibrato_length: i32,
    pub vibrato_depth: i32,
    pub vibrato_rate: i32,
    /// Volume curve, 0-100
    pub dynamics_curve: Curve,
    /// Pitch curve, 50 = no bend
    pub pitch_curve: Curve,
    /// 0-11, meaning a bend range of 1-12 semitones
    pub pitch_bend_sensitivity: i32,
}

impl NnNote {
    pub fn new(
        text: impl Into<String>,
        reading: impl Into<String>,
        start: u32,
        length: u32,
        pitch: i32,
    ) -> Self {
        Self {
            text: text.into(),
            reading: reading.into(),
            start,
            length,
            pitch,
            clarity: 50,
            velocity: 50,
            portamento: 0,
            vibrato_length: 0,
            vibrato_depth: 0,
            vibrato_rate: 0,
            dynamics_curve: Curve::flat(50.0),
            pitch_curve: Curve::flat(NN_PITCH_CENTER),
            pitch_bend_sensitivity: 0,
        }
    }

    /// End position in 32nd-note units
    pub fn end(&self) -> u64 {
        self.start as u64 + self.length as u64
    }

    /// Lyric chosen by `use_text` (text) or the reading otherwise
    pub fn lyric(&self, use_text: bool) -> &str {
        if use_text {
            &self.text
        } else {
            &self.reading
        }
    }

    /// Pitch bend in semitones, reconstructed from curve and sensitivity
    pub fn pitch_bend(&self) -> Curve {
        let range = (self.pitch_bend_sensitivity + 1) as f64;
        self.pitch_curve
            .map(|p| (p - NN_PITCH_CENTER) * range / NN_PITCH_CENTER)
    }

    /// Store a semitone bend, choosing the smallest sensitivity that fits
    ///
    /// NN cannot express more than ±12 semitones. Larger bends are scaled
    /// by the 12-semitone range and fall outside the 0-100 curve range.
    pub fn set_pitch_bend(&mut self, bend: &Curve) {
        let peak = bend.peak();
        let range = (peak.ceil() as i32).clamp(1, NN_MAX_BEND_SEMITONES);
        if peak > NN_MAX_BEND_SEMITONES as f64 {
            log::warn!(
                "pitch bend peak {:.2} exceeds {} semitones, curve leaves 0-100",
                peak,
                NN_MAX_BEND_SEMITONES
            );
        }
        self.pitch_bend_sensitivity = range - 1;
        let range = range as f64;
        self.pitch_curve = bend.map(|b| b / range * NN_PITCH_CENTER + NN_PITCH_CENTER);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NnProject {
    /// Beats per minute
    pub tempo: f64,
    /// (beats per bar, beat unit)
    pub beats: (u32, u32),
    pub notes: Vec<NnNote>,
}

impl Default for NnProject {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO_BPM,
            beats: DEFAULT_BEATS,
            notes: Vec::new(),
        }
    }
}

impl NnProject {
    pub fn new(tempo: f64, beats: (u32, u32)) -> Self {
        Self {
            tempo,
            beats,
            notes: Vec::new(),
        }
    }

    /// Stable sort by start position
    pub fn sort(&mut self) -> &mut Self {
        self.notes.sort_by_key(|n| n.start);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_note_defaults() {
        let note = NnNote::new("啊", "a", 0, 8, 60);
        assert_eq!(note.clarity, 50);
        assert_eq!(note.velocity, 50);
        assert_eq!(note.portamento, 0);
        assert_eq!(note.dynamics_curve, Curve::flat(50.0));
        assert_eq!(note.pitch_curve, Curve::flat(50.0));
        assert_eq!(note.pitch_bend_sensitivity, 0);
        assert_eq!(note.end(), 8);
    }

    #[test]
    fn test_end_past_u32() {
        let note = NnNote::new("a", "a", u32::MAX, u32::MAX, 60);
        assert_eq!(note.end(), u32::MAX as u64 * 2);
    }

    #[test]
    fn test_curve_length_is_enforced() {
        assert!(Curve::from_samples(vec![50.0; 100]).is_ok());
        assert_eq!(Curve::from_samples(vec![1.0; 99]).unwrap_err().len(), 99);
    }

    #[test]
    fn test_curve_deserialization_checks_length() {
        let ok: Curve = serde_json::from_str(&serde_json::to_string(&vec![1.0; 100]).unwrap()).unwrap();
        assert_eq!(ok.samples().len(), 100);
        assert!(serde_json::from_str::<Curve>("[1.0, 2.0]").is_err());
    }

    #[test]
    fn test_flat_curve_has_no_bend() {
        let note = NnNote::new("a", "a", 0, 8, 60);
        assert!(note.pitch_bend().iter().all(|b| b == 0.0));
    }

    #[test]
    fn test_pitch_bend_reads_sensitivity() {
        let mut note = NnNote::new("a", "a", 0, 8, 60);
        note.pitch_curve = Curve::flat(100.0);
        note.pitch_bend_sensitivity = 1;
        assert!(note.pitch_bend().iter().all(|b| (b - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_set_pitch_bend_picks_smallest_range() {
        let mut note = NnNote::new("a", "a", 0, 8, 60);
        note.set_pitch_bend(&Curve::from_fn(|i| if i < 50 { 2.5 } else { -1.0 }));
        assert_eq!(note.pitch_bend_sensitivity, 2);
        assert!((note.pitch_curve[0] - (2.5 / 3.0 * 50.0 + 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_set_pitch_bend_zero_curve() {
        let mut note = NnNote::new("a", "a", 0, 8, 60);
        note.set_pitch_bend(&Curve::flat(0.0));
        assert_eq!(note.pitch_bend_sensitivity, 0);
        assert_eq!(note.pitch_curve, Curve::flat(50.0));
    }

    #[test]
    fn test_set_pitch_bend_clamps_large_bends() {
        let mut note = NnNote::new("a", "a", 0, 8, 60);
        note.set_pitch_bend(&Curve::flat(20.0));
        assert_eq!(note.pitch_bend_sensitivity, 11);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut project = NnProject::default();
        project.notes.push(NnNote::new("c", "c", 8, 4, 60));
        project.notes.push(NnNote::new("a", "a", 0, 4, 60));
        project.notes.push(NnNote::new("b", "b", 0, 4, 62));
        project.sort();
        let order: Vec<_> = project.notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_pitch_bend_round_trips(samples in prop::collection::vec(-12.0f64..12.0, 100)) {
            let bend = Curve::from_samples(samples).unwrap();
            let mut note = NnNote::new("a", "a", 0, 8, 60);
            note.set_pitch_bend(&bend);
            prop_assert!((0..=11).contains(&note.pitch_bend_sensitivity));
            for (got, want) in note.pitch_bend().iter().zip(bend.iter()) {
                prop_assert!((got - want).abs() < 1e-9);
            }
        }
    }
}
