//! UST project model
//!
//! A UST project is a `[#SETTING]` property block followed by an ordered
//! list of notes. Time is measured in ticks (480 per quarter note); rests
//! are ordinary notes whose lyric is one of the rest tokens.

use super::properties::Properties;
use super::value::Value;
use crate::defaults::{DEFAULT_TEMPO_BPM, REST_LYRICS, TRANSIENT_PREFIX};
use crate::error::{Result, UtauError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Bound, Range, RangeBounds};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UstNote {
    /// Duration in ticks
    pub length: u32,
    pub lyric: String,
    /// MIDI note number (C4 = 60); kept for rests even though unused
    pub pitch: i32,
    /// Every other note property (PreUtterance, Flags, ...)
    pub extra: Properties,
}

impl UstNote {
    pub fn new(length: u32, lyric: impl Into<String>, pitch: i32) -> Self {
        Self {
            length,
            lyric: lyric.into(),
            pitch,
            extra: Properties::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key, value.into());
        self
    }

    pub fn is_rest(&self) -> bool {
        REST_LYRICS.contains(&self.lyric.as_str())
    }

    /// Extras that are written to disk (transient `_` keys excluded)
    pub fn persistent_extra(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extra.iter().filter(|(k, _)| !k.starts_with(TRANSIENT_PREFIX))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UstProject {
    pub properties: Properties,
    pub notes: Vec<UstNote>,
}

impl UstProject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project tempo from `properties["Tempo"]`, 120 when absent
    pub fn tempo(&self) -> f64 {
        self.properties
            .get("Tempo")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_TEMPO_BPM)
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.properties.insert("Tempo", Value::Float(bpm));
    }

    /// Total duration in ticks
    pub fn length(&self) -> u64 {
        self.notes.iter().map(|n| n.length as u64).sum()
    }

    /// `(lowest, highest + 1)` over the pitched notes
    pub fn pitch_range(&self) -> Result<(i32, i32)> {
        let mut pitches = self.notes.iter().filter(|n| !n.is_rest()).map(|n| n.pitch);
        let first = pitches.next().ok_or(UtauError::RangeUnavailable)?;
        let (low, high) = pitches.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Ok((low, high + 1))
    }

    /// Lyrics of the notes in `range`, optionally skipping rests
    pub fn lyrics(&self, range: impl RangeBounds<usize>, ignore_rests: bool) -> Vec<&str> {
        let range = clamp_range(range, self.notes.len());
        self.notes[range]
            .iter()
            .filter(|n| !(ignore_rests && n.is_rest()))
            .map(|n| n.lyric.as_str())
            .collect()
    }

    /// Replace every lyric found in `dictionary`; others are left alone
    pub fn replace_lyrics(
        &mut self,
        dictionary: &HashMap<String, String>,
        range: impl RangeBounds<usize>,
    ) -> &mut Self {
        let range = clamp_range(range, self.notes.len());
        for note in &mut self.notes[range] {
            if let Some(replacement) = dictionary.get(&note.lyric) {
                note.lyric = replacement.clone();
            }
        }
        self
    }

    /// Assign `lyrics` in order to the notes in `range`
    ///
    /// Surplus lyrics are unused; notes past the end of `lyrics` keep
    /// their current lyric.
    pub fn set_lyrics<S: AsRef<str>>(
        &mut self,
        lyrics: &[S],
        range: impl RangeBounds<usize>,
        ignore_rests: bool,
    ) -> &mut Self {
        let range = clamp_range(range, self.notes.len());
        let targets = self.notes[range]
            .iter_mut()
            .filter(|n| !(ignore_rests && n.is_rest()));
        for (note, lyric) in targets.zip(lyrics) {
            note.lyric = lyric.as_ref().to_string();
        }
        self
    }

    /// Snap note boundaries to multiples of `grid` ticks
    ///
    /// Boundaries round to the nearest grid line (ties to even); notes
    /// that collapse to zero length are removed. `grid == 0` is a no-op.
    pub fn quantize(&mut self, grid: u32) -> &mut Self {
        if grid == 0 {
            log::warn!("quantize called with a zero grid, ignoring");
            return self;
        }
        let grid = grid as u64;
        let mut tick = 0u64;
        let before = self.notes.len();

        // Each note's end is measured from the previous snapped boundary
        self.notes.retain_mut(|note| {
            let snapped = round_to_grid(tick + note.length as u64, grid);
            let length = snapped - tick;
            note.length = length as u32;
            tick = snapped;
            length > 0
        });

        let dropped = before - self.notes.len();
        if dropped > 0 {
            log::debug!("quantize({}) dropped {} collapsed notes", grid, dropped);
        }
        self
    }
}

/// Round to the nearest multiple of `grid`, half to even
fn round_to_grid(ticks: u64, grid: u64) -> u64 {
    let q = ticks / grid;
    let r = ticks % grid;
    let q = match (2 * r).cmp(&grid) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
    };
    q * grid
}

fn clamp_range(range: impl RangeBounds<usize>, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s + 1,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e + 1,
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    let end = end.min(len);
    start.min(end)..end
}
