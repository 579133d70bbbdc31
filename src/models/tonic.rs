//! Key centers and key signatures
//!
//! The 17 commonly written tonics. Enharmonic pairs (C# / Db) are kept
//! apart because they imply different key signatures and spellings.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tonic {
    C,
    #[serde(rename = "C#")]
    Cs,
    Db,
    D,
    #[serde(rename = "D#")]
    Ds,
    Eb,
    E,
    F,
    #[serde(rename = "F#")]
    Fs,
    Gb,
    G,
    #[serde(rename = "G#")]
    Gs,
    Ab,
    A,
    #[serde(rename = "A#")]
    As,
    Bb,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Tonic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tonic::C => "C",
            Tonic::Cs => "C#",
            Tonic::Db => "Db",
            Tonic::D => "D",
            Tonic::Ds => "D#",
            Tonic::Eb => "Eb",
            Tonic::E => "E",
            Tonic::F => "F",
            Tonic::Fs => "F#",
            Tonic::Gb => "Gb",
            Tonic::G => "G",
            Tonic::Gs => "G#",
            Tonic::Ab => "Ab",
            Tonic::A => "A",
            Tonic::As => "A#",
            Tonic::Bb => "Bb",
            Tonic::B => "B",
        }
    }

    /// Position on the line of fifths (C = 0, G = 1, F = -1)
    pub fn fifths(&self) -> i8 {
        match self {
            Tonic::C => 0,
            Tonic::Cs => 7,
            Tonic::Db => -5,
            Tonic::D => 2,
            Tonic::Ds => 9,
            Tonic::Eb => -3,
            Tonic::E => 4,
            Tonic::F => -1,
            Tonic::Fs => 6,
            Tonic::Gb => -6,
            Tonic::G => 1,
            Tonic::Gs => 8,
            Tonic::Ab => -4,
            Tonic::A => 3,
            Tonic::As => 10,
            Tonic::Bb => -2,
            Tonic::B => 5,
        }
    }

    /// Conventional spelling of a key center in `mode`
    ///
    /// Picks the spelling with the smaller key signature (Db major rather
    /// than C# major, C# minor rather than Db minor).
    pub fn for_key(pitch_class: u8, mode: Mode) -> Tonic {
        match (pitch_class % 12, mode) {
            (0, _) => Tonic::C,
            (1, Mode::Major) => Tonic::Db,
            (1, Mode::Minor) => Tonic::Cs,
            (2, _) => Tonic::D,
            (3, _) => Tonic::Eb,
            (4, _) => Tonic::E,
            (5, _) => Tonic::F,
            (6, _) => Tonic::Fs,
            (7, _) => Tonic::G,
            (8, Mode::Major) => Tonic::Ab,
            (8, Mode::Minor) => Tonic::Gs,
            (9, _) => Tonic::A,
            (10, _) => Tonic::Bb,
            _ => Tonic::B,
        }
    }
}

impl fmt::Display for Tonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tonic and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: Tonic,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: Tonic, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    /// Signed key signature: sharps positive, flats negative
    pub fn signature(&self) -> i8 {
        match self.mode {
            Mode::Major => self.tonic.fifths(),
            Mode::Minor => self.tonic.fifths() - 3,
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::new(Tonic::C, Mode::Major)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{} major", self.tonic),
            Mode::Minor => write!(f, "{} minor", self.tonic.as_str().to_lowercase()),
        }
    }
}
