//! Error taxonomy shared by the codecs, models and converters

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UtauError {
    /// No candidate encoding could decode the given (1-based) line
    #[error("no text encoding could decode line {line}")]
    Decode { line: usize },

    #[error("note block {block} is missing required field `{field}`")]
    MalformedBlock { block: usize, field: &'static str },

    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("cannot convert `{value}` for key `{key}` to {expected}")]
    TypeConversion {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("meter {beats_per_bar}/{beat_unit} needs a positive beat count and unit")]
    InvalidMeter { beats_per_bar: u32, beat_unit: u32 },

    /// NN fields are whitespace-delimited, so lyrics must be one non-empty word
    #[error("note {index} has lyric field `{lyric}` that NN cannot store")]
    InvalidLyric { index: usize, lyric: String },

    #[error("tempo {0} bpm is not a positive finite number")]
    InvalidTempo(f64),

    #[error("{value} does not fit a {target}")]
    OutOfRange { value: u64, target: &'static str },

    #[error("project has no notes")]
    EmptyProject,

    #[error("project has no pitched (non-rest) notes")]
    RangeUnavailable,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("midi write error: {0}")]
    Midi(String),
}

pub type Result<T> = std::result::Result<T, UtauError>;
