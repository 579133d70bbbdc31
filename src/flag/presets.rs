//! Flag tokens and defaults for common resampler engines

use super::{FlagSchema, FlagValue};
use FlagValue::{Bool, Int};

/// Classic `resampler.exe`
pub const RESAMPLER: &FlagSchema = &[
    ("a", Int(100)),
    ("B", Int(50)),
    ("b", Int(50)),
    ("C", Int(0)),
    ("c", Int(0)),
    ("D", Int(0)),
    ("E", Int(0)),
    ("F", Int(3)),
    ("G", Bool(false)),
    ("g", Int(0)),
    ("H", Int(0)),
    ("h", Int(0)),
    ("L", Int(3)),
    ("N", Bool(false)),
    ("P", Int(86)),
    ("t", Int(0)),
    ("W", Int(0)),
    ("Y", Int(50)),
    ("x", Int(0)),
];

pub const MORESAMPLER: &FlagSchema = &[
    ("A", Int(0)),
    ("b", Int(50)),
    ("e", Bool(false)),
    ("g", Int(0)),
    ("Mb", Int(0)),
    ("MC", Int(0)),
    ("Md", Int(0)),
    ("MD", Int(0)),
    ("ME", Int(0)),
    ("Me", Bool(false)),
    ("MG", Int(0)),
    ("Mm", Int(100)),
    ("Mo", Int(0)),
    ("Mr", Int(0)),
    ("Ms", Int(0)),
    ("Mt", Int(0)),
    ("P", Int(86)),
    ("t", Int(0)),
    ("u", Bool(false)),
];

/// Look up a preset by engine name
pub fn by_name(engine: &str) -> Option<&'static FlagSchema> {
    match engine.to_ascii_lowercase().as_str() {
        "resampler" => Some(RESAMPLER),
        "moresampler" => Some(MORESAMPLER),
        _ => None,
    }
}
