//! Unit constants and default values shared by every format
//!
//! UST counts time in ticks (480 per quarter note), NN counts it in
//! 32nd-note units (8 per quarter note), so one NN unit is 60 ticks.

/// UST / MIDI resolution: ticks per quarter note
pub const TICKS_PER_QUARTER: u32 = 480;

/// NN resolution: 32nd-note units per quarter note
pub const NN_UNITS_PER_QUARTER: u32 = 8;

/// NN units in one whole note (the bar-length numerator)
pub const NN_UNITS_PER_WHOLE: u32 = NN_UNITS_PER_QUARTER * 4;

/// Ticks in one NN unit
pub const TICKS_PER_NN_UNIT: u32 = TICKS_PER_QUARTER / NN_UNITS_PER_QUARTER;

/// Default tempo in beats per minute
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Default beats per bar and beat unit
pub const DEFAULT_BEATS: (u32, u32) = (4, 4);

/// Velocity used for generated note-on/note-off events
pub const DEFAULT_VELOCITY: u8 = 64;

/// Lyric tokens that mark a rest
pub const REST_LYRICS: [&str; 4] = ["", " ", "r", "R"];

/// Lyric written for rests synthesized during conversion
pub const REST_LYRIC: &str = "R";

/// Placeholder pitch for synthesized rests
pub const REST_PITCH: i32 = 60;

/// Samples in every NN curve
pub const NN_CURVE_LEN: usize = 100;

/// Leading token of every serialized NN curve
pub const NN_CURVE_MARKER: &str = "100";

/// NN stores pitch as `NN_PITCH_INVERSION - midi_pitch` (B5 = 0)
pub const NN_PITCH_INVERSION: i32 = 83;

/// Center of the NN pitch curve (no bend)
pub const NN_PITCH_CENTER: f64 = 50.0;

/// Largest pitch-bend range NN can express, in semitones
pub const NN_MAX_BEND_SEMITONES: i32 = 12;

/// Constant NN header fields following the bar count
pub const NN_HEADER_TRAILER: &str = "19 0 0 0 0 0";

/// Transient UST extras start with this prefix and are never written
pub const TRANSIENT_PREFIX: char = '_';

/// Convert UST ticks to whole NN units (floor), `None` past the NN range
pub fn ticks_to_nn_units(ticks: u64) -> Option<u32> {
    u32::try_from(ticks / TICKS_PER_NN_UNIT as u64).ok()
}

/// Convert NN units to UST ticks
pub fn nn_units_to_ticks(units: u64) -> u64 {
    units.saturating_mul(TICKS_PER_NN_UNIT as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_relationships() {
        assert_eq!(TICKS_PER_NN_UNIT, 60);
        assert_eq!(NN_UNITS_PER_WHOLE, 32);
        assert_eq!(nn_units_to_ticks(8), TICKS_PER_QUARTER as u64);
    }

    #[test]
    fn test_ticks_to_nn_units_floors() {
        assert_eq!(ticks_to_nn_units(0), Some(0));
        assert_eq!(ticks_to_nn_units(59), Some(0));
        assert_eq!(ticks_to_nn_units(60), Some(1));
        assert_eq!(ticks_to_nn_units(479), Some(7));
    }

    #[test]
    fn test_unit_conversions_do_not_overflow() {
        assert_eq!(nn_units_to_ticks(u32::MAX as u64), u32::MAX as u64 * 60);
        assert_eq!(nn_units_to_ticks(u64::MAX), u64::MAX);
        assert_eq!(ticks_to_nn_units(u32::MAX as u64 * 60 + 59), Some(u32::MAX));
        assert_eq!(ticks_to_nn_units((u32::MAX as u64 + 1) * 60), None);
    }
}
