//! MIDI note number naming

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name a MIDI note number with sharp spellings (60 → "C4")
pub fn note_name(pitch: i32) -> String {
    let class = pitch.rem_euclid(12) as usize;
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", SHARP_NAMES[class], octave)
}

/// Clamp a model pitch into the 7-bit MIDI key range
pub fn midi_key(pitch: i32) -> u8 {
    pitch.clamp(0, 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(83), "B5");
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn test_midi_key_clamps() {
        assert_eq!(midi_key(-4), 0);
        assert_eq!(midi_key(64), 64);
        assert_eq!(midi_key(200), 127);
    }
}
