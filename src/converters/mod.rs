//! Format converters
//!
//! Conversions between the UST and NN models, and from either one to the
//! generic track event stream, Standard MIDI Files and a score stream.

pub mod midi;
pub mod score;
pub mod track;
pub mod ust_nn;

// Re-export for convenience
pub use midi::{nn_to_midi, ust_to_midi, write_smf};
pub use score::{analyze_key, spell, to_score, KeyAnalyzer, KrumhanslKessler, Score, ScoreEvent, SpelledPitch};
pub use track::{nn_track, ust_track, ControlEvent, TrackEvent, TrackEventKind};
pub use ust_nn::{nn_to_ust, ust_to_nn};
