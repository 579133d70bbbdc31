//! Generic timed track events
//!
//! Both project formats flatten to the same event shape: for every pitched
//! note a lyric event, a note-on and a note-off, with accumulated rest time
//! carried as the delay before the next lyric. The stream is lazy and
//! single-pass; it ends with an end-of-track marker.

use crate::defaults::{nn_units_to_ticks, DEFAULT_VELOCITY};
use crate::error::{Result, UtauError};
use crate::models::pitch::midi_key;
use crate::models::{NnProject, UstProject};

/// Name of the conductor track carrying the tempo
pub const CONTROL_TRACK_NAME: &str = "Control";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackEventKind {
    Lyric(String),
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8, velocity: u8 },
    EndOfTrack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvent {
    /// Ticks since the previous event
    pub delta: u64,
    pub kind: TrackEventKind,
}

/// Events of the conductor track, all at tick 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    TrackName(&'static str),
    Tempo { micros_per_quarter: u32 },
}

/// One step of a project timeline, in ticks
#[derive(Debug, Clone, PartialEq)]
pub enum Span<'a> {
    Rest(u64),
    Note { lyric: &'a str, pitch: i32, length: u64 },
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Scan,
    NoteOn { key: u8, length: u64 },
    NoteOff { key: u8, length: u64 },
    Done,
}

/// Lazy event stream over a sequence of spans
#[derive(Debug)]
pub struct TrackEvents<I> {
    spans: I,
    pending_rest: u64,
    phase: Phase,
}

impl<I> TrackEvents<I> {
    pub fn new(spans: I) -> Self {
        Self {
            spans,
            pending_rest: 0,
            phase: Phase::Scan,
        }
    }
}

impl<'a, I: Iterator<Item = Span<'a>>> Iterator for TrackEvents<I> {
    type Item = TrackEvent;

    fn next(&mut self) -> Option<TrackEvent> {
        loop {
            match self.phase {
                Phase::Scan => match self.spans.next() {
                    Some(Span::Rest(ticks)) => {
                        self.pending_rest = self.pending_rest.saturating_add(ticks)
                    }
                    Some(Span::Note { lyric, pitch, length }) => {
                        let delta = std::mem::take(&mut self.pending_rest);
                        self.phase = Phase::NoteOn {
                            key: midi_key(pitch),
                            length,
                        };
                        return Some(TrackEvent {
                            delta,
                            kind: TrackEventKind::Lyric(lyric.to_string()),
                        });
                    }
                    None => {
                        // Trailing rest time is not carried into the marker
                        self.phase = Phase::Done;
                        return Some(TrackEvent {
                            delta: 0,
                            kind: TrackEventKind::EndOfTrack,
                        });
                    }
                },
                Phase::NoteOn { key, length } => {
                    self.phase = Phase::NoteOff { key, length };
                    return Some(TrackEvent {
                        delta: 0,
                        kind: TrackEventKind::NoteOn {
                            key,
                            velocity: DEFAULT_VELOCITY,
                        },
                    });
                }
                Phase::NoteOff { key, length } => {
                    self.phase = Phase::Scan;
                    return Some(TrackEvent {
                        delta: length,
                        kind: TrackEventKind::NoteOff {
                            key,
                            velocity: DEFAULT_VELOCITY,
                        },
                    });
                }
                Phase::Done => return None,
            }
        }
    }
}

/// Tempo in microseconds per quarter note
///
/// Very slow tempos saturate at `u32::MAX`; the MIDI writer rejects
/// anything past its 24-bit limit.
pub fn bpm_to_micros(bpm: f64) -> Result<u32> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(UtauError::InvalidTempo(bpm));
    }
    Ok((60_000_000.0 / bpm).round() as u32)
}

/// Conductor events for a project at `bpm`
pub fn control_events(bpm: f64) -> Result<[ControlEvent; 2]> {
    Ok([
        ControlEvent::TrackName(CONTROL_TRACK_NAME),
        ControlEvent::Tempo {
            micros_per_quarter: bpm_to_micros(bpm)?,
        },
    ])
}

/// Event stream of a UST project
pub fn ust_track(ust: &UstProject) -> TrackEvents<impl Iterator<Item = Span<'_>>> {
    TrackEvents::new(ust.notes.iter().map(|note| {
        if note.is_rest() {
            Span::Rest(note.length as u64)
        } else {
            Span::Note {
                lyric: &note.lyric,
                pitch: note.pitch,
                length: note.length as u64,
            }
        }
    }))
}

/// Event stream of an NN project, in stored note order
///
/// The delay before each note is the gap since the previous note's end;
/// overlapping notes get no delay.
pub fn nn_track(nn: &NnProject, use_text: bool) -> TrackEvents<impl Iterator<Item = Span<'_>>> {
    let spans = nn
        .notes
        .iter()
        .scan(0u64, move |cursor, note| {
            let gap = (note.start as u64).saturating_sub(*cursor);
            *cursor = note.end();
            Some([
                Span::Rest(nn_units_to_ticks(gap)),
                Span::Note {
                    lyric: note.lyric(use_text),
                    pitch: note.pitch,
                    length: nn_units_to_ticks(note.length as u64),
                },
            ])
        })
        .flatten();
    TrackEvents::new(spans)
}
