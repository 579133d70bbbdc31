//! Standard MIDI File output for the generic track events

use super::track::{control_events, nn_track, ust_track, ControlEvent, TrackEvent, TrackEventKind};
use crate::defaults::TICKS_PER_QUARTER;
use crate::error::{Result, UtauError};
use crate::models::{NnProject, UstProject};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track};

/// Largest tempo a Set Tempo meta event holds (24 bits)
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;
/// Largest delta-time a track event holds (28 bits)
const MAX_DELTA_TICKS: u64 = 0x0FFF_FFFF;

/// Write a Format 1 SMF: a conductor track holding `control`, then the
/// note track built from `events`
pub fn write_smf(control: &[ControlEvent], events: impl Iterator<Item = TrackEvent>) -> Result<Vec<u8>> {
    // Lyric bytes are borrowed by midly, so the stream is materialized first
    let events: Vec<TrackEvent> = events.collect();

    let tracks = vec![build_conductor_track(control)?, build_note_track(&events)?];

    let smf = Smf {
        header: Header {
            format: Format::Parallel,
            timing: Timing::Metrical((TICKS_PER_QUARTER as u16).into()),
        },
        tracks,
    };

    let mut out = Vec::new();
    smf.write(&mut out)
        .map_err(|e| UtauError::Midi(format!("Failed to write MIDI: {}", e)))?;
    log::debug!("wrote SMF: {} note-track events, {} bytes", events.len(), out.len());
    Ok(out)
}

/// MIDI bytes for a UST project
pub fn ust_to_midi(ust: &UstProject) -> Result<Vec<u8>> {
    write_smf(&control_events(ust.tempo())?, ust_track(ust))
}

/// MIDI bytes for an NN project
pub fn nn_to_midi(nn: &NnProject, use_text: bool) -> Result<Vec<u8>> {
    write_smf(&control_events(nn.tempo)?, nn_track(nn, use_text))
}

fn build_conductor_track(control: &[ControlEvent]) -> Result<Track<'static>> {
    let mut track: Track<'static> = control
        .iter()
        .map(|event| {
            let kind = match *event {
                ControlEvent::TrackName(name) => MetaMessage::TrackName(name.as_bytes()),
                ControlEvent::Tempo { micros_per_quarter } => {
                    if micros_per_quarter > MAX_TEMPO_MICROS {
                        return Err(UtauError::Midi(format!(
                            "tempo of {} us per quarter exceeds the 24-bit limit",
                            micros_per_quarter
                        )));
                    }
                    MetaMessage::Tempo(micros_per_quarter.into())
                }
            };
            Ok(midly::TrackEvent {
                delta: 0.into(),
                kind: midly::TrackEventKind::Meta(kind),
            })
        })
        .collect::<Result<_>>()?;

    track.push(midly::TrackEvent {
        delta: 0.into(),
        kind: midly::TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(track)
}

fn delta_ticks(ticks: u64) -> Result<u32> {
    if ticks > MAX_DELTA_TICKS {
        return Err(UtauError::Midi(format!(
            "delta of {} ticks exceeds the 28-bit limit",
            ticks
        )));
    }
    Ok(ticks as u32)
}

fn build_note_track(events: &[TrackEvent]) -> Result<Track<'_>> {
    events
        .iter()
        .map(|event| {
            Ok(midly::TrackEvent {
                delta: delta_ticks(event.delta)?.into(),
                kind: note_event_kind(&event.kind),
            })
        })
        .collect()
}

fn note_event_kind(kind: &TrackEventKind) -> midly::TrackEventKind<'_> {
    match kind {
        TrackEventKind::Lyric(text) => midly::TrackEventKind::Meta(MetaMessage::Lyric(text.as_bytes())),
        TrackEventKind::NoteOn { key, velocity } => midly::TrackEventKind::Midi {
            channel: 0.into(),
            message: MidiMessage::NoteOn {
                key: (*key).into(),
                vel: (*velocity).into(),
            },
        },
        TrackEventKind::NoteOff { key, velocity } => midly::TrackEventKind::Midi {
            channel: 0.into(),
            message: MidiMessage::NoteOff {
                key: (*key).into(),
                vel: (*velocity).into(),
            },
        },
        TrackEventKind::EndOfTrack => midly::TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}
