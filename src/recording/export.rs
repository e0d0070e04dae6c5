// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Turns a recorded take into a single-track (format 0) MIDI file. Note
//! times are converted from milliseconds to ticks at a fixed tempo; no
//! tempo, program or name events are written, so players fall back to
//! their default of 120 BPM.
//!
//! Ordering is deterministic: notes are sorted by start time, pitch,
//! duration and velocity. Each note contributes its note-on followed by
//! its note-off, and the resulting events are stable-sorted by tick.
//! Events landing on the same tick keep the order of their notes.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::note::{NoteError, NoteEvent};
use crate::midi::messages;
use crate::midi::{channel_message, vlq};

/// Division used when none is given
pub const DEFAULT_TICKS_PER_QUARTER_NOTE: u16 = 96;

/// Tempo used when none is given
pub const DEFAULT_BPM: f64 = 120.0;

/// Largest metrical division; bit 15 selects SMPTE timing
pub const MAX_TICKS_PER_QUARTER_NOTE: u16 = 0x7FFF;

/// MIME type for downloads
pub const MIME_TYPE: &str = "audio/midi";

/// All events go out on the first channel
const CHANNEL: u8 = 0;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("ticks per quarter note must be between 1 and 32767, got {0}")]
    InvalidDivision(u16),
    #[error("tempo must be a finite, positive BPM, got {0}")]
    InvalidTempo(f64),
    #[error("note {index}: {source}")]
    InvalidNote {
        /// Position of the note in the caller's input
        index: usize,
        source: NoteError,
    },
    #[error("delta time of {0} ticks does not fit in a MIDI file")]
    DeltaTooLarge(u64),
    #[error("track data of {0} bytes does not fit in a MIDI file")]
    TrackTooLong(usize),
    #[error("failed to write MIDI file: {0}")]
    Io(#[from] io::Error),
}

/// What to do with a note that fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidNotePolicy {
    /// Fail the whole export, naming the offending note
    #[default]
    Reject,
    /// Drop the note, log a warning and carry on
    Skip,
}

/// Timing and validation settings for an export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    /// Header division (PPQN)
    pub ticks_per_quarter_note: u16,
    /// Tempo used to convert milliseconds to ticks
    pub bpm: f64,
    /// Handling of malformed notes
    pub invalid_notes: InvalidNotePolicy,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            ticks_per_quarter_note: DEFAULT_TICKS_PER_QUARTER_NOTE,
            bpm: DEFAULT_BPM,
            invalid_notes: InvalidNotePolicy::Reject,
        }
    }
}

impl ExportSettings {
    /// Create settings with the reject policy
    pub fn new(ticks_per_quarter_note: u16, bpm: f64) -> Self {
        Self {
            ticks_per_quarter_note,
            bpm,
            invalid_notes: InvalidNotePolicy::Reject,
        }
    }

    /// Set the invalid-note policy
    pub fn with_policy(mut self, policy: InvalidNotePolicy) -> Self {
        self.invalid_notes = policy;
        self
    }

    /// Reject divisions and tempos that would produce a degenerate file
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.ticks_per_quarter_note == 0
            || self.ticks_per_quarter_note > MAX_TICKS_PER_QUARTER_NOTE
        {
            return Err(ExportError::InvalidDivision(self.ticks_per_quarter_note));
        }
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(ExportError::InvalidTempo(self.bpm));
        }
        Ok(())
    }

    /// Ticks per millisecond at this division and tempo
    pub fn ticks_per_millisecond(&self) -> f64 {
        // quarter notes per second * ticks per quarter note, per 1000 ms
        f64::from(self.ticks_per_quarter_note) * (self.bpm / 60.0) / 1000.0
    }

    /// Convert a millisecond offset to the nearest tick
    pub fn ms_to_ticks(&self, ms: f64) -> u64 {
        // `as` saturates, and callers have already rejected NaN
        (ms * self.ticks_per_millisecond()).round() as u64
    }
}

/// Kind of scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
}

/// A note-on or note-off at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMidiEvent {
    /// Absolute tick
    pub tick: u64,
    pub kind: EventKind,
    pub pitch: u8,
    /// Always 0 for note-off
    pub velocity: u8,
}

impl TimedMidiEvent {
    fn note_on(tick: u64, pitch: u8, velocity: u8) -> Self {
        Self {
            tick,
            kind: EventKind::NoteOn,
            pitch,
            velocity,
        }
    }

    fn note_off(tick: u64, pitch: u8) -> Self {
        Self {
            tick,
            kind: EventKind::NoteOff,
            pitch,
            velocity: 0,
        }
    }

    /// Raw channel message bytes
    pub fn message(&self) -> [u8; 3] {
        let status = match self.kind {
            EventKind::NoteOn => messages::NOTE_ON,
            EventKind::NoteOff => messages::NOTE_OFF,
        };
        channel_message(status, CHANNEL, self.pitch, self.velocity)
    }
}

/// Validate `notes` and expand them into tick-sorted note-on/off pairs.
pub fn schedule(
    notes: &[NoteEvent],
    settings: &ExportSettings,
) -> Result<Vec<TimedMidiEvent>, ExportError> {
    settings.validate()?;

    let mut accepted: Vec<&NoteEvent> = Vec::with_capacity(notes.len());
    for (index, note) in notes.iter().enumerate() {
        match note.validate() {
            Ok(()) => accepted.push(note),
            Err(source) => match settings.invalid_notes {
                InvalidNotePolicy::Reject => {
                    return Err(ExportError::InvalidNote { index, source });
                }
                InvalidNotePolicy::Skip => {
                    warn!(index, error = %source, "skipping invalid note");
                }
            },
        }
    }

    // Notes equal on every key encode to identical bytes
    accepted.sort_by(|a, b| {
        a.start_time
            .total_cmp(&b.start_time)
            .then(a.pitch.cmp(&b.pitch))
            .then(a.duration.total_cmp(&b.duration))
            .then(a.effective_velocity().cmp(&b.effective_velocity()))
    });

    let mut events = Vec::with_capacity(accepted.len() * 2);
    for note in accepted {
        let start_tick = settings.ms_to_ticks(note.start_time);
        let end_tick = start_tick.saturating_add(settings.ms_to_ticks(note.duration));
        events.push(TimedMidiEvent::note_on(
            start_tick,
            note.pitch,
            note.effective_velocity(),
        ));
        events.push(TimedMidiEvent::note_off(end_tick, note.pitch));
    }

    // Stable: ties keep note order
    events.sort_by_key(|e| e.tick);

    Ok(events)
}

/// Encode `notes` with the reject policy.
///
/// `ticks_per_quarter_note` is also written as the header division.
pub fn encode(
    notes: &[NoteEvent],
    ticks_per_quarter_note: u16,
    bpm: f64,
) -> Result<Vec<u8>, ExportError> {
    encode_with(notes, &ExportSettings::new(ticks_per_quarter_note, bpm))
}

/// Encode `notes` into a complete format 0 MIDI file.
pub fn encode_with(notes: &[NoteEvent], settings: &ExportSettings) -> Result<Vec<u8>, ExportError> {
    let events = schedule(notes, settings)?;
    let track_data = track_events(&events)?;

    let mut buffer = Vec::with_capacity(22 + track_data.len());
    write_header(&mut buffer, settings.ticks_per_quarter_note)?;
    write_track(&mut buffer, &track_data)?;

    debug!(
        notes = events.len() / 2,
        bytes = buffer.len(),
        ppqn = settings.ticks_per_quarter_note,
        bpm = settings.bpm,
        "encoded MIDI file"
    );

    Ok(buffer)
}

/// Delta-encode sorted events and terminate the track
fn track_events(events: &[TimedMidiEvent]) -> Result<Vec<u8>, ExportError> {
    let mut track_data = Vec::with_capacity(events.len() * 4 + 4);
    let mut last_tick = 0u64;

    for event in events {
        let delta = event.tick.saturating_sub(last_tick);
        write_delta(&mut track_data, delta)?;
        track_data.extend_from_slice(&event.message());
        last_tick = event.tick;
    }

    write_delta(&mut track_data, 0)?;
    track_data.extend_from_slice(&[messages::META, messages::END_OF_TRACK, 0x00]);

    Ok(track_data)
}

fn write_delta(buffer: &mut Vec<u8>, delta: u64) -> Result<(), ExportError> {
    let value = u32::try_from(delta).map_err(|_| ExportError::DeltaTooLarge(delta))?;
    vlq::write(value, buffer).map_err(|_| ExportError::DeltaTooLarge(delta))
}

/// Write MIDI file header chunk
fn write_header<W: Write>(writer: &mut W, ticks_per_quarter_note: u16) -> Result<(), ExportError> {
    // MThd
    writer.write_all(b"MThd")?;
    // Chunk length (always 6)
    writer.write_all(&6u32.to_be_bytes())?;
    // Format 0
    writer.write_all(&0u16.to_be_bytes())?;
    // One track
    writer.write_all(&1u16.to_be_bytes())?;
    // PPQN
    writer.write_all(&ticks_per_quarter_note.to_be_bytes())?;
    Ok(())
}

/// Write a track chunk around already-encoded event data
fn write_track<W: Write>(writer: &mut W, track_data: &[u8]) -> Result<(), ExportError> {
    let length =
        u32::try_from(track_data.len()).map_err(|_| ExportError::TrackTooLong(track_data.len()))?;
    // MTrk
    writer.write_all(b"MTrk")?;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(track_data)?;
    Ok(())
}

/// Download name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("melody-sketch-{}.mid", date.format("%Y-%m-%d"))
}

/// Download name for an export made now, dated in UTC
pub fn default_export_file_name() -> String {
    export_file_name(Utc::now().date_naive())
}

/// MIDI file exporter holding a take and its export settings
#[derive(Debug, Clone, Default)]
pub struct MidiExporter {
    settings: ExportSettings,
    notes: Vec<NoteEvent>,
}

impl MidiExporter {
    /// Create a new exporter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter with the given settings
    pub fn with_settings(settings: ExportSettings) -> Self {
        Self {
            settings,
            notes: Vec::new(),
        }
    }

    /// Get settings
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Set PPQN
    pub fn set_ppqn(&mut self, ppqn: u16) {
        self.settings.ticks_per_quarter_note = ppqn;
    }

    /// Get PPQN
    pub fn ppqn(&self) -> u16 {
        self.settings.ticks_per_quarter_note
    }

    /// Set tempo
    pub fn set_tempo(&mut self, bpm: f64) {
        self.settings.bpm = bpm;
    }

    /// Get tempo
    pub fn tempo(&self) -> f64 {
        self.settings.bpm
    }

    /// Set the invalid-note policy
    pub fn set_policy(&mut self, policy: InvalidNotePolicy) {
        self.settings.invalid_notes = policy;
    }

    /// Add a note
    pub fn add_note(&mut self, note: NoteEvent) {
        self.notes.push(note);
    }

    /// Add several notes
    pub fn add_notes<I: IntoIterator<Item = NoteEvent>>(&mut self, notes: I) {
        self.notes.extend(notes);
    }

    /// Clear notes
    pub fn clear_notes(&mut self) {
        self.notes.clear();
    }

    /// Get notes
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Export to bytes
    pub fn export_to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        encode_with(&self.notes, &self.settings)
    }

    /// Write MIDI data to writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), ExportError> {
        let bytes = self.export_to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Export to file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        // Encode first so a bad take never leaves an empty file behind
        let bytes = self.export_to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }
}
