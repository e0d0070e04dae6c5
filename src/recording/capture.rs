// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance capture from key presses.
//!
//! The recorder never reads a clock itself. Callers pass a millisecond
//! timestamp with every key event, which keeps a take reproducible and
//! lets the same recorder sit behind a browser, a TUI or a test.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::note::{NoteEvent, DEFAULT_VELOCITY};

/// Presses shorter than this are treated as accidental and dropped
pub const MIN_NOTE_DURATION_MS: f64 = 50.0;

/// Recording state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording,
}

/// Records key presses into [`NoteEvent`]s
#[derive(Debug, Default)]
pub struct NoteRecorder {
    state: RecordingState,
    /// Timestamp `start` was called with
    origin_ms: f64,
    /// Held pitch -> start offset in ms
    held: HashMap<u8, f64>,
    /// Completed notes, sorted by start time
    notes: Vec<NoteEvent>,
}

impl NoteRecorder {
    /// Create a new idle recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Get recorded notes
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Take recorded notes (clears internal buffer)
    pub fn take_notes(&mut self) -> Vec<NoteEvent> {
        std::mem::take(&mut self.notes)
    }

    /// Clear recorded notes
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Number of keys currently held down
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Start a new take at `now_ms`, discarding the previous one
    pub fn start(&mut self, now_ms: f64) {
        self.notes.clear();
        self.held.clear();
        self.origin_ms = now_ms;
        self.state = RecordingState::Recording;
        debug!(now_ms, "recording started");
    }

    /// Stop recording, closing any keys still held at `now_ms`
    pub fn stop(&mut self, now_ms: f64) {
        if self.state != RecordingState::Recording {
            return;
        }

        let offset = now_ms - self.origin_ms;
        // Drain in pitch order so the closing batch is reproducible
        let mut held: Vec<(u8, f64)> = self.held.drain().collect();
        held.sort_by_key(|&(pitch, _)| pitch);
        for (pitch, start_time) in held {
            self.push_note(pitch, start_time, offset - start_time);
        }

        self.state = RecordingState::Idle;
        debug!(notes = self.notes.len(), "recording stopped");
    }

    /// Key pressed at `now_ms`
    pub fn key_down(&mut self, pitch: u8, now_ms: f64) {
        if !self.is_recording() {
            return;
        }
        // A second press of a held key keeps the original start
        self.held.entry(pitch).or_insert(now_ms - self.origin_ms);
    }

    /// Key released at `now_ms`
    pub fn key_up(&mut self, pitch: u8, now_ms: f64) {
        if !self.is_recording() {
            return;
        }
        if let Some(start_time) = self.held.remove(&pitch) {
            let duration = now_ms - self.origin_ms - start_time;
            self.push_note(pitch, start_time, duration);
        }
    }

    fn push_note(&mut self, pitch: u8, start_time: f64, duration: f64) {
        if duration <= MIN_NOTE_DURATION_MS {
            trace!(pitch, duration, "dropping short press");
            return;
        }

        let note = NoteEvent::new(pitch, start_time, duration).with_velocity(DEFAULT_VELOCITY);
        // Insert after any note with an equal start to keep arrival order
        let at = self.notes.partition_point(|n| n.start_time <= start_time);
        self.notes.insert(at, note);
    }
}
