// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recorded note events.
//!
//! A [`NoteEvent`] is one key press on the timeline, measured in
//! milliseconds from the start of the take.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::midi::messages::MAX_DATA_BYTE;

/// Velocity used when a note carries none (or zero)
pub const DEFAULT_VELOCITY: u8 = 100;

/// Which note field failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoteError {
    #[error("pitch {0} is outside 0-127")]
    PitchOutOfRange(u8),
    #[error("velocity {0} is outside 0-127")]
    VelocityOutOfRange(u8),
    #[error("start time {0} ms is not a finite, non-negative number")]
    InvalidStartTime(f64),
    #[error("duration {0} ms is not a finite, positive number")]
    InvalidDuration(f64),
}

/// A single note on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// Start offset in milliseconds
    pub start_time: f64,
    /// Length in milliseconds
    pub duration: f64,
    /// Velocity (0-127); `None` and `Some(0)` both mean [`DEFAULT_VELOCITY`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<u8>,
}

impl NoteEvent {
    /// Create a note with the default velocity
    pub fn new(pitch: u8, start_time: f64, duration: f64) -> Self {
        Self {
            pitch,
            start_time,
            duration,
            velocity: None,
        }
    }

    /// Set an explicit velocity
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Velocity written to the file.
    ///
    /// Zero is treated the same as absent: a note-on with velocity zero
    /// would read back as a note-off.
    pub fn effective_velocity(&self) -> u8 {
        match self.velocity {
            Some(v) if v > 0 => v,
            _ => DEFAULT_VELOCITY,
        }
    }

    /// Release point in milliseconds
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Check every field against the ranges the encoder accepts
    pub fn validate(&self) -> Result<(), NoteError> {
        if self.pitch > MAX_DATA_BYTE {
            return Err(NoteError::PitchOutOfRange(self.pitch));
        }
        if let Some(v) = self.velocity {
            if v > MAX_DATA_BYTE {
                return Err(NoteError::VelocityOutOfRange(v));
            }
        }
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(NoteError::InvalidStartTime(self.start_time));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(NoteError::InvalidDuration(self.duration));
        }
        Ok(())
    }
}
