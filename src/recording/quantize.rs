// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Grid snapping for edited takes.
//!
//! Works in milliseconds, before export, so a quantized take still
//! plays back at the tempo it was snapped against.

use super::note::NoteEvent;

/// Quantization grid, in divisions of a whole note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeGrid {
    /// 16 = sixteenth notes, 8 = eighth notes, 4 = quarter notes
    pub resolution: u32,
}

impl QuantizeGrid {
    /// Create a grid (0 disables snapping)
    pub fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    /// Create with sixteenth note grid
    pub fn sixteenth() -> Self {
        Self::new(16)
    }

    /// Create with eighth note grid
    pub fn eighth() -> Self {
        Self::new(8)
    }

    /// Length of one grid step in milliseconds
    pub fn step_ms(&self, bpm: f64) -> f64 {
        let ms_per_beat = 60_000.0 / bpm;
        let steps_per_beat = f64::from(self.resolution) / 4.0;
        ms_per_beat / steps_per_beat
    }

    /// Snap a millisecond value to the nearest grid line, never below zero
    pub fn quantize_ms(&self, value_ms: f64, bpm: f64) -> f64 {
        if self.resolution == 0 || bpm.is_nan() || bpm <= 0.0 {
            return value_ms;
        }
        let step = self.step_ms(bpm);
        ((value_ms / step).round() * step).max(0.0)
    }

    /// Snap note start times; durations are left alone
    pub fn quantize_notes(&self, notes: &mut [NoteEvent], bpm: f64) {
        for note in notes.iter_mut() {
            note.start_time = self.quantize_ms(note.start_time, bpm);
        }
    }
}
