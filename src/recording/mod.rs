// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recording and export system.
//!
//! This module provides:
//! - Note capture from timestamped key presses
//! - Grid quantization of edited takes
//! - Standard MIDI file export

pub mod capture;
pub mod export;
pub mod note;
pub mod quantize;

pub use capture::{NoteRecorder, RecordingState};
pub use export::{
    encode, encode_with, schedule, EventKind, ExportError, ExportSettings, InvalidNotePolicy,
    MidiExporter, TimedMidiEvent,
};
pub use note::{NoteError, NoteEvent};
pub use quantize::QuantizeGrid;
