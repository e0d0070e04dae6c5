// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melody Sketch: record a melody on a virtual keyboard and export it as
//! a Standard MIDI File.
//!
//! The heart of the crate is [`recording::export`], which turns a list
//! of millisecond-timed [`NoteEvent`]s into a byte-exact format 0 file.

pub mod config;
pub mod midi;
pub mod music;
pub mod recording;

pub use recording::{encode, encode_with, ExportError, ExportSettings, NoteEvent};
