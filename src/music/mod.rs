// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory tables for the keyboard.

pub mod scale;

pub use scale::{note_name, notes_in_scale_for_key, Key, MidiNote, Note, ScaleType};
