// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale and key tables for the keyboard.
//!
//! Keys are anchored in the octave starting at C3 (MIDI 48); scales are
//! interval sets from the root. Together they decide which pitches the
//! keyboard highlights.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Highest MIDI note
pub const MAX_MIDI_NOTE: MidiNote = 127;

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        self as u8
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Parse note from string (e.g., "C", "C#", "Db", "F#")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" => Some(Note::C),
            "C#" | "CS" | "DB" => Some(Note::Cs),
            "D" => Some(Note::D),
            "D#" | "DS" | "EB" => Some(Note::Ds),
            "E" | "FB" => Some(Note::E),
            "F" | "E#" | "ES" => Some(Note::F),
            "F#" | "FS" | "GB" => Some(Note::Fs),
            "G" => Some(Note::G),
            "G#" | "GS" | "AB" => Some(Note::Gs),
            "A" => Some(Note::A),
            "A#" | "AS" | "BB" => Some(Note::As),
            "B" | "CB" => Some(Note::B),
            _ => None,
        }
    }

    /// Sharp spelling
    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name and octave of a MIDI note, e.g. 60 -> "C4"
pub fn note_name(pitch: MidiNote) -> String {
    let octave = i32::from(pitch / 12) - 1;
    format!("{}{}", Note::from_pitch_class(pitch % 12), octave)
}

/// Scale types offered by the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    NaturalMinor, // Aeolian
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    WholeTone,
    Diminished, // Half-whole
    LydianDominant,
    Chromatic,
}

impl ScaleType {
    /// Every scale, in menu order
    pub const ALL: [ScaleType; 16] = [
        ScaleType::Major,
        ScaleType::NaturalMinor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::Locrian,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::WholeTone,
        ScaleType::Diminished,
        ScaleType::LydianDominant,
        ScaleType::Chromatic,
    ];

    /// Get the intervals (semitones from root) for this scale type
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::WholeTone => &[0, 2, 4, 6, 8, 10],
            ScaleType::Diminished => &[0, 1, 3, 4, 6, 7, 9, 10],
            ScaleType::LydianDominant => &[0, 2, 4, 6, 7, 9, 10],
            ScaleType::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    /// Parse scale type from string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s
            .trim()
            .to_lowercase()
            .replace([' ', '-', '_', '(', ')'], "");
        match s.as_str() {
            "major" | "ionian" => Some(ScaleType::Major),
            "minor" | "naturalminor" | "minornatural" | "aeolian" => Some(ScaleType::NaturalMinor),
            "harmonicminor" | "minorharmonic" => Some(ScaleType::HarmonicMinor),
            "melodicminor" | "minormelodic" => Some(ScaleType::MelodicMinor),
            "dorian" => Some(ScaleType::Dorian),
            "phrygian" => Some(ScaleType::Phrygian),
            "lydian" => Some(ScaleType::Lydian),
            "mixolydian" => Some(ScaleType::Mixolydian),
            "locrian" => Some(ScaleType::Locrian),
            "majorpentatonic" | "pentatonicmajor" => Some(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" => Some(ScaleType::MinorPentatonic),
            "blues" => Some(ScaleType::Blues),
            "wholetone" => Some(ScaleType::WholeTone),
            "diminished" | "diminishedhalfwhole" | "halfwhole" => Some(ScaleType::Diminished),
            "lydiandominant" => Some(ScaleType::LydianDominant),
            "chromatic" => Some(ScaleType::Chromatic),
            _ => None,
        }
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::NaturalMinor => "Minor (Natural)",
            ScaleType::HarmonicMinor => "Minor (Harmonic)",
            ScaleType::MelodicMinor => "Minor (Melodic)",
            ScaleType::Dorian => "Dorian",
            ScaleType::Phrygian => "Phrygian",
            ScaleType::Lydian => "Lydian",
            ScaleType::Mixolydian => "Mixolydian",
            ScaleType::Locrian => "Locrian",
            ScaleType::MajorPentatonic => "Pentatonic Major",
            ScaleType::MinorPentatonic => "Pentatonic Minor",
            ScaleType::Blues => "Blues",
            ScaleType::WholeTone => "Whole Tone",
            ScaleType::Diminished => "Diminished (Half-Whole)",
            ScaleType::LydianDominant => "Lydian Dominant",
            ScaleType::Chromatic => "Chromatic",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key as offered on the keyboard, rooted in the C3 octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    root: Note,
}

impl Key {
    /// Every key, chromatic from C
    pub const ALL: [Key; 12] = [
        Key::new(Note::C),
        Key::new(Note::Cs),
        Key::new(Note::D),
        Key::new(Note::Ds),
        Key::new(Note::E),
        Key::new(Note::F),
        Key::new(Note::Fs),
        Key::new(Note::G),
        Key::new(Note::Gs),
        Key::new(Note::A),
        Key::new(Note::As),
        Key::new(Note::B),
    ];

    /// MIDI note of C3
    const BASE_MIDI_NOTE: MidiNote = 48;

    /// Create a key from its root
    pub const fn new(root: Note) -> Self {
        Self { root }
    }

    /// Parse a key name (e.g., "F#", "Bb")
    pub fn parse(s: &str) -> Option<Self> {
        Note::parse(s).map(Key::new)
    }

    /// Get the root note
    pub fn root(&self) -> Note {
        self.root
    }

    /// Root as a MIDI note in the C3 octave (48-59)
    pub fn root_midi_note(&self) -> MidiNote {
        Self::BASE_MIDI_NOTE + self.root.pitch_class()
    }

    /// Menu label, with the flat spelling for black keys
    pub fn name(&self) -> &'static str {
        match self.root {
            Note::C => "C",
            Note::Cs => "C# / Db",
            Note::D => "D",
            Note::Ds => "D# / Eb",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F# / Gb",
            Note::G => "G",
            Note::Gs => "G# / Ab",
            Note::A => "A",
            Note::As => "A# / Bb",
            Note::B => "B",
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::new(Note::C)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every MIDI note in `scale` for `key`, ascending and without duplicates
pub fn notes_in_scale_for_key(key: Key, scale: ScaleType) -> Vec<MidiNote> {
    let root = u16::from(key.root_midi_note() % 12);
    let mut notes: Vec<MidiNote> = (0..10u16)
        .flat_map(|octave| {
            scale
                .intervals()
                .iter()
                .map(move |&interval| root + u16::from(interval) + octave * 12)
        })
        .filter(|&note| note <= u16::from(MAX_MIDI_NOTE))
        .map(|note| note as MidiNote)
        .collect();
    notes.sort_unstable();
    notes.dedup();
    notes
}
