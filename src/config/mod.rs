// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration and take files.
//!
//! This module provides the YAML documents the command line reads:
//! export settings plus the keyboard's key and scale, and recorded takes
//! as lists of notes. JSON is a subset of YAML, so takes saved by the
//! browser app load unchanged.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::{Key, ScaleType};
use crate::recording::export::{
    ExportSettings, InvalidNotePolicy, DEFAULT_BPM, DEFAULT_TICKS_PER_QUARTER_NOTE,
};
use crate::recording::NoteEvent;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SketchConfig {
    /// MIDI export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Keyboard key (e.g., "C", "F#")
    #[serde(default = "default_key")]
    pub key: String,
    /// Keyboard scale (e.g., "major", "Minor (Natural)")
    #[serde(default = "default_scale")]
    pub scale: String,
}

fn default_key() -> String {
    "C".to_string()
}
fn default_scale() -> String {
    "Major".to_string()
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            key: default_key(),
            scale: default_scale(),
        }
    }
}

impl SketchConfig {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Encoder settings from the export section
    pub fn export_settings(&self) -> ExportSettings {
        self.export.settings()
    }

    /// Resolve the configured key
    pub fn key(&self) -> Result<Key> {
        Key::parse(&self.key).ok_or_else(|| anyhow!("Unknown key: {}", self.key))
    }

    /// Resolve the configured scale
    pub fn scale(&self) -> Result<ScaleType> {
        ScaleType::parse(&self.scale).ok_or_else(|| anyhow!("Unknown scale: {}", self.scale))
    }

    /// Resolve a key and scale, falling back to the configured ones
    pub fn key_and_scale(
        &self,
        key: Option<&str>,
        scale: Option<&str>,
    ) -> Result<(Key, ScaleType)> {
        let key = match key {
            Some(name) => Key::parse(name).ok_or_else(|| anyhow!("Unknown key: {}", name))?,
            None => self.key()?,
        };
        let scale = match scale {
            Some(name) => {
                ScaleType::parse(name).ok_or_else(|| anyhow!("Unknown scale: {}", name))?
            }
            None => self.scale()?,
        };
        Ok((key, scale))
    }
}

/// Export section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Tempo in BPM
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Header division
    #[serde(default = "default_ticks_per_quarter_note")]
    pub ticks_per_quarter_note: u16,
    /// Drop malformed notes instead of failing the export
    #[serde(default)]
    pub skip_invalid_notes: bool,
}

fn default_bpm() -> f64 {
    DEFAULT_BPM
}
fn default_ticks_per_quarter_note() -> u16 {
    DEFAULT_TICKS_PER_QUARTER_NOTE
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            ticks_per_quarter_note: default_ticks_per_quarter_note(),
            skip_invalid_notes: false,
        }
    }
}

impl ExportConfig {
    /// Encoder settings for this section
    pub fn settings(&self) -> ExportSettings {
        let policy = if self.skip_invalid_notes {
            InvalidNotePolicy::Skip
        } else {
            InvalidNotePolicy::Reject
        };
        ExportSettings::new(self.ticks_per_quarter_note, self.bpm).with_policy(policy)
    }
}

/// A recorded take on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct NoteFile {
    pub notes: Vec<NoteEvent>,
}

impl NoteFile {
    /// Load a take from a YAML or JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read notes file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a take; accepts either `notes: [...]` or a bare list
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Wrapped(NoteFile),
            Bare(Vec<NoteEvent>),
        }

        let document: Document =
            serde_yaml::from_str(yaml).context("Failed to parse notes file")?;
        Ok(match document {
            Document::Wrapped(file) => file,
            Document::Bare(notes) => NoteFile { notes },
        })
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize notes to YAML")
    }

    /// Save the take to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write notes file: {:?}", path.as_ref()))
    }
}
