// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI wire-level building blocks.
//!
//! This module holds the status bytes and meta-event codes the file
//! encoder emits, plus the variable-length quantity codec used for
//! delta times.

pub mod vlq;

pub use vlq::VlqError;

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;

    /// Largest value a data byte may carry (high bit clear)
    pub const MAX_DATA_BYTE: u8 = 0x7F;

    // Meta events (file-only, never sent on the wire)
    pub const META: u8 = 0xFF;
    pub const END_OF_TRACK: u8 = 0x2F;
}

/// Build a three-byte channel voice message.
///
/// Channel and data bytes are masked so the result is always well-formed.
pub fn channel_message(status: u8, channel: u8, data1: u8, data2: u8) -> [u8; 3] {
    [
        status | (channel & 0x0F),
        data1 & messages::MAX_DATA_BYTE,
        data2 & messages::MAX_DATA_BYTE,
    ]
}
