// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for Melody Sketch
//!
//! These tests drive the public API end to end and read the produced
//! files back with an independent SMF parser.

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tempfile::tempdir;

use melody_sketch::config::{NoteFile, SketchConfig};
use melody_sketch::midi::vlq;
use melody_sketch::recording::{
    encode, encode_with, ExportError, ExportSettings, InvalidNotePolicy, MidiExporter,
    NoteEvent, NoteRecorder,
};

/// (absolute tick, is note-on, key, velocity) for every channel event
fn decoded_events(bytes: &[u8]) -> Vec<(u32, bool, u8, u8)> {
    let smf = Smf::parse(bytes).expect("output should parse as SMF");
    assert_eq!(smf.tracks.len(), 1);

    let mut tick = 0u32;
    let mut events = Vec::new();
    let mut saw_end = false;

    for event in &smf.tracks[0] {
        tick += event.delta.as_int();
        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                assert_eq!(channel.as_int(), 0);
                match message {
                    MidiMessage::NoteOn { key, vel } => {
                        events.push((tick, true, key.as_int(), vel.as_int()))
                    }
                    MidiMessage::NoteOff { key, vel } => {
                        events.push((tick, false, key.as_int(), vel.as_int()))
                    }
                    other => panic!("unexpected message {:?}", other),
                }
            }
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => saw_end = true,
            other => panic!("unexpected event {:?}", other),
        }
    }

    assert!(saw_end, "track must end with end-of-track");
    events
}

fn sample_take() -> Vec<NoteEvent> {
    vec![
        NoteEvent::new(60, 0.0, 500.0).with_velocity(100),
        NoteEvent::new(64, 250.0, 500.0).with_velocity(90),
        NoteEvent::new(67, 500.0, 1000.0),
        NoteEvent::new(72, 500.0, 250.0).with_velocity(0),
        NoteEvent::new(60, 1500.0, 10.0),
        NoteEvent::new(48, 2000.0, 3000.0).with_velocity(127),
    ]
}

#[test]
fn test_header_framing() {
    for ppqn in [1u16, 96, 480, 960, 0x7FFF] {
        let bytes = encode(&sample_take(), ppqn, 120.0).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 6]);
        assert_eq!(&bytes[8..10], &[0, 0]);
        assert_eq!(&bytes[10..12], &[0, 1]);
        assert_eq!(&bytes[12..14], &ppqn.to_be_bytes());
        assert_eq!(&bytes[14..18], b"MTrk");

        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::SingleTrack);
        match smf.header.timing {
            Timing::Metrical(division) => assert_eq!(division.as_int(), ppqn),
            other => panic!("unexpected timing {:?}", other),
        }
    }
}

#[test]
fn test_track_length_consistency() {
    for take in [Vec::new(), sample_take()] {
        let bytes = encode(&take, 96, 120.0).unwrap();
        let length = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        assert_eq!(length, bytes.len() - 22);
        assert_eq!(&bytes[bytes.len() - 4..], &[0x00, 0xFF, 0x2F, 0x00]);
    }
}

#[test]
fn test_empty_take() {
    let bytes = encode(&[], 96, 120.0).unwrap();
    assert_eq!(bytes.len(), 26);
    assert_eq!(&bytes[22..], &[0x00, 0xFF, 0x2F, 0x00]);
    assert!(decoded_events(&bytes).is_empty());
}

#[test]
fn test_single_note_bytes() {
    let notes = [NoteEvent::new(60, 0.0, 500.0).with_velocity(100)];
    let bytes = encode(&notes, 96, 120.0).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(b"MThd");
    expected.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
    expected.extend_from_slice(b"MTrk");
    expected.extend_from_slice(&[0, 0, 0, 12]);
    expected.extend_from_slice(&[0x00, 0x90, 0x3C, 0x64]);
    expected.extend_from_slice(&[0x60, 0x80, 0x3C, 0x00]);
    expected.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    assert_eq!(bytes, expected);
}

#[test]
fn test_order_independence() {
    let mut take = sample_take();
    // Same start and pitch, told apart only by velocity
    take.push(NoteEvent::new(67, 500.0, 1000.0).with_velocity(80));
    take.push(NoteEvent::new(67, 500.0, 1000.0).with_velocity(90));
    let reference = encode(&take, 96, 120.0).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for _ in 0..50 {
        let mut shuffled = take.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(encode(&shuffled, 96, 120.0).unwrap(), reference);
    }
}

#[test]
fn test_overlapping_notes_interleave() {
    let take = sample_take();
    let events = decoded_events(&encode(&take, 96, 120.0).unwrap());

    assert_eq!(events.len(), 2 * take.len());
    assert!(events.windows(2).all(|w| w[0].0 <= w[1].0), "ticks must not go backwards");

    // 64 starts under 60; 60's release shares tick 96 with two new notes
    let first_four: Vec<(u32, bool, u8)> =
        events[..4].iter().map(|&(t, on, k, _)| (t, on, k)).collect();
    assert_eq!(
        first_four,
        vec![(0, true, 60), (48, true, 64), (96, false, 60), (96, true, 67)]
    );

    // Every note-on has a matching later note-off on the same key
    for (i, &(tick, on, key, _)) in events.iter().enumerate() {
        if on {
            assert!(events[i + 1..]
                .iter()
                .any(|&(t, is_on, k, _)| !is_on && k == key && t >= tick));
        }
    }
}

#[test]
fn test_velocities() {
    let events = decoded_events(&encode(&sample_take(), 96, 120.0).unwrap());
    let on_velocity = |key: u8| {
        events
            .iter()
            .find(|&&(_, on, k, _)| on && k == key)
            .map(|&(_, _, _, v)| v)
    };

    assert_eq!(on_velocity(64), Some(90));
    assert_eq!(on_velocity(67), Some(100)); // absent
    assert_eq!(on_velocity(72), Some(100)); // zero
    assert_eq!(on_velocity(48), Some(127));
    assert!(events.iter().filter(|e| !e.1).all(|e| e.3 == 0));
}

#[test]
fn test_large_delta() {
    // 1000 PPQN at 60 BPM: one tick per millisecond
    let notes = [
        NoteEvent::new(60, 0.0, 100.0),
        NoteEvent::new(62, 2_097_252.0, 100.0),
    ];
    let bytes = encode(&notes, 1000, 60.0).unwrap();

    // on, off at 100, then a gap of 2_097_152 ticks
    let gap = &bytes[22 + 8..22 + 12];
    assert_eq!(gap, vlq::encode(2_097_152).unwrap().as_slice());
    assert_eq!(gap, &[0x81, 0x80, 0x80, 0x00]);

    let events = decoded_events(&bytes);
    assert_eq!(events[2], (2_097_252, true, 62, 100));
}

#[test]
fn test_delta_beyond_smf_limit() {
    let notes = [NoteEvent::new(60, 300_000_000.0, 100.0)];
    assert!(matches!(
        encode(&notes, 1000, 60.0),
        Err(ExportError::DeltaTooLarge(300_000_000))
    ));
}

#[test]
fn test_invalid_configuration() {
    assert!(matches!(encode(&[], 0, 120.0), Err(ExportError::InvalidDivision(0))));
    assert!(matches!(encode(&[], 96, 0.0), Err(ExportError::InvalidTempo(_))));
    assert!(matches!(encode(&[], 96, f64::INFINITY), Err(ExportError::InvalidTempo(_))));
}

#[test]
fn test_invalid_note_reject_and_skip() {
    let mut take = sample_take();
    take.insert(2, NoteEvent::new(65, 100.0, -5.0));

    let err = encode(&take, 96, 120.0).unwrap_err();
    assert_eq!(err.to_string(), "note 2: duration -5 ms is not a finite, positive number");

    let settings = ExportSettings::default().with_policy(InvalidNotePolicy::Skip);
    assert_eq!(
        encode_with(&take, &settings).unwrap(),
        encode(&sample_take(), 96, 120.0).unwrap()
    );
}

#[test]
fn test_record_then_export() {
    let mut recorder = NoteRecorder::new();
    recorder.start(10_000.0);
    recorder.key_down(60, 10_000.0);
    recorder.key_down(64, 10_250.0);
    recorder.key_up(60, 10_500.0);
    recorder.key_down(67, 10_600.0);
    recorder.key_up(67, 10_630.0); // too short, dropped
    recorder.stop(11_000.0);

    let notes = recorder.take_notes();
    assert_eq!(notes.len(), 2);

    let events = decoded_events(&encode(&notes, 96, 120.0).unwrap());
    assert_eq!(
        events,
        vec![
            (0, true, 60, 100),
            (48, true, 64, 100),
            (96, false, 60, 0),
            (192, false, 64, 0),
        ]
    );
}

#[test]
fn test_export_to_file() {
    let dir = tempdir().unwrap();
    let notes_path = dir.path().join("take.yaml");
    let midi_path = dir.path().join("take.mid");

    NoteFile {
        notes: sample_take(),
    }
    .save(&notes_path)
    .unwrap();

    let config = SketchConfig::from_yaml("export:\n  bpm: 90\n  ticks_per_quarter_note: 480\n").unwrap();
    let mut exporter = MidiExporter::with_settings(config.export_settings());
    exporter.add_notes(NoteFile::load(&notes_path).unwrap().notes);
    exporter.export(&midi_path).unwrap();

    let written = std::fs::read(&midi_path).unwrap();
    assert_eq!(written, encode(&sample_take(), 480, 90.0).unwrap());
}

#[test]
fn test_failed_export_leaves_no_file() {
    let dir = tempdir().unwrap();
    let midi_path = dir.path().join("bad.mid");

    let mut exporter = MidiExporter::new();
    exporter.add_note(NoteEvent::new(200, 0.0, 100.0));
    assert!(exporter.export(&midi_path).is_err());
    assert!(!midi_path.exists());
}

#[test]
fn test_concurrent_encoding() {
    let take = sample_take();
    let reference = encode(&take, 96, 120.0).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| encode(&take, 96, 120.0).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    });
}
