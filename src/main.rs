// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use melody_sketch::config::{NoteFile, SketchConfig};
use melody_sketch::music::{note_name, notes_in_scale_for_key};
use melody_sketch::recording::export::{default_export_file_name, MidiExporter, MIME_TYPE};
use melody_sketch::recording::InvalidNotePolicy;

fn print_usage() {
    println!("Melody Sketch - keyboard takes to MIDI files");
    println!();
    println!("Usage: melody-sketch <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  export <NOTES>          Export a YAML/JSON take as a MIDI file");
    println!("    --out <PATH>          Output file (default melody-sketch-<date>.mid)");
    println!("    --bpm <N>             Tempo used to convert milliseconds (default 120)");
    println!("    --ppqn <N>            Ticks per quarter note (default 96)");
    println!("    --config <PATH>       Read defaults from a YAML config file");
    println!("    --skip-invalid        Drop malformed notes instead of failing");
    println!("  scale [KEY] [SCALE]     List the MIDI notes of a scale");
    println!("    --config <PATH>       Take the default key and scale from a config file");
    println!("  --help                  Show this help message");
}

/// Options for the export command
struct ExportArgs {
    notes: PathBuf,
    out: Option<PathBuf>,
    bpm: Option<f64>,
    ppqn: Option<u16>,
    config: Option<PathBuf>,
    skip_invalid: bool,
}

fn parse_export_args(args: &[String]) -> Result<ExportArgs> {
    let mut parsed = ExportArgs {
        notes: PathBuf::new(),
        out: None,
        bpm: None,
        ppqn: None,
        config: None,
        skip_invalid: false,
    };
    let mut notes = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", name))
        };
        match arg.as_str() {
            "--out" | "-o" => parsed.out = Some(PathBuf::from(value("--out")?)),
            "--bpm" => {
                let raw = value("--bpm")?;
                parsed.bpm = Some(raw.parse().map_err(|_| anyhow!("Invalid BPM: {}", raw))?);
            }
            "--ppqn" => {
                let raw = value("--ppqn")?;
                parsed.ppqn = Some(raw.parse().map_err(|_| anyhow!("Invalid PPQN: {}", raw))?);
            }
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--skip-invalid" => parsed.skip_invalid = true,
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            other => {
                if notes.is_some() {
                    bail!("Unexpected argument: {}", other);
                }
                notes = Some(PathBuf::from(other));
            }
        }
    }

    parsed.notes = notes.ok_or_else(|| anyhow!("export requires a notes file"))?;
    Ok(parsed)
}

fn export(args: &[String]) -> Result<()> {
    let args = parse_export_args(args)?;

    let config = match &args.config {
        Some(path) => SketchConfig::load(path)?,
        None => SketchConfig::default(),
    };

    let mut exporter = MidiExporter::with_settings(config.export_settings());
    if let Some(bpm) = args.bpm {
        exporter.set_tempo(bpm);
    }
    if let Some(ppqn) = args.ppqn {
        exporter.set_ppqn(ppqn);
    }
    if args.skip_invalid {
        exporter.set_policy(InvalidNotePolicy::Skip);
    }

    let take = NoteFile::load(&args.notes)?;
    info!(notes = take.notes.len(), path = ?args.notes, "loaded take");
    exporter.add_notes(take.notes);

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(default_export_file_name()));
    exporter
        .export(&out)
        .with_context(|| format!("Failed to export {:?}", out))?;

    println!(
        "Wrote {} notes to {} ({})",
        exporter.notes().len(),
        out.display(),
        MIME_TYPE
    );
    Ok(())
}

fn list_scale(args: &[String]) -> Result<()> {
    let mut config_path = None;
    let mut names: Vec<&str> = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config requires a value"))?;
                config_path = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            other => names.push(other),
        }
    }
    if names.len() > 2 {
        bail!("scale takes at most <KEY> <SCALE>");
    }

    let config = match &config_path {
        Some(path) => SketchConfig::load(path)?,
        None => SketchConfig::default(),
    };
    let (key, scale) = config.key_and_scale(names.first().copied(), names.get(1).copied())?;

    println!("{} {}", key, scale);
    for pitch in notes_in_scale_for_key(key, scale) {
        println!("  {:>3}  {}", pitch, note_name(pitch));
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Melody Sketch - keyboard takes to MIDI files");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "export" => export(&args[2..])?,
        "scale" => list_scale(&args[2..])?,
        "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
