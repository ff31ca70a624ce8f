#![cfg(not(tarpaulin_include))]

use std::path::{Path, PathBuf};

use atelier::animation::{ScrollEvent, Recorder, load_trace, replay_schedule, save_trace};
use clap::Parser;

/// Print the replay schedule of a recorded scroll trace
#[derive(Debug, Parser)]
#[command(name = "trace-replay", version)]
struct Args {
    /// Trace to read: a `.json` export or a `.bin.gz` archive
    trace: PathBuf,

    /// Playback speed multiplier
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Only replay these sections (repeatable)
    #[arg(long = "section")]
    sections: Vec<String>,

    /// Also write the trace as a `.bin.gz` archive
    #[arg(long)]
    archive: Option<PathBuf>,
}

fn read_trace(path: &Path) -> atelier::Result<Vec<ScrollEvent>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let mut recorder = Recorder::new();
        let json = std::fs::read_to_string(path)?;
        Ok(recorder.import_json(&json)?.to_vec())
    } else {
        load_trace(path)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let events = read_trace(&args.trace)?;
    println!("Loaded {} events from {}", events.len(), args.trace.display());

    if let Some(archive) = &args.archive {
        save_trace(&events, archive)?;
        println!("Archived trace to {}", archive.display());
    }

    let known = |id: &str| args.sections.is_empty() || args.sections.iter().any(|s| s == id);
    let Some(schedule) = replay_schedule(&events, args.speed, known) else {
        return Ok(());
    };

    println!("{:>10}  {:>10}  {:>8}  section", "at (s)", "for (s)", "progress");
    for step in &schedule.steps {
        println!(
            "{:>10.3}  {:>10.3}  {:>8.3}  {}",
            step.at, step.duration, step.progress, step.section_id
        );
    }
    println!(
        "{} steps, {:.3}s total",
        schedule.steps.len(),
        schedule.duration()
    );

    Ok(())
}
