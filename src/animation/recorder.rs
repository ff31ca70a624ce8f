//! Recording scroll-driven animation progress and replaying it later.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use bincode::Options;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Seconds each replayed scrub takes at 1x speed
pub const REPLAY_STEP_DURATION: f64 = 0.1;

/// One observation of a section while recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEvent {
    /// Milliseconds since recording started
    pub timestamp: f64,
    pub scroll_y: f64,
    pub section_id: String,
    pub animation_progress: f64,
    pub visibility: f64,
}

#[derive(Debug, Default)]
pub struct Recorder {
    events: Vec<ScrollEvent>,
    recording: bool,
    started_at: f64,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh recording; `now` is the clock in milliseconds
    pub fn start(&mut self, now: f64) {
        self.recording = true;
        self.started_at = now;
        self.events.clear();
        log::info!("started recording scroll animations");
    }

    pub fn stop(&mut self) -> Vec<ScrollEvent> {
        self.recording = false;
        log::info!("stopped recording, captured {} events", self.events.len());
        self.events.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Append an event; ignored unless recording
    pub fn record(
        &mut self,
        now: f64,
        section_id: &str,
        scroll_y: f64,
        animation_progress: f64,
        visibility: f64,
    ) {
        if !self.recording {
            return;
        }
        self.events.push(ScrollEvent {
            timestamp: now - self.started_at,
            scroll_y,
            section_id: section_id.to_string(),
            animation_progress,
            visibility,
        });
    }

    pub fn events(&self) -> &[ScrollEvent] {
        &self.events
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    /// Replace the recorded events with the ones in `json`
    pub fn import_json(&mut self, json: &str) -> Result<&[ScrollEvent]> {
        let events: Vec<ScrollEvent> = serde_json::from_str(json).inspect_err(|e| {
            log::error!("failed to import events: {}", e);
        })?;
        self.events = events;
        Ok(&self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.recording = false;
    }
}

/// One scrub of a section's timeline towards a recorded progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep {
    pub section_id: String,
    pub progress: f64,
    /// Seconds from the start of the replay
    pub at: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySchedule {
    pub steps: Vec<ReplayStep>,
}

impl ReplaySchedule {
    /// Seconds until the last step finishes
    pub fn duration(&self) -> f64 {
        self.steps
            .iter()
            .map(|s| s.at + s.duration)
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Progress of `section_id` at replay time `t`, starting from `initial`.
    ///
    /// `None` until the section's first step begins.
    pub fn progress_at(&self, section_id: &str, t: f64, initial: f64) -> Option<f64> {
        let mut current = initial;
        let mut reached = None;
        let mut steps: Vec<&ReplayStep> = self
            .steps
            .iter()
            .filter(|s| s.section_id == section_id)
            .collect();
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));

        for step in steps {
            if step.at > t {
                break;
            }
            let fraction = if step.duration > 0.0 {
                ((t - step.at) / step.duration).min(1.0)
            } else {
                1.0
            };
            let value = current + (step.progress - current) * fraction;
            reached = Some(value);
            current = value;
        }
        reached
    }

    /// Sections the schedule touches
    pub fn sections(&self) -> HashSet<&str> {
        self.steps.iter().map(|s| s.section_id.as_str()).collect()
    }
}

/// Build the scrubs that replay `events` at `speed`, skipping sections
/// `known` rejects. Returns `None` when there is nothing to replay.
pub fn replay_schedule<F>(events: &[ScrollEvent], speed: f64, known: F) -> Option<ReplaySchedule>
where
    F: Fn(&str) -> bool,
{
    if events.is_empty() {
        log::warn!("no events to replay");
        return None;
    }
    let speed = if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        log::warn!("invalid replay speed {}, using 1x", speed);
        1.0
    };
    log::info!("replaying {} events at {}x speed", events.len(), speed);

    let steps = events
        .iter()
        .filter(|e| known(&e.section_id))
        .map(|e| ReplayStep {
            section_id: e.section_id.clone(),
            progress: e.animation_progress,
            at: e.timestamp / 1000.0 / speed,
            duration: REPLAY_STEP_DURATION / speed,
        })
        .collect();
    Some(ReplaySchedule { steps })
}

/// Largest decoded archive accepted by [`load_trace`]
pub const MAX_TRACE_BYTES: u64 = 64 * 1024 * 1024;

fn archive_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_TRACE_BYTES)
}

/// Write a trace as gzip-compressed bincode
pub fn save_trace(events: &[ScrollEvent], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);
    archive_options().serialize_into(&mut writer, events)?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .finish()?;
    Ok(())
}

/// Read a trace written by [`save_trace`]. Corrupt length prefixes are
/// rejected once they exceed [`MAX_TRACE_BYTES`].
pub fn load_trace(path: &Path) -> Result<Vec<ScrollEvent>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(GzDecoder::new(file));
    Ok(archive_options().deserialize_from(&mut reader)?)
}
