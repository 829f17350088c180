use std::io::{self, Write};

use serde::Serialize;

use crate::app::IngestResult;
use crate::domain::DataPoint;
use crate::series::TimeSeries;
use crate::store::UpsertOutcome;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertResult {
    pub region: String,
    pub year: i32,
    pub month: String,
    pub value_type: String,
    pub value: f64,
    pub action: String,
}

impl UpsertResult {
    pub fn new(point: &DataPoint, outcome: UpsertOutcome) -> Self {
        Self {
            region: point.region.key().to_string(),
            year: point.year,
            month: point.month.abbrev().to_string(),
            value_type: point.value_type.key().to_string(),
            value: point.value,
            action: match outcome {
                UpsertOutcome::Created => "created".to_string(),
                UpsertOutcome::Updated => "updated".to_string(),
            },
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_ingest(result: &IngestResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_series(series: &TimeSeries) -> io::Result<()> {
        Self::print_json(series)
    }

    pub fn print_points(points: &[DataPoint]) -> io::Result<()> {
        Self::print_json(&points)
    }

    pub fn print_upsert(result: &UpsertResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

/// Writes progress events to stderr for interactive runs.
pub struct StderrProgress;

impl crate::app::ProgressSink for StderrProgress {
    fn event(&self, event: crate::app::ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}
