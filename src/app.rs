use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Region, ValueType};
use crate::error::MetError;
use crate::metoffice::ReportClient;
use crate::reconcile;
use crate::report;
use crate::series::{self, TimeSeries};
use crate::store::{DataStore, UpsertOutcome};

pub const SUCCESS_MESSAGE: &str = "Successfully got Met Office data.";

#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub started_at: String,
    pub finished_at: String,
    pub items: Vec<IngestItemResult>,
    pub failures: Vec<IngestFailure>,
}

impl IngestResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary_message(&self) -> String {
        if self.is_success() {
            return SUCCESS_MESSAGE.to_string();
        }
        format!(
            "Met Office ingestion finished with {} of {} reports failing.",
            self.failures.len(),
            self.failures.len() + self.items.len()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestItemResult {
    pub region: String,
    pub value_type: String,
    pub points: usize,
    pub created: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub region: String,
    pub value_type: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: ReportClient, S: DataStore> {
    client: C,
    store: S,
}

impl<C: ReportClient, S: DataStore> App<C, S> {
    pub fn new(client: C, store: S) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches, parses and stores every requested report.
    ///
    /// A failing pair is recorded and skipped; the remaining pairs still run.
    pub fn ingest(
        &mut self,
        targets: &[(Region, ValueType)],
        sink: &dyn ProgressSink,
    ) -> IngestResult {
        let started_at = chrono::Utc::now().to_rfc3339();
        let mut items = Vec::new();
        let mut failures = Vec::new();

        for &(region, value_type) in targets {
            match self.ingest_one(region, value_type, sink) {
                Ok(item) => {
                    info!(
                        region = region.key(),
                        value_type = value_type.key(),
                        points = item.points,
                        created = item.created,
                        updated = item.updated,
                        "ingested report"
                    );
                    items.push(item);
                }
                Err(err) => {
                    warn!(
                        region = region.key(),
                        value_type = value_type.key(),
                        error = %err,
                        "report ingestion failed"
                    );
                    sink.event(ProgressEvent {
                        message: format!("phase=Failed; {} {}: {err}", region, value_type),
                        elapsed: None,
                    });
                    failures.push(IngestFailure {
                        region: region.key().to_string(),
                        value_type: value_type.key().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        IngestResult {
            started_at,
            finished_at: chrono::Utc::now().to_rfc3339(),
            items,
            failures,
        }
    }

    pub fn ingest_one(
        &mut self,
        region: Region,
        value_type: ValueType,
        sink: &dyn ProgressSink,
    ) -> Result<IngestItemResult, MetError> {
        sink.event(ProgressEvent {
            message: format!("phase=Fetch; {} {}", region, value_type),
            elapsed: None,
        });
        let start = Instant::now();
        let raw = self.client.fetch_report(region, value_type)?;
        sink.event(ProgressEvent {
            message: "metoffice.response".to_string(),
            elapsed: Some(start.elapsed()),
        });

        sink.event(ProgressEvent {
            message: "phase=Parse; reading report".to_string(),
            elapsed: None,
        });
        let points = report::parse_report(&raw, region, value_type)?;

        sink.event(ProgressEvent {
            message: format!("phase=Store; upserting {} points", points.len()),
            elapsed: None,
        });
        let mut created = 0;
        let mut updated = 0;
        for point in &points {
            match reconcile::upsert(&mut self.store, point)? {
                UpsertOutcome::Created => created += 1,
                UpsertOutcome::Updated => updated += 1,
            }
        }
        self.store.flush()?;

        Ok(IngestItemResult {
            region: region.key().to_string(),
            value_type: value_type.key().to_string(),
            points: points.len(),
            created,
            updated,
        })
    }

    pub fn time_series(
        &self,
        value_type: ValueType,
        regions: &[Region],
    ) -> Result<TimeSeries, MetError> {
        series::assemble(value_type, regions, &self.store)
    }
}
