//! Prometheus-backed metrics registry.
//!
//! # Design
//! - Collector registration is encapsulated so callers only see typed increment helpers.
//! - Labels are stable `as_str` identifiers supplied by the calling crates.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStage, Result, TelemetryError};

const RUN_MODES: [&str; 2] = ["in_place", "clean"];
const SKIPPED_OUTCOMES: [&str; 2] = ["skipped_unparsable", "skipped_duplicate"];

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    process_requests_total: IntCounterVec,
    reorganize_runs_total: IntCounterVec,
    reorganize_items_total: IntCounterVec,
    job_steps_total: IntCounterVec,
}

/// Point-in-time totals surfaced by the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Completed reorganization runs across all modes.
    pub reorganize_runs_total: u64,
    /// Items renamed across all runs.
    pub items_renamed_total: u64,
    /// Items skipped (unparsable or duplicate) across all runs.
    pub items_skipped_total: u64,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Construct a registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = register(
            &registry,
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let process_requests_total = register(
            &registry,
            "process_requests_total",
            "Processing requests by route and response outcome",
            &["route", "outcome"],
        )?;
        let reorganize_runs_total = register(
            &registry,
            "reorganize_runs_total",
            "Reorganization runs completed by placement mode",
            &["mode"],
        )?;
        let reorganize_items_total = register(
            &registry,
            "reorganize_items_total",
            "Items processed by reorganization outcome",
            &["outcome"],
        )?;
        let job_steps_total = register(
            &registry,
            "job_steps_total",
            "Reorganize job steps executed by status",
            &["step", "status"],
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                process_requests_total,
                reorganize_runs_total,
                reorganize_items_total,
                job_steps_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Count one processing request by the kind of response it produced.
    pub fn inc_process_request(&self, route: &str, outcome: &str) {
        self.inner
            .process_requests_total
            .with_label_values(&[route, outcome])
            .inc();
    }

    /// Count one completed reorganization run.
    pub fn inc_reorganize_run(&self, mode: &str) {
        self.inner
            .reorganize_runs_total
            .with_label_values(&[mode])
            .inc();
    }

    /// Add `count` items to the per-outcome counter.
    pub fn add_reorganize_items(&self, outcome: &str, count: u64) {
        if count > 0 {
            self.inner
                .reorganize_items_total
                .with_label_values(&[outcome])
                .inc_by(count);
        }
    }

    /// Increment the job step counter.
    pub fn inc_job_step(&self, step: &str, status: &str) {
        self.inner
            .job_steps_total
            .with_label_values(&[step, status])
            .inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|source| TelemetryError::ExpositionEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::ExpositionUtf8 { source })
    }

    /// Totals for health reporting.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let runs = &self.inner.reorganize_runs_total;
        let items = &self.inner.reorganize_items_total;
        let count =
            |collector: &IntCounterVec, label: &str| collector.with_label_values(&[label]).get();
        MetricsSnapshot {
            reorganize_runs_total: RUN_MODES.iter().map(|mode| count(runs, *mode)).sum(),
            items_renamed_total: count(items, "renamed"),
            items_skipped_total: SKIPPED_OUTCOMES
                .iter()
                .map(|outcome| count(items, *outcome))
                .sum(),
        }
    }
}

fn register(
    registry: &Registry,
    name: &'static str,
    help: &str,
    labels: &[&str],
) -> Result<IntCounterVec> {
    let collector = IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::Collector {
            name,
            stage: CollectorStage::Build,
            source,
        })?;
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::Collector {
            name,
            stage: CollectorStage::Register,
            source,
        })?;
    Ok(collector)
}
