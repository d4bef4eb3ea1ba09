//! Periodic stats reporter
//!
//! Polls every registered provider on the configured interval and logs the
//! result through tracing.
//!
//! # Overview
//!
//! The `StatsReporter` gathers:
//! - Pipeline-wide counters (flows, documents, drops, flushes)
//! - Per-interval counters from countable providers (per-processor emit counts)
//!
//! Countable providers reset on every poll, so exactly one reporter should
//! hold a given provider.

use crate::{
    CollectedCountable, CollectedStats, CountableProvider, HumanFormatter, JsonFormatter,
    PipelineSnapshot, format::StatsFormatter,
};
use flowmap_config::{MetricsConfig, MetricsFormat};
use std::sync::Arc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Trait for pipeline metrics provider
///
/// The flow handler keeps its own counters in `PipelineMetrics`; its handle
/// bridges them to a `PipelineSnapshot`.
pub trait PipelineMetricsProvider: Send + Sync {
    /// Get a snapshot of pipeline metrics
    fn pipeline_snapshot(&self) -> PipelineSnapshot;
}

/// Builder for constructing a StatsReporter
#[derive(Default)]
pub struct StatsReporterBuilder {
    config: Option<MetricsConfig>,
    pipeline: Option<Arc<dyn PipelineMetricsProvider>>,
    countables: Vec<Arc<dyn CountableProvider>>,
}

impl StatsReporterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metrics configuration
    pub fn config(mut self, config: MetricsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the pipeline metrics provider
    pub fn pipeline(mut self, provider: Arc<dyn PipelineMetricsProvider>) -> Self {
        self.pipeline = Some(provider);
        self
    }

    /// Register a countable provider
    pub fn countable(mut self, provider: Arc<dyn CountableProvider>) -> Self {
        self.countables.push(provider);
        self
    }

    /// Build the StatsReporter
    pub fn build(self) -> StatsReporter {
        let config = self.config.unwrap_or_default();
        let formatter: Box<dyn StatsFormatter> = match config.format {
            MetricsFormat::Human => Box::new(HumanFormatter::new()),
            MetricsFormat::Json => Box::new(JsonFormatter::new()),
        };

        StatsReporter {
            config,
            formatter,
            pipeline: self.pipeline,
            countables: self.countables,
            previous: None,
        }
    }
}

/// Periodic stats reporter
pub struct StatsReporter {
    config: MetricsConfig,
    formatter: Box<dyn StatsFormatter>,
    pipeline: Option<Arc<dyn PipelineMetricsProvider>>,
    countables: Vec<Arc<dyn CountableProvider>>,
    previous: Option<CollectedStats>,
}

impl StatsReporter {
    /// Create a new builder
    pub fn builder() -> StatsReporterBuilder {
        StatsReporterBuilder::new()
    }

    /// Run the reporter until cancellation
    ///
    /// Spawn this as a tokio task. Reports once more on cancellation so the
    /// last interval's counters are not lost.
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("stats reporting disabled");
            return;
        }

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; there is nothing to report yet.
        ticker.tick().await;

        info!(
            interval_secs = self.config.interval.as_secs(),
            format = ?self.config.format,
            countables = self.countables.len(),
            "stats reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.report();
                    info!("stats reporter shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Collect and report once
    pub fn report(&mut self) {
        let stats = self.collect();
        let rates = self.previous.as_ref().and_then(|prev| stats.rates(prev));

        let output = self.formatter.format_stats(&stats, rates.as_ref());

        for line in output.lines() {
            info!("{}", line);
        }

        self.previous = Some(stats);
    }

    /// Collect stats from all registered providers
    ///
    /// Polling countables resets their counters.
    pub fn collect(&self) -> CollectedStats {
        let mut stats = CollectedStats::new();

        if self.config.include_pipeline {
            if let Some(ref provider) = self.pipeline {
                stats.pipeline = Some(provider.pipeline_snapshot());
            }
        }

        if self.config.include_processors {
            stats.countables = self
                .countables
                .iter()
                .map(|c| CollectedCountable {
                    module: c.module().to_string(),
                    items: c.get_counter(),
                })
                .collect();
        }

        stats
    }

    /// Add a countable provider after construction
    pub fn add_countable(&mut self, provider: Arc<dyn CountableProvider>) {
        self.countables.push(provider);
    }
}
