//! Configuration validation
//!
//! Rejects values that would stall or spin the pipeline:
//! - Zero-sized stashes, batches and queues
//! - Zero durations for windows, margins and timers

use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_pipeline(config)?;
    validate_output(config)?;
    validate_metrics(config)?;
    Ok(())
}

fn validate_pipeline(config: &Config) -> Result<()> {
    let pipeline = &config.pipeline;

    non_zero("pipeline", "docs_in_buffer", pipeline.docs_in_buffer)?;
    non_zero("pipeline", "queue_batch_size", pipeline.queue_batch_size)?;
    non_zero("pipeline", "input_queue_size", pipeline.input_queue_size)?;
    non_zero_duration("pipeline", "window_size", pipeline.window_size)?;
    non_zero_duration("pipeline", "window_margin", pipeline.window_margin)?;
    non_zero_duration("pipeline", "tick_interval", pipeline.tick_interval)?;
    non_zero_duration(
        "pipeline",
        "idle_flush_threshold",
        pipeline.idle_flush_threshold,
    )?;

    Ok(())
}

fn validate_output(config: &Config) -> Result<()> {
    non_zero("output", "queue_size", config.output.queue_size)
}

fn validate_metrics(config: &Config) -> Result<()> {
    if config.metrics.enabled {
        non_zero_duration("metrics", "interval", config.metrics.interval)?;
    }
    Ok(())
}

fn non_zero(section: &'static str, field: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::invalid_value(section, field, "must be at least 1"));
    }
    Ok(())
}

fn non_zero_duration(section: &'static str, field: &'static str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(ConfigError::invalid_value(section, field, "must be greater than zero"));
    }
    Ok(())
}
