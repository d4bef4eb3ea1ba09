//! Flow timestamp validation
//!
//! The capture layer occasionally hands over records with clocks that are
//! skewed, reversed, or far in the future. Those would open stash windows
//! nowhere near the present, so they are rejected before any processor sees
//! them.

use std::fmt;
use std::time::Duration;

use flowmap_config::PipelineConfig;
use flowmap_protocol::FlowRecord;

/// Rule that rejected a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// `start_time` is later than now
    StartInFuture,
    /// `end_time` is later than now
    EndInFuture,
    /// Closed flow lasted longer than the window margin
    DurationTooLong,
    /// Closed flow ends before it starts
    EndBeforeStart,
    /// `cur_start_time` is past `end_time + margin` or past now
    WindowStartOutOfRange,
    /// Source-side last arrival is past `end_time + margin` or past now
    SrcArrivalOutOfRange,
    /// Destination-side last arrival is past `end_time + margin` or past now
    DstArrivalOutOfRange,
}

impl Rejection {
    /// Short label used in logs
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartInFuture => "start_in_future",
            Self::EndInFuture => "end_in_future",
            Self::DurationTooLong => "duration_too_long",
            Self::EndBeforeStart => "end_before_start",
            Self::WindowStartOutOfRange => "window_start_out_of_range",
            Self::SrcArrivalOutOfRange => "src_arrival_out_of_range",
            Self::DstArrivalOutOfRange => "dst_arrival_out_of_range",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::StartInFuture => "start time is in the future",
            Self::EndInFuture => "end time is in the future",
            Self::DurationTooLong => "flow duration exceeds the allowed maximum",
            Self::EndBeforeStart => "end time is before start time",
            Self::WindowStartOutOfRange => "window start time is out of range",
            Self::SrcArrivalOutOfRange => "source last arrival time is out of range",
            Self::DstArrivalOutOfRange => "destination last arrival time is out of range",
        };
        f.write_str(text)
    }
}

/// Timestamp sanity checks for incoming flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowValidator {
    window_margin: Duration,
    max_duration: Duration,
}

impl FlowValidator {
    /// Create a validator allowing `window_margin` of clock slack
    pub fn new(window_margin: Duration) -> Self {
        Self {
            window_margin,
            max_duration: window_margin,
        }
    }

    /// Create a validator from pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.window_margin)
    }

    /// Configured clock slack
    #[inline]
    pub fn window_margin(&self) -> Duration {
        self.window_margin
    }

    /// Longest accepted lifetime of a closed flow
    #[inline]
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Check `flow` against the wall clock value `now`
    pub fn check(&self, flow: &FlowRecord, now: Duration) -> Result<(), Rejection> {
        if flow.start_time > now {
            return Err(Rejection::StartInFuture);
        }
        if flow.end_time > now {
            return Err(Rejection::EndInFuture);
        }

        if flow.is_closed() {
            if flow.end_time > flow.start_time.saturating_add(self.max_duration) {
                return Err(Rejection::DurationTooLong);
            }
            if flow.end_time < flow.start_time {
                return Err(Rejection::EndBeforeStart);
            }
        }

        let limit = flow.end_time.saturating_add(self.window_margin).min(now);
        if flow.cur_start_time > limit {
            return Err(Rejection::WindowStartOutOfRange);
        }
        if flow.peer_src.arr_time_last > limit {
            return Err(Rejection::SrcArrivalOutOfRange);
        }
        if flow.peer_dst.arr_time_last > limit {
            return Err(Rejection::DstArrivalOutOfRange);
        }

        Ok(())
    }

    /// Whether `flow` passes every check
    #[inline]
    pub fn is_valid(&self, flow: &FlowRecord, now: Duration) -> bool {
        self.check(flow, now).is_ok()
    }
}

impl Default for FlowValidator {
    fn default() -> Self {
        Self::new(flowmap_config::DEFAULT_WINDOW_MARGIN)
    }
}
