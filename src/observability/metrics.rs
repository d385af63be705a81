//! Metrics collection using metrics-rs.

use metrics::{Counter, Histogram, Unit, counter, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const ITEMS_PRODUCED: &str = "tristage_items_produced";
const ITEMS_TRANSFORMED: &str = "tristage_items_transformed";
const ITEMS_REDUCED: &str = "tristage_items_reduced";
const STAGE_DURATION_NS: &str = "tristage_stage_duration_ns";
const LINK_DEPTH: &str = "tristage_link_depth";
const PIPELINE_ERRORS: &str = "tristage_pipeline_errors_total";

/// Initialize metrics descriptions.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        ITEMS_PRODUCED,
        Unit::Count,
        "Items published by the source stage"
    );
    metrics::describe_counter!(
        ITEMS_TRANSFORMED,
        Unit::Count,
        "Items mapped by the transform stage"
    );
    metrics::describe_counter!(
        ITEMS_REDUCED,
        Unit::Count,
        "Items folded by the reduce stage"
    );
    metrics::describe_histogram!(
        STAGE_DURATION_NS,
        Unit::Nanoseconds,
        "Wall time from stage start to its terminal state"
    );
    metrics::describe_gauge!(
        LINK_DEPTH,
        Unit::Count,
        "Messages pending in a link, sampled by its consumer"
    );
    metrics::describe_counter!(
        PIPELINE_ERRORS,
        Unit::Count,
        "Pipeline runs that ended in an error"
    );
}

/// Which stage a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// First stage.
    Source,
    /// Middle stage.
    Transform,
    /// Last stage.
    Reduce,
}

impl StageKind {
    fn counter_name(self) -> &'static str {
        match self {
            StageKind::Source => ITEMS_PRODUCED,
            StageKind::Transform => ITEMS_TRANSFORMED,
            StageKind::Reduce => ITEMS_REDUCED,
        }
    }

    /// Short label used in metrics, spans and thread names.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Source => "generator",
            StageKind::Transform => "transformer",
            StageKind::Reduce => "reducer",
        }
    }
}

/// Record the depth of a link.
#[inline]
pub fn record_link_depth(pipeline: &str, link: &str, depth: usize) {
    gauge!(LINK_DEPTH, "pipeline" => pipeline.to_string(), "link" => link.to_string())
        .set(depth as f64);
}

/// Record a failed pipeline run.
#[inline]
pub fn record_pipeline_error(pipeline: &str) {
    counter!(PIPELINE_ERRORS, "pipeline" => pipeline.to_string()).increment(1);
}

/// Metrics collector for one stage.
///
/// Handles are resolved once at construction so the per-item path only
/// touches the counter.
#[derive(Clone)]
pub struct StageMetrics {
    kind: StageKind,
    items: Counter,
    duration: Histogram,
}

impl StageMetrics {
    /// Create a collector for `kind` in `pipeline`.
    pub fn new(pipeline: &str, kind: StageKind) -> Self {
        Self {
            kind,
            items: counter!(
                kind.counter_name(),
                "pipeline" => pipeline.to_string(),
                "stage" => kind.as_str()
            ),
            duration: histogram!(
                STAGE_DURATION_NS,
                "pipeline" => pipeline.to_string(),
                "stage" => kind.as_str()
            ),
        }
    }

    /// Record `count` items handled.
    #[inline]
    pub fn record_items(&self, count: u64) {
        self.items.increment(count);
    }

    /// Record how long the stage ran.
    #[inline]
    pub fn record_duration(&self, duration: Duration) {
        self.duration.record(duration.as_nanos() as f64);
    }

    /// Start a timer that records the stage duration on drop.
    pub fn start_timer(&self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            metrics: self,
        }
    }

    /// The stage this collector reports for.
    pub fn kind(&self) -> StageKind {
        self.kind
    }
}

/// Guard that records stage duration when dropped.
pub struct TimerGuard<'a> {
    start: Instant,
    metrics: &'a StageMetrics,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.metrics.record_duration(self.start.elapsed());
    }
}
