//! Observability features: metrics and tracing.
//!
//! - **Metrics**: counters, gauges and histograms via `metrics-rs`
//! - **Tracing**: structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `tristage_items_produced` | Counter | Items published by the source |
//! | `tristage_items_transformed` | Counter | Items mapped by the transform |
//! | `tristage_items_reduced` | Counter | Items folded by the reducer |
//! | `tristage_stage_duration_ns` | Histogram | Run time per stage |
//! | `tristage_link_depth` | Gauge | Pending messages, sampled on the first item and every 1024th |
//! | `tristage_pipeline_errors_total` | Counter | Failed pipeline runs |
//!
//! Nothing is exported unless the application installs a recorder.
//!
//! ## Tracing
//!
//! One `pipeline` span per run, one `stage` span per stage thread, plus
//! debug events for end-of-stream and every stage state transition.

mod metrics;
mod tracing_support;

pub use metrics::{
    StageKind, StageMetrics, TimerGuard, init_metrics, record_link_depth, record_pipeline_error,
};
pub use tracing_support::{
    instrument_stage, span_pipeline, span_stage, trace_eos, trace_error, trace_state_change,
};
