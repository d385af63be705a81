//! Tracing integration for structured logging and spans.

use std::fmt::Debug;

use tracing::{Level, Span, span};

/// Create a span for a pipeline run.
#[inline]
pub fn span_pipeline(name: &str) -> Span {
    span!(Level::INFO, "pipeline", name = %name)
}

/// Create a span for a stage, nested under the pipeline span.
///
/// Stages run on their own threads, so the parent is passed explicitly
/// rather than taken from the current thread's context.
#[inline]
pub fn span_stage(parent: &Span, pipeline: &str, stage: &str) -> Span {
    span!(
        parent: parent,
        Level::DEBUG,
        "stage",
        pipeline = %pipeline,
        stage = %stage
    )
}

/// Enter a stage span for the lifetime of the returned guard.
pub fn instrument_stage(parent: &Span, pipeline: &str, stage: &str) -> tracing::span::EnteredSpan {
    span_stage(parent, pipeline, stage).entered()
}

/// Log end-of-stream observed or sent by a stage.
#[inline]
pub fn trace_eos(pipeline: &str, stage: &str, items: u64) {
    tracing::debug!(
        pipeline = %pipeline,
        stage = %stage,
        items = items,
        "end of stream"
    );
}

/// Log a stage state machine transition.
#[inline]
pub fn trace_state_change<S: Debug>(pipeline: &str, stage: &str, from: S, to: S) {
    tracing::debug!(
        pipeline = %pipeline,
        stage = %stage,
        from = ?from,
        to = ?to,
        "stage state changed"
    );
}

/// Log a stage error.
#[inline]
pub fn trace_error(pipeline: &str, stage: &str, error: &dyn std::error::Error) {
    tracing::error!(
        pipeline = %pipeline,
        stage = %stage,
        error = %error,
        "stage failed"
    );
}
