//! Pipeline construction and execution.
//!
//! A [`Pipeline`] connects one [`Source`](crate::element::Source), one
//! [`Transform`](crate::element::Transform) and one
//! [`Reduce`](crate::element::Reduce) with two bounded links, runs every
//! stage on its own thread and hands the reducer's value back through a
//! one-shot result handoff.
//!
//! ```text
//! Generator ──raw──▶ ResidueScale ──mapped──▶ Sum ──oneshot──▶ caller
//! ```
//!
//! Each link has one producer and one consumer. Producers block while a link
//! is full; consumers block while it is empty. End-of-stream travels in-band
//! behind the last item. There is no cancellation: a started pipeline runs
//! until every stage reaches its terminal state or one of them fails.

mod config;
mod driver;
mod stage;

pub use config::{DEFAULT_CAPACITY, PipelineConfig};
pub use driver::{Pipeline, PipelineHandle, PipelineReport};
pub use stage::{
    DEPTH_SAMPLE_INTERVAL, ReduceStage, ReduceState, SourceStage, SourceState, TransformStage,
    TransformState,
};
