//! Pipeline driver: wires the three stages, runs each on its own thread and
//! waits for the single result.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::Span;

use super::config::PipelineConfig;
use super::stage::{ReduceStage, SourceStage, TransformStage};
use crate::element::{Reduce, Source, Transform};
use crate::elements::{Generator, ResidueScale, Sum};
use crate::error::{Error, Result};
use crate::link::{LocalLink, ResultFuture, oneshot};
use crate::observability::{StageKind, instrument_stage, record_pipeline_error, span_pipeline};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport<O> {
    /// The value delivered by the reducer.
    pub total: O,
    /// Items published by the source.
    pub produced: u64,
    /// Items forwarded by the transform.
    pub transformed: u64,
    /// Items folded by the reducer.
    pub reduced: u64,
}

impl<O> PipelineReport<O> {
    /// Whether every produced item reached the reducer exactly once.
    pub fn is_lossless(&self) -> bool {
        self.produced == self.transformed && self.transformed == self.reduced
    }
}

/// A three-stage pipeline, not yet started.
///
/// # Example
///
/// ```rust
/// use tristage::pipeline::{Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::new().with_limit(5);
/// let total = Pipeline::standard(config).run().unwrap();
/// assert_eq!(total, 305);
/// ```
pub struct Pipeline<S, T, R> {
    config: PipelineConfig,
    source: S,
    transform: T,
    reducer: R,
}

impl Pipeline<Generator, ResidueScale, Sum> {
    /// The production pipeline: [`Generator`] → [`ResidueScale`] → [`Sum`].
    pub fn standard(config: PipelineConfig) -> Self {
        let source = Generator::new(config.limit, config.skip);
        Self {
            config,
            source,
            transform: ResidueScale::new(),
            reducer: Sum::new(),
        }
    }
}

impl<S, T, R> Pipeline<S, T, R> {
    /// Replace the reducer, e.g. with a [`Collect`](crate::elements::Collect).
    pub fn with_reducer<R2>(self, reducer: R2) -> Pipeline<S, T, R2> {
        Pipeline {
            config: self.config,
            source: self.source,
            transform: self.transform,
            reducer,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<S, T, R> Pipeline<S, T, R>
where
    S: Source + 'static,
    T: Transform<Input = S::Output> + 'static,
    R: Reduce<Input = T::Output> + 'static,
{
    /// Assemble a pipeline from arbitrary stages.
    ///
    /// Only `capacity` and `name` of `config` apply; `limit` and `skip`
    /// configure the standard generator.
    pub fn new(config: PipelineConfig, source: S, transform: T, reducer: R) -> Self {
        Self {
            config,
            source,
            transform,
            reducer,
        }
    }

    /// Spawn the stage threads and return a handle to the running pipeline.
    pub fn start(self) -> Result<PipelineHandle<R::Output>> {
        self.config.validate()?;

        let pipeline: Arc<str> = Arc::from(self.config.name.as_str());
        let span = span_pipeline(&pipeline);
        tracing::info!(
            parent: &span,
            limit = self.config.limit,
            skip = self.config.skip,
            capacity = self.config.capacity,
            "starting pipeline"
        );

        let (raw_tx, raw_rx) = LocalLink::bounded(self.config.capacity);
        let (mapped_tx, mapped_rx) = LocalLink::bounded(self.config.capacity);
        let (promise, result) = oneshot();

        let source = SourceStage::new(self.source, raw_tx, Arc::clone(&pipeline));
        let transform =
            TransformStage::new(self.transform, raw_rx, mapped_tx, Arc::clone(&pipeline));
        let reduce = ReduceStage::new(self.reducer, mapped_rx, promise, Arc::clone(&pipeline));

        // A stage that fails to spawn drops its link halves, which unblocks
        // and fails the stages already running.
        let stages = vec![
            spawn_stage(StageKind::Source, &pipeline, &span, move || source.run())?,
            spawn_stage(StageKind::Transform, &pipeline, &span, move || {
                transform.run()
            })?,
            spawn_stage(StageKind::Reduce, &pipeline, &span, move || reduce.run())?,
        ];

        Ok(PipelineHandle {
            pipeline,
            span,
            result,
            stages,
        })
    }

    /// Run to completion and return the reducer's value.
    ///
    /// Blocks the calling thread. From async code prefer
    /// [`run_async`](Self::run_async), which keeps runtime workers free.
    pub fn run(self) -> Result<R::Output> {
        Ok(self.run_with_report()?.total)
    }

    /// Run to completion and return the value with per-stage item counts.
    pub fn run_with_report(self) -> Result<PipelineReport<R::Output>> {
        self.start()?.wait()
    }

    /// Run the pipeline asynchronously.
    ///
    /// This wraps the blocking execution in a blocking task.
    pub async fn run_async(self) -> Result<R::Output> {
        tokio::task::spawn_blocking(|| self.run())
            .await
            .map_err(|e| Error::Join(e.to_string()))?
    }
}

struct StageThread {
    kind: StageKind,
    handle: JoinHandle<Result<u64>>,
}

fn spawn_stage<F>(kind: StageKind, pipeline: &Arc<str>, parent: &Span, body: F) -> Result<StageThread>
where
    F: FnOnce() -> Result<u64> + Send + 'static,
{
    let pipeline = Arc::clone(pipeline);
    let parent = parent.clone();
    let handle = thread::Builder::new()
        .name(format!("{}-{}", pipeline, kind.as_str()))
        .spawn(move || {
            let _guard = instrument_stage(&parent, &pipeline, kind.as_str());
            body()
        })?;
    Ok(StageThread { kind, handle })
}

/// Handle to a running pipeline.
pub struct PipelineHandle<O> {
    pipeline: Arc<str>,
    span: Span,
    result: ResultFuture<O>,
    stages: Vec<StageThread>,
}

impl<O> PipelineHandle<O> {
    /// Whether every stage thread has exited.
    pub fn is_finished(&self) -> bool {
        self.stages.iter().all(|stage| stage.handle.is_finished())
    }

    /// Block until every stage has exited, then take the delivered result.
    ///
    /// Only joins OS threads, so it is safe (if blocking) to call from
    /// inside an async runtime.
    ///
    /// If any stage failed, returns that stage's error. A stage's own
    /// failure is preferred over the link-closed errors it causes in its
    /// neighbours.
    pub fn wait(self) -> Result<PipelineReport<O>> {
        let PipelineHandle {
            pipeline,
            span,
            mut result,
            stages,
        } = self;
        let _entered = span.enter();

        // Joining the reducer leaves the slot either filled or closed, so the
        // result is read without blocking on the runtime's channel.
        let mut counts = [0u64; 3];
        let mut errors = Vec::new();
        for (slot, stage) in counts.iter_mut().zip(stages) {
            match stage.handle.join() {
                Ok(Ok(items)) => *slot = items,
                Ok(Err(e)) => errors.push(e),
                Err(payload) => errors.push(Error::StagePanicked {
                    stage: stage.kind.as_str(),
                    message: panic_message(&*payload),
                }),
            }
        }

        if !errors.is_empty() {
            record_pipeline_error(&pipeline);
            let root = errors
                .iter()
                .position(|e| !matches!(e, Error::LinkClosed(_)))
                .unwrap_or(0);
            return Err(errors.swap_remove(root));
        }

        let total = result.try_take()?.ok_or(Error::ResultDropped)?;
        let [produced, transformed, reduced] = counts;
        tracing::info!(produced, transformed, reduced, "pipeline finished");

        Ok(PipelineReport {
            total,
            produced,
            transformed,
            reduced,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
