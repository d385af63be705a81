//! Stage runners and their state machines.
//!
//! Each runner owns one stage implementation plus the link halves it talks
//! to. `step` advances the state machine by at most one message, which keeps
//! the end-of-stream contract checkable without threads; `run` loops `step`
//! until the terminal state.
//!
//! | Runner | States |
//! |--------|--------|
//! | [`SourceStage`] | `Producing → Done` |
//! | [`TransformStage`] | `Running → Draining → Done` |
//! | [`ReduceStage`] | `Accumulating → Finalized` |

use std::sync::Arc;

use crate::element::{Reduce, Source, Transform};
use crate::error::{Error, Result};
use crate::link::{LocalReceiver, LocalSender, Message, ResultPromise};
use crate::observability::{
    StageKind, StageMetrics, record_link_depth, trace_eos, trace_error, trace_state_change,
};

/// State of a [`SourceStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Publishing items downstream.
    Producing,
    /// End-of-stream sent. Terminal.
    Done,
}

/// State of a [`TransformStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    /// Receiving and forwarding items.
    Running,
    /// Input ended after its last item was forwarded; end-of-stream not yet
    /// sent downstream.
    Draining,
    /// End-of-stream sent downstream. Terminal.
    Done,
}

/// State of a [`ReduceStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceState {
    /// Folding items into the running value.
    Accumulating,
    /// Final value delivered. Terminal.
    Finalized,
}

const OUTPUT_FINISHED: Error = Error::LinkClosed("output already finished");

/// Input link depth is sampled on the first item and then every this many.
pub const DEPTH_SAMPLE_INTERVAL: u64 = 1024;

// ============================================================================
// Source
// ============================================================================

/// Drives a [`Source`] into a link.
pub struct SourceStage<S: Source> {
    source: S,
    output: Option<LocalSender<S::Output>>,
    state: SourceState,
    produced: u64,
    pipeline: Arc<str>,
    metrics: StageMetrics,
}

impl<S: Source> SourceStage<S> {
    /// Create a runner publishing onto `output`.
    pub fn new(source: S, output: LocalSender<S::Output>, pipeline: Arc<str>) -> Self {
        let metrics = StageMetrics::new(&pipeline, StageKind::Source);
        Self {
            source,
            output: Some(output),
            state: SourceState::Producing,
            produced: 0,
            pipeline,
            metrics,
        }
    }

    /// Current state.
    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Items published so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Publish one item, or send end-of-stream if the source is exhausted.
    ///
    /// Blocks while the output link is full. No-op once `Done`.
    pub fn step(&mut self) -> Result<SourceState> {
        if self.state == SourceState::Producing {
            match self.source.produce()? {
                Some(item) => {
                    self.output.as_ref().ok_or(OUTPUT_FINISHED)?.send(item)?;
                    self.produced += 1;
                }
                None => {
                    self.output.take().ok_or(OUTPUT_FINISHED)?.finish()?;
                    trace_eos(&self.pipeline, StageKind::Source.as_str(), self.produced);
                    self.transition(SourceState::Done);
                }
            }
        }
        Ok(self.state)
    }

    /// Run until `Done`, returning the number of items published.
    pub fn run(mut self) -> Result<u64> {
        tracing::debug!("source '{}' started", self.source.name());
        let metrics = self.metrics.clone();
        let _timer = metrics.start_timer();

        loop {
            match self.step() {
                Ok(SourceState::Done) => break,
                Ok(SourceState::Producing) => {}
                Err(e) => {
                    trace_error(&self.pipeline, StageKind::Source.as_str(), &e);
                    return Err(e);
                }
            }
        }

        metrics.record_items(self.produced);
        Ok(self.produced)
    }

    fn transition(&mut self, to: SourceState) {
        trace_state_change(&self.pipeline, StageKind::Source.as_str(), self.state, to);
        self.state = to;
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Drives a [`Transform`] between two links.
pub struct TransformStage<T: Transform> {
    transform: T,
    input: LocalReceiver<T::Input>,
    output: Option<LocalSender<T::Output>>,
    state: TransformState,
    transformed: u64,
    input_depth: usize,
    pipeline: Arc<str>,
    metrics: StageMetrics,
}

impl<T: Transform> TransformStage<T> {
    /// Create a runner reading `input` and publishing onto `output`.
    pub fn new(
        transform: T,
        input: LocalReceiver<T::Input>,
        output: LocalSender<T::Output>,
        pipeline: Arc<str>,
    ) -> Self {
        let metrics = StageMetrics::new(&pipeline, StageKind::Transform);
        Self {
            transform,
            input,
            output: Some(output),
            state: TransformState::Running,
            transformed: 0,
            input_depth: 0,
            pipeline,
            metrics,
        }
    }

    /// Current state.
    pub fn state(&self) -> TransformState {
        self.state
    }

    /// Items forwarded so far.
    pub fn transformed(&self) -> u64 {
        self.transformed
    }

    /// Input messages still queued at the last depth sample.
    pub fn input_depth(&self) -> usize {
        self.input_depth
    }

    /// Advance by one message.
    ///
    /// - `Running`: receive one message; forward the mapped item, or move
    ///   to `Draining` on end-of-stream.
    /// - `Draining`: send end-of-stream downstream and move to `Done`.
    /// - `Done`: no-op.
    pub fn step(&mut self) -> Result<TransformState> {
        match self.state {
            TransformState::Running => match self.input.recv()? {
                Message::Item(item) => {
                    if self.transformed % DEPTH_SAMPLE_INTERVAL == 0 {
                        self.input_depth = self.input.len();
                        record_link_depth(&self.pipeline, "raw", self.input_depth);
                    }
                    let mapped = self.transform.transform(item)?;
                    self.output.as_ref().ok_or(OUTPUT_FINISHED)?.send(mapped)?;
                    self.transformed += 1;
                }
                Message::Eos => {
                    trace_eos(&self.pipeline, StageKind::Transform.as_str(), self.transformed);
                    self.transition(TransformState::Draining);
                }
            },
            TransformState::Draining => {
                self.output.take().ok_or(OUTPUT_FINISHED)?.finish()?;
                self.transition(TransformState::Done);
            }
            TransformState::Done => {}
        }
        Ok(self.state)
    }

    /// Run until `Done`, returning the number of items forwarded.
    pub fn run(mut self) -> Result<u64> {
        tracing::debug!("transform '{}' started", self.transform.name());
        let metrics = self.metrics.clone();
        let _timer = metrics.start_timer();

        loop {
            match self.step() {
                Ok(TransformState::Done) => break,
                Ok(_) => {}
                Err(e) => {
                    trace_error(&self.pipeline, StageKind::Transform.as_str(), &e);
                    return Err(e);
                }
            }
        }

        metrics.record_items(self.transformed);
        Ok(self.transformed)
    }

    fn transition(&mut self, to: TransformState) {
        trace_state_change(&self.pipeline, StageKind::Transform.as_str(), self.state, to);
        self.state = to;
    }
}

// ============================================================================
// Reduce
// ============================================================================

/// Drives a [`Reduce`] from a link into the result handoff.
///
/// The reducer is held until end-of-stream; its absence is the
/// `Finalized` state.
pub struct ReduceStage<R: Reduce> {
    reducer: Option<R>,
    input: LocalReceiver<R::Input>,
    promise: ResultPromise<R::Output>,
    reduced: u64,
    input_depth: usize,
    pipeline: Arc<str>,
    metrics: StageMetrics,
}

impl<R: Reduce> ReduceStage<R> {
    /// Create a runner reading `input` and delivering through `promise`.
    pub fn new(
        reducer: R,
        input: LocalReceiver<R::Input>,
        promise: ResultPromise<R::Output>,
        pipeline: Arc<str>,
    ) -> Self {
        let metrics = StageMetrics::new(&pipeline, StageKind::Reduce);
        Self {
            reducer: Some(reducer),
            input,
            promise,
            reduced: 0,
            input_depth: 0,
            pipeline,
            metrics,
        }
    }

    /// Current state.
    pub fn state(&self) -> ReduceState {
        match self.reducer {
            Some(_) => ReduceState::Accumulating,
            None => ReduceState::Finalized,
        }
    }

    /// Items folded so far.
    pub fn reduced(&self) -> u64 {
        self.reduced
    }

    /// Input messages still queued at the last depth sample.
    pub fn input_depth(&self) -> usize {
        self.input_depth
    }

    /// Advance by one message.
    ///
    /// On end-of-stream the reducer is finished and its value delivered
    /// exactly once. The reducer is consumed even if finishing fails, so a
    /// failed stage is `Finalized` too. No-op once `Finalized`.
    pub fn step(&mut self) -> Result<ReduceState> {
        let Some(reducer) = self.reducer.as_mut() else {
            return Ok(ReduceState::Finalized);
        };

        match self.input.recv()? {
            Message::Item(item) => {
                if self.reduced % DEPTH_SAMPLE_INTERVAL == 0 {
                    self.input_depth = self.input.len();
                    record_link_depth(&self.pipeline, "mapped", self.input_depth);
                }
                reducer.consume(item)?;
                self.reduced += 1;
            }
            Message::Eos => {
                trace_eos(&self.pipeline, StageKind::Reduce.as_str(), self.reduced);
                if let Some(reducer) = self.reducer.take() {
                    trace_state_change(
                        &self.pipeline,
                        StageKind::Reduce.as_str(),
                        ReduceState::Accumulating,
                        ReduceState::Finalized,
                    );
                    self.promise.fulfill(reducer.finish()?)?;
                }
            }
        }
        Ok(self.state())
    }

    /// Run until `Finalized`, returning the number of items folded.
    pub fn run(mut self) -> Result<u64> {
        if let Some(reducer) = &self.reducer {
            tracing::debug!("reducer '{}' started", reducer.name());
        }
        let metrics = self.metrics.clone();
        let _timer = metrics.start_timer();

        loop {
            match self.step() {
                Ok(ReduceState::Finalized) => break,
                Ok(ReduceState::Accumulating) => {}
                Err(e) => {
                    trace_error(&self.pipeline, StageKind::Reduce.as_str(), &e);
                    return Err(e);
                }
            }
        }

        metrics.record_items(self.reduced);
        Ok(self.reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Generator, ResidueScale, Sum, from_iter, map};
    use crate::link::{LocalLink, oneshot};

    fn name() -> Arc<str> {
        Arc::from("stage-test")
    }

    #[test]
    fn test_source_sends_eos_once_after_items() {
        let (tx, rx) = LocalLink::bounded(8);
        let mut stage = SourceStage::new(Generator::new(5, 99), tx, name());

        assert_eq!(stage.step().unwrap(), SourceState::Producing);
        assert_eq!(stage.step().unwrap(), SourceState::Producing);
        assert_eq!(stage.produced(), 2);
        assert_eq!(stage.step().unwrap(), SourceState::Done);
        // Terminal
        assert_eq!(stage.step().unwrap(), SourceState::Done);

        assert_eq!(rx.recv().unwrap(), Message::Item(1));
        assert_eq!(rx.recv().unwrap(), Message::Item(101));
        assert_eq!(rx.recv().unwrap(), Message::Eos);
        // Sender released after end-of-stream
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_empty_source_goes_straight_to_done() {
        let (tx, rx) = LocalLink::bounded(1);
        let stage = SourceStage::new(Generator::new(0, 99), tx, name());

        assert_eq!(stage.run().unwrap(), 0);
        assert_eq!(rx.recv().unwrap(), Message::Eos);
    }

    #[test]
    fn test_transform_state_machine() {
        let (raw_tx, raw_rx) = LocalLink::bounded(8);
        let (mapped_tx, mapped_rx) = LocalLink::bounded(8);
        let mut stage = TransformStage::new(ResidueScale::new(), raw_rx, mapped_tx, name());

        raw_tx.send(4).unwrap();
        raw_tx.finish().unwrap();

        assert_eq!(stage.state(), TransformState::Running);
        assert_eq!(stage.step().unwrap(), TransformState::Running);
        assert_eq!(stage.transformed(), 1);

        // End-of-stream seen, nothing sent downstream yet
        assert_eq!(stage.step().unwrap(), TransformState::Draining);
        assert_eq!(mapped_rx.recv().unwrap(), Message::Item(8));
        assert!(mapped_rx.try_recv().unwrap().is_none());

        assert_eq!(stage.step().unwrap(), TransformState::Done);
        assert_eq!(mapped_rx.recv().unwrap(), Message::Eos);

        assert_eq!(stage.step().unwrap(), TransformState::Done);
    }

    #[test]
    fn test_transform_upstream_vanished() {
        let (raw_tx, raw_rx) = LocalLink::bounded::<i64>(8);
        let (mapped_tx, mapped_rx) = LocalLink::bounded(8);
        let stage = TransformStage::new(ResidueScale::new(), raw_rx, mapped_tx, name());

        raw_tx.send(1).unwrap();
        drop(raw_tx);

        assert!(matches!(stage.run(), Err(Error::LinkClosed(_))));
        // The item that made it through is still delivered, but no EOS
        assert_eq!(mapped_rx.recv().unwrap(), Message::Item(2));
        assert!(mapped_rx.recv().is_err());
    }

    #[test]
    fn test_reduce_delivers_exactly_once() {
        let (tx, rx) = LocalLink::bounded(8);
        let (promise, mut future) = oneshot();
        let mut stage = ReduceStage::new(Sum::new(), rx, promise, name());

        tx.send(2).unwrap();
        tx.send(303).unwrap();
        tx.finish().unwrap();

        assert_eq!(stage.step().unwrap(), ReduceState::Accumulating);
        assert_eq!(stage.step().unwrap(), ReduceState::Accumulating);
        assert_eq!(future.try_take().unwrap(), None);

        assert_eq!(stage.step().unwrap(), ReduceState::Finalized);
        assert_eq!(stage.reduced(), 2);
        assert_eq!(future.try_take().unwrap(), Some(305));

        // Terminal: no further reads or deliveries
        assert_eq!(stage.step().unwrap(), ReduceState::Finalized);
    }

    #[test]
    fn test_reduce_without_eos_never_delivers() {
        let (tx, rx) = LocalLink::bounded::<i64>(8);
        let (promise, future) = oneshot();
        let stage = ReduceStage::new(Sum::new(), rx, promise, name());

        tx.send(5).unwrap();
        drop(tx);

        assert!(matches!(stage.run(), Err(Error::LinkClosed(_))));
        assert!(matches!(future.wait(), Err(Error::ResultDropped)));
    }

    #[test]
    fn test_reduce_caller_gone() {
        let (tx, rx) = LocalLink::bounded::<i64>(8);
        let (promise, future) = oneshot();
        drop(future);
        let stage = ReduceStage::new(Sum::new(), rx, promise, name());

        tx.finish().unwrap();
        assert!(matches!(stage.run(), Err(Error::ResultDropped)));
    }

    struct FailsOnFinish;

    impl Reduce for FailsOnFinish {
        type Input = i64;
        type Output = i64;

        fn consume(&mut self, _item: i64) -> Result<()> {
            Ok(())
        }

        fn finish(self) -> Result<i64> {
            Err(Error::Stage("cannot finish".into()))
        }
    }

    #[test]
    fn test_reduce_failed_finish_is_terminal() {
        let (tx, rx) = LocalLink::bounded(8);
        let (promise, future) = oneshot();
        let mut stage = ReduceStage::new(FailsOnFinish, rx, promise, name());

        tx.send(1).unwrap();
        tx.finish().unwrap();

        assert_eq!(stage.step().unwrap(), ReduceState::Accumulating);
        assert!(matches!(stage.step(), Err(Error::Stage(_))));

        // The reducer is spent; no further reads or delivery attempts.
        assert_eq!(stage.state(), ReduceState::Finalized);
        assert_eq!(stage.step().unwrap(), ReduceState::Finalized);

        drop(stage);
        assert!(matches!(future.wait(), Err(Error::ResultDropped)));
    }

    #[test]
    fn test_input_depth_sampled_on_items() {
        let (raw_tx, raw_rx) = LocalLink::bounded(8);
        let (mapped_tx, mapped_rx) = LocalLink::bounded(8);
        let (promise, _future) = oneshot();
        let mut transform = TransformStage::new(ResidueScale::new(), raw_rx, mapped_tx, name());
        let mut reduce = ReduceStage::new(Sum::new(), mapped_rx, promise, name());

        for item in 1..=5 {
            raw_tx.send(item).unwrap();
        }
        raw_tx.finish().unwrap();

        // First item taken, four items plus end-of-stream still queued.
        transform.step().unwrap();
        assert_eq!(transform.input_depth(), 5);

        transform.step().unwrap();
        transform.step().unwrap();
        reduce.step().unwrap();
        assert_eq!(reduce.input_depth(), 2);
    }

    #[test]
    fn test_source_downstream_gone() {
        let (tx, rx) = LocalLink::bounded(1);
        drop(rx);
        let stage = SourceStage::new(from_iter(vec![1i64, 2, 3]), tx, name());

        assert!(matches!(stage.run(), Err(Error::LinkClosed(_))));
    }

    #[test]
    fn test_stages_chained_by_hand() {
        let (raw_tx, raw_rx) = LocalLink::bounded(16);
        let (mapped_tx, mapped_rx) = LocalLink::bounded(16);
        let (promise, future) = oneshot();

        let source = SourceStage::new(from_iter(1i64..=5), raw_tx, name());
        let transform = TransformStage::new(map(|x: i64| x * 10), raw_rx, mapped_tx, name());
        let reduce = ReduceStage::new(Sum::new(), mapped_rx, promise, name());

        // Capacity is large enough to run each stage to completion in turn.
        assert_eq!(source.run().unwrap(), 5);
        assert_eq!(transform.run().unwrap(), 5);
        assert_eq!(reduce.run().unwrap(), 5);
        assert_eq!(future.wait().unwrap(), 150);
    }
}
