//! Core stage traits.

use crate::error::Result;

/// A source that produces values of type `Output`.
///
/// The first stage of a pipeline. Its runner forwards every produced item
/// downstream and signals end-of-stream once `produce` returns `Ok(None)`.
pub trait Source: Send {
    /// The type of data this source produces.
    type Output: Send + 'static;

    /// Produce the next item.
    ///
    /// Returns `Ok(None)` when the source is exhausted. Once exhausted the
    /// source is never polled again.
    fn produce(&mut self) -> Result<Option<Self::Output>>;

    /// Get the name of this source.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A one-to-one transform that converts `Input` to `Output`.
///
/// Unlike a filter, a transform must yield exactly one output per input.
pub trait Transform: Send {
    /// The type of data this transform accepts.
    type Input: Send + 'static;

    /// The type of data this transform produces.
    type Output: Send + 'static;

    /// Transform an input item into an output item.
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;

    /// Get the name of this transform.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A reducer that folds every input into a single final value.
///
/// The last stage of a pipeline. `finish` consumes the reducer, so the final
/// value can only be produced once.
pub trait Reduce: Send {
    /// The type of data this reducer consumes.
    type Input: Send + 'static;

    /// The final aggregate.
    type Output: Send + 'static;

    /// Fold one item into the running state.
    fn consume(&mut self, item: Self::Input) -> Result<()>;

    /// Finalize and return the aggregate.
    fn finish(self) -> Result<Self::Output>
    where
        Self: Sized;

    /// Get the name of this reducer.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
