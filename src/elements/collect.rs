//! Collecting reducer for inspecting what reached the last stage.

use std::marker::PhantomData;

use crate::element::Reduce;
use crate::error::Result;

/// Reducer that gathers every item into a `Vec`, in arrival order.
///
/// Drop-in replacement for [`Sum`](super::Sum) when the individual items
/// matter, e.g. to check that nothing was lost or duplicated.
pub struct Collect<T> {
    items: Vec<T>,
    _t: PhantomData<fn(T)>,
}

impl<T> Collect<T> {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _t: PhantomData,
        }
    }

    /// Items collected so far.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Collect<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Reduce for Collect<T> {
    type Input = T;
    type Output = Vec<T>;

    fn consume(&mut self, item: T) -> Result<()> {
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> Result<Vec<T>> {
        Ok(self.items)
    }

    fn name(&self) -> &str {
        "collect"
    }
}

/// Create a collecting reducer.
pub fn collect<T: Send + 'static>() -> Collect<T> {
    Collect::new()
}
