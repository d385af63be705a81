//! Adapters turning iterators and closures into stages.

use std::marker::PhantomData;

use crate::element::{Source, Transform};
use crate::error::Result;

// ============================================================================
// Iterator Source
// ============================================================================

/// A source that drains an iterator.
pub struct IterSource<I: Iterator> {
    iter: I,
}

impl<I: Iterator> IterSource<I> {
    /// Create a new iterator source.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I> Source for IterSource<I>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
{
    type Output = I::Item;

    fn produce(&mut self) -> Result<Option<I::Item>> {
        Ok(self.iter.next())
    }

    fn name(&self) -> &str {
        "iter-source"
    }
}

/// Create a source from an iterator.
pub fn from_iter<I>(iter: I) -> IterSource<I::IntoIter>
where
    I: IntoIterator,
    I::IntoIter: Send,
    I::Item: Send + 'static,
{
    IterSource::new(iter.into_iter())
}

// ============================================================================
// Map Transform
// ============================================================================

/// A transform that applies a function to each item.
///
/// # Example
///
/// ```rust
/// use tristage::element::Transform;
/// use tristage::elements::map;
///
/// let mut double = map(|x: i64| x * 2);
/// assert_eq!(double.transform(21).unwrap(), 42);
/// ```
pub struct Map<F, In, Out> {
    f: F,
    _in: PhantomData<fn(In)>,
    _out: PhantomData<fn() -> Out>,
}

impl<F, In, Out> Map<F, In, Out> {
    /// Create a new map transform.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _in: PhantomData,
            _out: PhantomData,
        }
    }
}

impl<F, In, Out> Transform for Map<F, In, Out>
where
    F: FnMut(In) -> Out + Send,
    In: Send + 'static,
    Out: Send + 'static,
{
    type Input = In;
    type Output = Out;

    fn transform(&mut self, input: In) -> Result<Out> {
        Ok((self.f)(input))
    }

    fn name(&self) -> &str {
        "map"
    }
}

/// Create a map transform.
pub fn map<F, In, Out>(f: F) -> Map<F, In, Out>
where
    F: FnMut(In) -> Out + Send,
    In: Send + 'static,
    Out: Send + 'static,
{
    Map::new(f)
}
