//! Stage traits for tristage pipelines.
//!
//! - [`Source`]: produces items (the generator stage)
//! - [`Transform`]: maps each item to exactly one output (the middle stage)
//! - [`Reduce`]: folds every item into one final value (the last stage)
//!
//! # Design
//!
//! Stage methods are **synchronous** and know nothing about channels. The
//! runners in [`crate::pipeline`] own the links, drive each stage's state
//! machine and handle end-of-stream and backpressure.
//!
//! # Example
//!
//! ```rust
//! use tristage::element::Transform;
//! use tristage::Result;
//!
//! struct Negate;
//!
//! impl Transform for Negate {
//!     type Input = i64;
//!     type Output = i64;
//!
//!     fn transform(&mut self, input: i64) -> Result<i64> {
//!         Ok(-input)
//!     }
//! }
//! ```

mod traits;

pub use traits::{Reduce, Source, Transform};
