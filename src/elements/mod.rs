//! Built-in pipeline stages.
//!
//! ## Sources
//! - [`Generator`]: the skip-ahead integer sequence
//! - [`IterSource`]: drains any iterator (see [`from_iter`])
//!
//! ## Transforms
//! - [`ResidueScale`]: scales each value by one more than its residue mod 3
//! - [`Map`]: applies a closure (see [`map`])
//!
//! ## Reducers
//! - [`Sum`]: running `i64` total
//! - [`Collect`]: gathers every item into a `Vec`

mod adapters;
mod collect;
mod generator;
mod residue;
mod sum;

// Sources
pub use adapters::{IterSource, from_iter};
pub use generator::{DEFAULT_LIMIT, DEFAULT_SKIP, Generator};

// Transforms
pub use adapters::{Map, map};
pub use residue::{ResidueScale, residue_scale};

// Reducers
pub use collect::{Collect, collect};
pub use sum::Sum;
