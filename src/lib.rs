//! # tristage
//!
//! A three-stage concurrent pipeline that reduces a generated integer
//! sequence to a single total.
//!
//! - **Generator**: emits `1, 101, 201, ...` (every even index jumps ahead by
//!   a fixed skip before it is emitted) until the index passes a limit
//! - **Transformer**: scales each value by one more than its residue mod 3
//! - **Reducer**: sums the mapped values and delivers the total exactly once
//!
//! Stages run on separate threads and talk only through bounded kanal links
//! with in-band end-of-stream, plus a one-shot handoff for the final value.
//!
//! ## Quick Start
//!
//! ```rust
//! use tristage::prelude::*;
//!
//! let config = PipelineConfig::new().with_limit(1000);
//! let total = Pipeline::standard(config).run()?;
//! assert_eq!(total, 11723);
//! # Ok::<(), tristage::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod element;
pub mod elements;
pub mod error;
pub mod link;
pub mod observability;
pub mod pipeline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::element::{Reduce, Source, Transform};
    pub use crate::elements::{Collect, Generator, ResidueScale, Sum};
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineReport};
}

pub use error::{Error, Result};
