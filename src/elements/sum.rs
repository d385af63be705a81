//! Summing reducer.

use crate::element::Reduce;
use crate::error::Result;

/// Final stage: folds items into a running `i64` total.
///
/// The total starts at zero and uses wrapping addition, so the fold is
/// total over every input sequence.
#[derive(Debug, Default, Clone)]
pub struct Sum {
    total: i64,
    consumed: u64,
}

impl Sum {
    /// Create a reducer with a zero total.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current running total.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Number of items folded so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl Reduce for Sum {
    type Input = i64;
    type Output = i64;

    fn consume(&mut self, item: i64) -> Result<()> {
        self.total = self.total.wrapping_add(item);
        self.consumed += 1;
        Ok(())
    }

    fn finish(self) -> Result<i64> {
        Ok(self.total)
    }

    fn name(&self) -> &str {
        "sum"
    }
}
