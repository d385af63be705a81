//! Residue-keyed scaling transform.

use crate::element::Transform;
use crate::error::Result;

/// Scale `value` by one more than its remainder modulo 3.
///
/// | `value mod 3` | result |
/// |---|---|
/// | 0 | `value * 1` |
/// | 1 | `value * 2` |
/// | 2 | `value * 3` |
///
/// The Euclidean remainder is used, so negative inputs also fall into
/// exactly one row. Multiplication wraps on overflow.
#[inline]
pub fn residue_scale(value: i64) -> i64 {
    value.wrapping_mul(1 + value.rem_euclid(3))
}

/// Middle stage: applies [`residue_scale`] to every item.
#[derive(Debug, Default, Clone)]
pub struct ResidueScale {
    transformed: u64,
}

impl ResidueScale {
    /// Create a new transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items transformed so far.
    pub fn transformed(&self) -> u64 {
        self.transformed
    }
}

impl Transform for ResidueScale {
    type Input = i64;
    type Output = i64;

    fn transform(&mut self, input: i64) -> Result<i64> {
        self.transformed += 1;
        Ok(residue_scale(input))
    }

    fn name(&self) -> &str {
        "residue-scale"
    }
}
