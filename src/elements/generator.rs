//! Skip-ahead integer generator.

use crate::element::Source;
use crate::error::Result;

/// Default upper bound on the generator index.
pub const DEFAULT_LIMIT: i64 = 1_000_000_000;

/// Default distance an even index jumps before it is emitted.
pub const DEFAULT_SKIP: u32 = 99;

/// Produces the raw integer sequence.
///
/// Starting at index 1, while the index does not exceed `limit`:
///
/// 1. if the index is even, advance it by `skip`;
/// 2. emit the index;
/// 3. increment the index by one.
///
/// The limit is only checked at the top of each step, so the last emitted
/// value may lie past `limit`. With the defaults the sequence is
/// `1, 101, 201, ..., 1_000_000_001`.
///
/// # Example
///
/// ```rust
/// use tristage::elements::Generator;
///
/// let values: Vec<i64> = Generator::new(6, 1).collect();
/// assert_eq!(values, vec![1, 3, 5, 7]);
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    next: Option<i64>,
    limit: i64,
    skip: i64,
    emitted: u64,
}

impl Generator {
    /// Create a generator with the given limit and skip distance.
    pub fn new(limit: i64, skip: u32) -> Self {
        Self {
            next: Some(1),
            limit,
            skip: i64::from(skip),
            emitted: 0,
        }
    }

    /// Number of values emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Whether the sequence has ended.
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none_or(|index| index > self.limit)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_SKIP)
    }
}

impl Iterator for Generator {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let mut index = self.next.filter(|&index| index <= self.limit)?;

        if index % 2 == 0 {
            // An index pushed past i64::MAX ends the sequence.
            let Some(advanced) = index.checked_add(self.skip) else {
                self.next = None;
                return None;
            };
            index = advanced;
        }

        self.next = index.checked_add(1);
        self.emitted += 1;
        Some(index)
    }
}

impl Source for Generator {
    type Output = i64;

    fn produce(&mut self) -> Result<Option<i64>> {
        Ok(self.next())
    }

    fn name(&self) -> &str {
        "generator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_limit_with_default_skip() {
        let values: Vec<i64> = Generator::new(5, DEFAULT_SKIP).collect();
        assert_eq!(values, vec![1, 101]);
    }

    #[test]
    fn test_skip_one() {
        let values: Vec<i64> = Generator::new(6, 1).collect();
        assert_eq!(values, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_skip_zero_emits_every_index() {
        let values: Vec<i64> = Generator::new(10, 0).collect();
        assert_eq!(values, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_limit_below_start_is_empty() {
        let mut generator = Generator::new(0, DEFAULT_SKIP);
        assert!(generator.is_exhausted());
        assert_eq!(generator.next(), None);
        assert_eq!(generator.emitted(), 0);
    }

    #[test]
    fn test_limit_one() {
        let values: Vec<i64> = Generator::new(1, DEFAULT_SKIP).collect();
        assert_eq!(values, vec![1]);
    }

    #[test]
    fn test_last_value_may_exceed_limit() {
        let values: Vec<i64> = Generator::new(1000, DEFAULT_SKIP).collect();
        assert_eq!(values.len(), 11);
        assert_eq!(values.first(), Some(&1));
        assert_eq!(values.last(), Some(&1001));
        assert!(values.windows(2).all(|w| w[1] - w[0] == 100));
    }

    #[test]
    fn test_parity_checked_before_emit() {
        // Every even index is advanced before emission, so with an odd skip
        // no emitted value is even.
        assert!(Generator::new(10_000, 3).all(|v| v % 2 == 1));
    }

    #[test]
    fn test_emitted_counter() {
        let mut generator = Generator::new(1000, DEFAULT_SKIP);
        generator.by_ref().for_each(drop);
        assert_eq!(generator.emitted(), 11);
        assert!(generator.is_exhausted());
    }

    #[test]
    fn test_stays_exhausted() {
        let mut generator = Generator::new(2, DEFAULT_SKIP);
        assert_eq!(generator.produce().unwrap(), Some(1));
        assert_eq!(generator.produce().unwrap(), Some(101));
        assert_eq!(generator.produce().unwrap(), None);
        assert_eq!(generator.produce().unwrap(), None);
    }

    #[test]
    fn test_overflow_ends_sequence() {
        let mut generator = Generator::new(i64::MAX, u32::MAX);
        generator.next = Some(i64::MAX - 1);
        assert_eq!(generator.next(), None);
        assert!(generator.is_exhausted());
    }

    #[test]
    fn test_production_sequence_shape() {
        let generator = Generator::default();
        let head: Vec<i64> = generator.take(4).collect();
        assert_eq!(head, vec![1, 101, 201, 301]);
    }
}
