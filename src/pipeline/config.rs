//! Pipeline configuration.

use crate::elements::{DEFAULT_LIMIT, DEFAULT_SKIP};
use crate::error::{Error, Result};

/// Default number of pending items each link may hold.
pub const DEFAULT_CAPACITY: usize = 100_000;

/// Configuration for a pipeline run.
///
/// The defaults reproduce the production computation; tests shrink `limit`
/// and `skip` to keep fixtures small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Generator stops once its index exceeds this value.
    pub limit: i64,
    /// Distance an even generator index jumps before emission.
    pub skip: u32,
    /// Capacity of each of the two links.
    pub capacity: usize,
    /// Name used in spans, metric labels and thread names.
    pub name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: DEFAULT_SKIP,
            capacity: DEFAULT_CAPACITY,
            name: "tristage".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a config with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generator limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the generator skip distance.
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    /// Set the link capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the pipeline name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the configuration before any thread is started.
    ///
    /// A zero capacity would turn the links into rendezvous channels.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig(
                "link capacity must be at least 1".to_string(),
            ));
        }
        if self.name.is_empty() || self.name.contains('\0') {
            return Err(Error::InvalidConfig(format!(
                "invalid pipeline name {:?}",
                self.name
            )));
        }
        Ok(())
    }
}
