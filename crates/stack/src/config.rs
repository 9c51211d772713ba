//! Stack configuration

use crate::error::{StackError, StackResult};

/// Configuration for [`Stack`](crate::Stack)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    /// Elements reserved by the first storage request. Growth never goes
    /// below this either: the new capacity is `max(initial_capacity, capacity * 2)`.
    pub initial_capacity: usize,
}

impl StackConfig {
    /// Default initial capacity in elements
    pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

    /// Configuration with the default initial capacity
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Set the initial capacity
    #[must_use = "builder methods must be chained or built"]
    pub const fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> StackResult<()> {
        if self.initial_capacity == 0 {
            return Err(StackError::invalid_config(
                "initial_capacity must be at least 1",
            ));
        }
        Ok(())
    }

    /// Capacity to grow to from `current`
    pub(crate) fn next_capacity(&self, current: usize) -> Option<usize> {
        current
            .checked_mul(2)
            .map(|doubled| doubled.max(self.initial_capacity))
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new()
    }
}
