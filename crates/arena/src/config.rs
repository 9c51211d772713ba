//! Arena configuration

use crate::error::{ArenaError, ArenaResult};

/// Configuration for [`FixedArena`](crate::FixedArena)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Total size of the backing buffer in bytes. Fixed for the arena's lifetime.
    pub capacity: usize,

    /// Alignment of the backing buffer, and the alignment hint recorded on
    /// free blocks produced by splitting.
    pub base_align: usize,
}

impl ArenaConfig {
    /// Alignment of `max_align_t` on mainstream 64-bit targets.
    pub const DEFAULT_BASE_ALIGN: usize = 16;

    /// Configuration for an arena of `capacity` bytes with default alignment
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            base_align: Self::DEFAULT_BASE_ALIGN,
        }
    }

    /// Set the buffer alignment
    #[must_use = "builder methods must be chained or built"]
    pub const fn with_base_align(mut self, base_align: usize) -> Self {
        self.base_align = base_align;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> ArenaResult<()> {
        if self.capacity == 0 {
            return Err(ArenaError::invalid_config("capacity cannot be zero"));
        }

        if !self.base_align.is_power_of_two() {
            return Err(ArenaError::invalid_config(format!(
                "base alignment {} is not a power of two",
                self.base_align
            )));
        }

        if self.capacity > isize::MAX as usize - (self.base_align - 1) {
            return Err(ArenaError::invalid_config(format!(
                "capacity {} exceeds the maximum allocation size",
                self.capacity
            )));
        }

        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(4096)
    }
}
