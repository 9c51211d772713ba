//! Error types for the arena allocator
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use core::alloc::Layout;
use thiserror::Error;

/// Errors returned by [`MemoryResource`](crate::MemoryResource) implementations.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// No free block can hold the request, or the backing buffer could not
    /// be obtained from the system.
    #[error("out of memory: {requested} bytes with {alignment} byte alignment")]
    OutOfMemory { requested: usize, alignment: usize },

    #[error("invalid alignment: {alignment} (must be a non-zero power of two)")]
    InvalidAlignment { alignment: usize },

    #[error("invalid arena configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ArenaError {
    /// Create an out-of-memory error
    #[must_use]
    pub fn out_of_memory(requested: usize, alignment: usize) -> Self {
        Self::OutOfMemory {
            requested,
            alignment,
        }
    }

    /// Create an out-of-memory error from a layout
    #[must_use]
    pub fn out_of_memory_with_layout(layout: Layout) -> Self {
        Self::out_of_memory(layout.size(), layout.align())
    }

    /// Create invalid alignment error
    #[must_use]
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether the same request may succeed later.
    ///
    /// Only exhaustion is retryable, and only after other allocations from
    /// the same arena have been released.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfMemory { .. } => "MEM:ARENA:OOM",
            Self::InvalidAlignment { .. } => "MEM:ARENA:ALIGN",
            Self::InvalidConfig { .. } => "MEM:ARENA:CONFIG",
        }
    }
}

/// Result type for arena operations
pub type ArenaResult<T> = core::result::Result<T, ArenaError>;
