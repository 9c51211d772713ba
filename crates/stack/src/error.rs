//! Stack error types

use fixmem_arena::ArenaError;
use thiserror::Error;

/// Errors returned by [`Stack`](crate::Stack) operations.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// `pop`, `top` or `top_mut` on an empty stack.
    #[error("stack underflow: the stack is empty")]
    Underflow,

    /// The memory resource could not supply storage.
    #[error("stack storage allocation failed: {0}")]
    Alloc(#[from] ArenaError),

    #[error("capacity overflow: storage for {requested} elements exceeds the address space")]
    CapacityOverflow { requested: usize },

    #[error("invalid stack configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl StackError {
    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether the failed operation may succeed later without changing the
    /// stack itself (storage may be freed elsewhere in the resource).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Alloc(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for stack operations
pub type StackResult<T> = core::result::Result<T, StackError>;
