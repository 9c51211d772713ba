//! # fixmem-stack
//!
//! A growable LIFO stack that never touches the global allocator for its
//! element storage. Every block comes from a borrowed
//! [`MemoryResource`](fixmem_arena::MemoryResource), typically a
//! [`FixedArena`](fixmem_arena::FixedArena) shared with other containers.
//!
//! ## Quick Start
//!
//! ```rust
//! use fixmem_arena::FixedArena;
//! use fixmem_stack::{Stack, StackError};
//!
//! let arena = FixedArena::new(1024)?;
//! let mut stack = Stack::new(&arena)?;
//! for value in [10, 20, 30, 40, 50] {
//!     stack.push(value)?;
//! }
//! stack.pop()?;
//! stack.pop()?;
//! assert_eq!(stack.top(), Ok(&30));
//! assert_eq!(stack.iter().copied().collect::<Vec<_>>(), [10, 20, 30]);
//!
//! stack.clear();
//! assert_eq!(stack.pop(), Err(StackError::Underflow));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Growth doubles the capacity (never below
//! [`StackConfig::initial_capacity`]) and releases the old block back to
//! the resource. Storage is never shrunk by `pop`.

#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod iter;
mod stack;

pub use config::StackConfig;
pub use error::{StackError, StackResult};
pub use iter::{Iter, IterMut};
pub use stack::Stack;
