//! # fixmem-arena
//!
//! Fixed-capacity memory arena and the allocator abstraction the rest of
//! the workspace allocates through.
//!
//! - [`FixedArena`]: one preallocated buffer, first-fit free list, arbitrary
//!   size and power-of-two alignment per request. Never grows.
//! - [`MemoryResource`]: the trait containers borrow to get storage.
//!
//! ## Quick Start
//!
//! ```rust
//! use fixmem_arena::{FixedArena, MemoryResource};
//!
//! fn carve(resource: &dyn MemoryResource) -> fixmem_arena::ArenaResult<()> {
//!     let ptr = resource.allocate(128, 8)?;
//!     unsafe { resource.deallocate(ptr, 128, 8) };
//!     Ok(())
//! }
//!
//! let arena = FixedArena::new(4096)?;
//! carve(&arena)?;
//! # Ok::<(), fixmem_arena::ArenaError>(())
//! ```
//!
//! ## Limitations
//!
//! Freed blocks are never merged with their neighbours. After every
//! allocation has been returned, [`FixedArena::free_bytes`] equals the
//! capacity, but a single request for the whole capacity can still fail.
//!
//! The arena is single-threaded: it is neither `Send` nor `Sync`.

#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod align;
mod arena;
pub mod config;
pub mod error;
mod free_list;
pub mod resource;

pub use arena::FixedArena;
pub use config::ArenaConfig;
pub use error::{ArenaError, ArenaResult};
pub use free_list::FreeBlock;
pub use resource::MemoryResource;
