//! The pluggable allocator abstraction
//!
//! Containers in this workspace never touch the global allocator for their
//! element storage. They borrow a [`MemoryResource`] and route every
//! request through it.
//!
//! # Safety
//!
//! `MemoryResource` is an unsafe trait. Implementors promise that:
//! - a successful `allocate(bytes, alignment)` with `bytes > 0` returns a
//!   pointer valid for reads and writes of `bytes` bytes, aligned to
//!   `alignment`, that does not overlap any other live allocation;
//! - the memory stays valid until it is passed back to `deallocate` or the
//!   resource is dropped;
//! - `is_equal` only returns `true` for resources that can free each
//!   other's allocations.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::ArenaResult;

/// A source of raw memory blocks.
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe trait MemoryResource {
    /// Allocates `bytes` bytes aligned to `alignment`.
    ///
    /// A zero-byte request succeeds with a dangling, suitably aligned
    /// pointer that must never be dereferenced.
    fn allocate(&self, bytes: usize, alignment: usize) -> ArenaResult<NonNull<u8>>;

    /// Returns a block to the resource.
    ///
    /// # Safety
    /// - `ptr` must come from `allocate` on this resource (or one that
    ///   `is_equal` to it) and must not have been deallocated already
    /// - `bytes` and `alignment` must match the original request exactly
    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, alignment: usize);

    /// Whether memory allocated from `self` may be released through `other`.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool;

    /// Allocates memory described by `layout`
    #[inline]
    fn allocate_layout(&self, layout: Layout) -> ArenaResult<NonNull<u8>> {
        self.allocate(layout.size(), layout.align())
    }

    /// Deallocates memory described by `layout`
    ///
    /// # Safety
    /// Same requirements as [`deallocate`](Self::deallocate).
    #[inline]
    unsafe fn deallocate_layout(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { self.deallocate(ptr, layout.size(), layout.align()) }
    }
}

// SAFETY: forwards every call to `R`, so `R`'s guarantees carry over.
unsafe impl<R: MemoryResource + ?Sized> MemoryResource for &R {
    #[inline]
    fn allocate(&self, bytes: usize, alignment: usize) -> ArenaResult<NonNull<u8>> {
        (**self).allocate(bytes, alignment)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, alignment: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).deallocate(ptr, bytes, alignment) }
    }

    #[inline]
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        (**self).is_equal(other)
    }
}

/// Dangling, non-null pointer aligned to `alignment`, returned for
/// zero-byte requests.
#[inline]
pub(crate) fn empty_allocation(alignment: usize) -> NonNull<u8> {
    debug_assert!(alignment.is_power_of_two());
    // `alignment` is a non-zero power of two, so the address is non-null.
    NonNull::new(core::ptr::without_provenance_mut(alignment)).unwrap_or(NonNull::dangling())
}
