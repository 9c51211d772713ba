//! Fixed-capacity first-fit arena
//!
//! # Safety
//!
//! The arena owns one buffer obtained from [`System`] at construction and
//! released in `Drop`. All pointers it hands out are derived from that
//! buffer's pointer, so they carry its provenance.
//!
//! ## Invariants
//!
//! - Every free block lies inside `[base, base + capacity)`
//! - Free blocks and live allocations partition the buffer exactly: no
//!   overlap, no gap
//! - The free list is only touched through `RefCell::borrow_mut` inside a
//!   single method call, so no borrow outlives an operation
//!
//! ## Thread Safety
//!
//! None. `RefCell` and `NonNull` make the arena `!Sync` and `!Send`.

use core::alloc::{GlobalAlloc, Layout};
use core::cell::RefCell;
use core::fmt;
use core::ptr::{self, NonNull};
use std::alloc::System;

use tracing::{debug, trace};

use crate::config::ArenaConfig;
use crate::error::{ArenaError, ArenaResult};
use crate::free_list::{FreeBlock, FreeList};
use crate::resource::{MemoryResource, empty_allocation};

/// Memory arena carving variable-size, variable-alignment blocks out of one
/// preallocated buffer.
///
/// Allocation scans the free list for the first block that can hold the
/// request once its start is rounded up to the requested alignment.
/// Deallocation pushes the returned range back as a separate free block;
/// neighbouring free blocks are never merged, so a long-running arena
/// fragments.
///
/// # Memory Layout
/// ```text
/// [base]--[free]--[alloc a]--[gap]--[alloc b]--[free remainder]--[end]
/// ```
///
/// # Examples
///
/// ```
/// use fixmem_arena::FixedArena;
///
/// let arena = FixedArena::new(1024)?;
/// let ptr = arena.allocate(64, 16)?;
/// assert_eq!(ptr.as_ptr().addr() % 16, 0);
/// unsafe { arena.deallocate(ptr, 64, 16) };
/// # Ok::<(), fixmem_arena::ArenaError>(())
/// ```
pub struct FixedArena {
    buffer: NonNull<u8>,
    layout: Layout,
    free: RefCell<FreeList>,
}

impl FixedArena {
    /// Creates an arena of `capacity` bytes with the default base alignment
    pub fn new(capacity: usize) -> ArenaResult<Self> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Creates an arena with custom configuration
    pub fn with_config(config: ArenaConfig) -> ArenaResult<Self> {
        config.validate()?;

        let layout = Layout::from_size_align(config.capacity, config.base_align)
            .map_err(|e| ArenaError::invalid_config(e.to_string()))?;

        // SAFETY: `validate` rejected zero capacity, so `layout` is non-zero sized.
        let raw = unsafe { System.alloc(layout) };
        let buffer =
            NonNull::new(raw).ok_or_else(|| ArenaError::out_of_memory_with_layout(layout))?;

        let mut free = FreeList::new();
        free.insert(FreeBlock {
            start: buffer,
            len: layout.size(),
            align_hint: layout.align(),
        });

        debug!(
            capacity = layout.size(),
            base_align = layout.align(),
            "arena created"
        );

        Ok(Self {
            buffer,
            layout,
            free: RefCell::new(free),
        })
    }

    /// Total size of the backing buffer in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Alignment of the backing buffer
    #[inline]
    pub fn base_align(&self) -> usize {
        self.layout.align()
    }

    /// Whether `ptr` points into the backing buffer
    #[inline]
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let start = self.buffer.as_ptr().addr();
        (start..start + self.capacity()).contains(&ptr.as_ptr().addr())
    }

    /// Snapshot of the free list in scan order
    pub fn free_blocks(&self) -> Vec<FreeBlock> {
        self.free.borrow().blocks().to_vec()
    }

    /// Sum of all free block lengths
    ///
    /// Equal to the capacity once every allocation has been returned, even
    /// when fragmentation stops a full-capacity request from fitting.
    pub fn free_bytes(&self) -> usize {
        self.free.borrow().total_bytes()
    }

    /// Carve `bytes` bytes aligned to `alignment` out of the first block that fits.
    pub fn allocate(&self, bytes: usize, alignment: usize) -> ArenaResult<NonNull<u8>> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(ArenaError::invalid_alignment(alignment));
        }

        if bytes == 0 {
            return Ok(empty_allocation(alignment));
        }

        let carved = self
            .free
            .borrow_mut()
            .take_first_fit(bytes, alignment, self.base_align())
            .ok_or_else(|| ArenaError::out_of_memory(bytes, alignment))?;

        trace!(
            offset = self.offset_of(carved.ptr),
            bytes,
            alignment,
            leading = carved.leading,
            trailing = carved.trailing,
            "arena allocate"
        );

        Ok(carved.ptr)
    }

    /// Return a block to the free list without merging it with neighbours.
    ///
    /// # Safety
    /// - `ptr` must have been returned by [`allocate`](Self::allocate) on
    ///   this arena and not deallocated since
    /// - `bytes` must equal the size passed to `allocate`
    pub unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, alignment: usize) {
        if bytes == 0 {
            return;
        }

        debug_assert!(self.contains(ptr), "pointer does not belong to this arena");
        debug_assert!(
            ptr.as_ptr().addr() + bytes <= self.buffer.as_ptr().addr() + self.capacity(),
            "deallocated range overruns the arena"
        );

        trace!(offset = self.offset_of(ptr), bytes, alignment, "arena deallocate");

        self.free.borrow_mut().insert(FreeBlock {
            start: ptr,
            len: bytes,
            align_hint: alignment,
        });
    }

    /// Identity comparison: two arenas are equal only if they are the same object.
    #[inline]
    pub fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        ptr::addr_eq(self as *const Self, other as *const dyn MemoryResource)
    }

    #[inline]
    fn offset_of(&self, ptr: NonNull<u8>) -> usize {
        ptr.as_ptr().addr().wrapping_sub(self.buffer.as_ptr().addr())
    }
}

// SAFETY: allocations are carved from disjoint free blocks of a buffer the
// arena owns until drop, aligned via `padding_for`, and zero-byte requests
// get an aligned dangling pointer. Equality is identity.
unsafe impl MemoryResource for FixedArena {
    #[inline]
    fn allocate(&self, bytes: usize, alignment: usize) -> ArenaResult<NonNull<u8>> {
        Self::allocate(self, bytes, alignment)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, alignment: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { Self::deallocate(self, ptr, bytes, alignment) }
    }

    #[inline]
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        Self::is_equal(self, other)
    }
}

impl PartialEq for FixedArena {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for FixedArena {}

impl fmt::Debug for FixedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let free = self.free.borrow();
        f.debug_struct("FixedArena")
            .field("capacity", &self.capacity())
            .field("base_align", &self.base_align())
            .field("free_bytes", &free.total_bytes())
            .field("free_blocks", &free.blocks().len())
            .finish()
    }
}

impl Drop for FixedArena {
    fn drop(&mut self) {
        debug!(
            capacity = self.capacity(),
            free_bytes = self.free.get_mut().total_bytes(),
            "arena released"
        );

        // SAFETY: `buffer` was allocated by `System` with `layout` in
        // `with_config` and is freed exactly once, here.
        unsafe { System.dealloc(self.buffer.as_ptr(), self.layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    /// Every free block and live range is inside the buffer, nothing
    /// overlaps and the lengths add up to the capacity.
    fn assert_partition(arena: &FixedArena, live: &[(NonNull<u8>, usize)]) {
        let base = arena.buffer.as_ptr().addr();
        let mut ranges: Vec<(usize, usize)> = arena
            .free_blocks()
            .iter()
            .map(|block| (block.addr() - base, block.len))
            .chain(live.iter().map(|(ptr, len)| (ptr.as_ptr().addr() - base, *len)))
            .collect();
        ranges.sort_unstable();

        let mut cursor = 0;
        for (offset, len) in ranges {
            assert_eq!(offset, cursor, "gap or overlap at offset {cursor}");
            cursor = offset + len;
        }
        assert_eq!(cursor, arena.capacity());
    }

    #[test]
    fn new_arena_has_one_block_spanning_buffer() {
        let arena = FixedArena::new(1024).unwrap();
        let blocks = arena.free_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, arena.buffer);
        assert_eq!(blocks[0].len, 1024);
        assert_eq!(blocks[0].align_hint, ArenaConfig::DEFAULT_BASE_ALIGN);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            FixedArena::new(0),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(3, 2)]
    #[case(24, 8)]
    #[case(100, 64)]
    #[case(7, 256)]
    fn allocation_is_aligned(#[case] bytes: usize, #[case] alignment: usize) {
        let arena = FixedArena::new(2048).unwrap();
        // knock the free block off its natural alignment first
        let skew = arena.allocate(1, 1).unwrap();
        let ptr = arena.allocate(bytes, alignment).unwrap();

        assert_eq!(ptr.as_ptr().addr() % alignment, 0);
        assert!(arena.contains(ptr));
        assert_partition(&arena, &[(skew, 1), (ptr, bytes)]);
    }

    #[test]
    fn zero_byte_request_returns_sentinel() {
        let arena = FixedArena::new(64).unwrap();
        let ptr = arena.allocate(0, 32).unwrap();

        assert_eq!(ptr.as_ptr().addr() % 32, 0);
        assert!(!arena.contains(ptr));
        assert_eq!(arena.free_bytes(), 64);

        // no-op
        unsafe { arena.deallocate(ptr, 0, 32) };
        assert_eq!(arena.free_blocks().len(), 1);
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(48)]
    fn bad_alignment_is_rejected(#[case] alignment: usize) {
        let arena = FixedArena::new(64).unwrap();
        assert_eq!(
            arena.allocate(8, alignment),
            Err(ArenaError::InvalidAlignment { alignment })
        );
    }

    #[test]
    fn exhaustion_reports_out_of_memory() {
        let arena = FixedArena::new(128).unwrap();
        let a = arena.allocate(100, 8).unwrap();

        assert_eq!(
            arena.allocate(64, 8),
            Err(ArenaError::OutOfMemory {
                requested: 64,
                alignment: 8
            })
        );
        // failed request leaves the free list alone
        assert_partition(&arena, &[(a, 100)]);
    }

    #[test]
    fn whole_buffer_fits_exactly() {
        let arena = FixedArena::new(256).unwrap();
        let ptr = arena.allocate(256, 16).unwrap();
        assert!(arena.free_blocks().is_empty());
        assert!(arena.allocate(1, 1).is_err());

        unsafe { arena.deallocate(ptr, 256, 16) };
        assert_eq!(arena.free_bytes(), 256);
        assert!(arena.allocate(256, 1).is_ok());
    }

    #[test]
    fn freed_block_is_reused() {
        let arena = FixedArena::new(96).unwrap();
        let a = arena.allocate(32, 16).unwrap();
        let b = arena.allocate(32, 16).unwrap();
        let c = arena.allocate(32, 16).unwrap();
        assert!(arena.allocate(1, 1).is_err());

        unsafe { arena.deallocate(b, 32, 16) };
        let again = arena.allocate(32, 16).unwrap();
        assert_eq!(again, b);
        assert_partition(&arena, &[(a, 32), (again, 32), (c, 32)]);
    }

    #[test]
    fn adjacent_frees_are_not_coalesced() {
        let arena = FixedArena::new(64).unwrap();
        let a = arena.allocate(32, 16).unwrap();
        let b = arena.allocate(32, 16).unwrap();

        unsafe {
            arena.deallocate(a, 32, 16);
            arena.deallocate(b, 32, 16);
        }

        // every byte is free again, but as two separate blocks
        assert_eq!(arena.free_bytes(), 64);
        assert_eq!(arena.free_blocks().len(), 2);
        assert_eq!(
            arena.allocate(64, 1),
            Err(ArenaError::OutOfMemory {
                requested: 64,
                alignment: 1
            })
        );
    }

    #[test]
    fn deallocated_block_keeps_caller_alignment_hint() {
        let arena = FixedArena::new(64).unwrap();
        let a = arena.allocate(8, 8).unwrap();
        unsafe { arena.deallocate(a, 8, 8) };

        let hint = arena
            .free_blocks()
            .iter()
            .find(|block| block.start == a)
            .map(|block| block.align_hint);
        assert_eq!(hint, Some(8));
    }

    #[test]
    fn equality_is_identity() {
        let a = FixedArena::new(128).unwrap();
        let b = FixedArena::new(128).unwrap();

        assert!(a.is_equal(&a));
        assert!(!a.is_equal(&b));
        assert_eq!(a, a);
        assert_ne!(a, b);

        let through_ref: &dyn MemoryResource = &&a;
        assert!(through_ref.is_equal(&a));
    }

    #[test]
    fn custom_base_alignment_is_honoured() {
        let arena = FixedArena::with_config(ArenaConfig::new(512).with_base_align(256)).unwrap();
        assert_eq!(arena.buffer.as_ptr().addr() % 256, 0);
        assert_eq!(arena.base_align(), 256);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Alloc { bytes: usize, align_shift: u32 },
        Free { pick: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1usize..96, 0u32..7).prop_map(|(bytes, align_shift)| Op::Alloc { bytes, align_shift }),
            any::<usize>().prop_map(|pick| Op::Free { pick }),
        ]
    }

    proptest! {
        #[test]
        fn partition_holds_under_random_ops(ops in prop::collection::vec(op(), 1..64)) {
            let arena = FixedArena::new(1024).unwrap();
            let mut live: Vec<(NonNull<u8>, usize, usize)> = Vec::new();

            for op in ops {
                match op {
                    Op::Alloc { bytes, align_shift } => {
                        let alignment = 1usize << align_shift;
                        if let Ok(ptr) = arena.allocate(bytes, alignment) {
                            prop_assert_eq!(ptr.as_ptr().addr() % alignment, 0);
                            live.push((ptr, bytes, alignment));
                        }
                    }
                    Op::Free { pick } => {
                        if !live.is_empty() {
                            let (ptr, bytes, alignment) = live.swap_remove(pick % live.len());
                            unsafe { arena.deallocate(ptr, bytes, alignment) };
                        }
                    }
                }
                let ranges: Vec<(NonNull<u8>, usize)> =
                    live.iter().map(|(ptr, bytes, _)| (*ptr, *bytes)).collect();
                assert_partition(&arena, &ranges);
            }

            for (ptr, bytes, alignment) in live.drain(..) {
                unsafe { arena.deallocate(ptr, bytes, alignment) };
            }
            prop_assert_eq!(arena.free_bytes(), arena.capacity());
        }
    }
}
