//! First-fit free list
//!
//! An unordered collection of [`FreeBlock`]s. Blocks are never merged:
//! a deallocated range stays a separate entry for the rest of the arena's
//! life, so fragmentation only grows.

use core::fmt;
use core::ptr::NonNull;

use crate::align::padding_for;

/// One unused, non-overlapping range of the arena buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
    /// First byte of the range
    pub start: NonNull<u8>,
    /// Length in bytes, always non-zero
    pub len: usize,
    /// Alignment the range was produced with. Informational only.
    pub align_hint: usize,
}

impl FreeBlock {
    /// Address of the first byte
    #[inline]
    pub fn addr(&self) -> usize {
        self.start.as_ptr().addr()
    }

    /// Address one past the last byte
    #[inline]
    pub fn end(&self) -> usize {
        self.addr() + self.len
    }

    /// Padding needed to place `bytes` at `alignment` in this block, if it fits.
    #[inline]
    fn fit(&self, bytes: usize, alignment: usize) -> Option<usize> {
        let padding = padding_for(self.addr(), alignment);
        let needed = padding.checked_add(bytes)?;
        (needed <= self.len).then_some(padding)
    }
}

impl fmt::Debug for FreeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeBlock")
            .field("start", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len)
            .field("align_hint", &self.align_hint)
            .finish()
    }
}

/// Result of carving an allocation out of a free block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Carved {
    pub ptr: NonNull<u8>,
    /// Bytes of leading gap returned to the list
    pub leading: usize,
    /// Bytes of trailing remainder returned to the list
    pub trailing: usize,
}

#[derive(Debug, Default)]
pub(crate) struct FreeList {
    blocks: Vec<FreeBlock>,
}

impl FreeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[FreeBlock] {
        &self.blocks
    }

    pub fn total_bytes(&self) -> usize {
        self.blocks.iter().map(|block| block.len).sum()
    }

    /// Track a new free range. Empty ranges are ignored.
    pub fn insert(&mut self, block: FreeBlock) {
        if block.len > 0 {
            self.blocks.push(block);
        }
    }

    /// Remove the first block that can hold `bytes` at `alignment` and
    /// re-insert whatever is left on either side of the allocation.
    ///
    /// `split_align` is recorded as the hint of the leftover blocks.
    pub fn take_first_fit(
        &mut self,
        bytes: usize,
        alignment: usize,
        split_align: usize,
    ) -> Option<Carved> {
        debug_assert!(bytes > 0);

        let (index, padding) = self
            .blocks
            .iter()
            .enumerate()
            .find_map(|(index, block)| block.fit(bytes, alignment).map(|pad| (index, pad)))?;

        let block = self.blocks.remove(index);
        let trailing = block.len - padding - bytes;

        // SAFETY: `fit` guarantees `padding + bytes <= block.len`, so both
        // offsets stay inside (or one past the end of) the block's range,
        // which lies inside a single live buffer.
        let (ptr, tail) = unsafe {
            let ptr = block.start.add(padding);
            (ptr, ptr.add(bytes))
        };

        self.insert(FreeBlock {
            start: block.start,
            len: padding,
            align_hint: split_align,
        });
        self.insert(FreeBlock {
            start: tail,
            len: trailing,
            align_hint: split_align,
        });

        Some(Carved {
            ptr,
            leading: padding,
            trailing,
        })
    }
}
