//! Allocator-backed LIFO stack
//!
//! # Safety
//!
//! The stack manages a raw array obtained from its [`MemoryResource`]:
//!
//! ## Invariants
//!
//! - `ptr` points to storage for `cap` elements obtained from `resource`
//!   with `Layout::array::<T>(cap)`, or is dangling when `cap == 0` or `T`
//!   is zero-sized
//! - Slots `[0, len)` are initialised, slots `[len, cap)` are not
//! - Growth moves elements bitwise into fresh storage; the old slots are
//!   never read or dropped afterwards, then the old block is released
//! - Storage is released to the same resource exactly once, on growth or drop

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};
use core::slice;

use fixmem_arena::{FixedArena, MemoryResource};
use tracing::{debug, trace};

use crate::config::StackConfig;
use crate::error::{StackError, StackResult};
use crate::iter::{Iter, IterMut};

/// Growable LIFO stack whose element storage comes only from a borrowed
/// [`MemoryResource`].
///
/// The stack does not own the resource; the `'a` borrow keeps the resource
/// alive for as long as the stack exists. Several stacks may share one
/// resource.
///
/// Index 0 is the bottom of the stack, `len() - 1` the top. Iteration runs
/// bottom to top. References into the stack do not survive a push that
/// grows the storage; the borrow checker enforces this.
///
/// # Examples
///
/// ```
/// use fixmem_arena::FixedArena;
/// use fixmem_stack::Stack;
///
/// let arena = FixedArena::new(1024)?;
/// let mut stack = Stack::new(&arena)?;
/// stack.push(10)?;
/// stack.push(20)?;
/// assert_eq!(stack.top(), Ok(&20));
/// assert_eq!(stack.pop(), Ok(20));
/// assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![10]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Stack<'a, T, R: MemoryResource + ?Sized = FixedArena> {
    resource: &'a R,
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    config: StackConfig,
    _owns: PhantomData<T>,
}

impl<'a, T, R: MemoryResource + ?Sized> Stack<'a, T, R> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates a stack and reserves the default initial capacity from `resource`
    pub fn new(resource: &'a R) -> StackResult<Self> {
        Self::with_config(resource, StackConfig::default())
    }

    /// Creates a stack with custom configuration
    pub fn with_config(resource: &'a R, config: StackConfig) -> StackResult<Self> {
        config.validate()?;

        let mut stack = Self::unallocated_with(resource, config);
        if !Self::IS_ZST {
            stack.reallocate(config.initial_capacity)?;
        }
        Ok(stack)
    }

    /// Creates a stack without storage.
    ///
    /// Nothing is requested from `resource` until the first push, which
    /// reserves the initial capacity through the regular growth path.
    pub fn unallocated(resource: &'a R) -> Self {
        Self::unallocated_with(resource, StackConfig::default())
    }

    fn unallocated_with(resource: &'a R, config: StackConfig) -> Self {
        Self {
            resource,
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            config,
            _owns: PhantomData,
        }
    }

    /// The resource this stack allocates from
    #[inline]
    pub fn resource(&self) -> &'a R {
        self.resource
    }

    /// Number of elements on the stack
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current storage can hold without growing
    #[inline]
    pub fn capacity(&self) -> usize {
        if Self::IS_ZST { usize::MAX } else { self.cap }
    }

    /// Pushes `value` on top, growing the storage first if it is full.
    ///
    /// If growth fails the stack is left unchanged and `value` is dropped.
    /// Use [`try_push`](Self::try_push) to get the value back instead.
    pub fn push(&mut self, value: T) -> StackResult<()> {
        self.reserve_for_push()?;
        // SAFETY: `reserve_for_push` guarantees `len < capacity`, so slot
        // `len` is in bounds and uninitialised.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Like [`push`](Self::push), but hands `value` back on failure.
    pub fn try_push(&mut self, value: T) -> Result<(), (T, StackError)> {
        if let Err(err) = self.reserve_for_push() {
            return Err((value, err));
        }
        // SAFETY: as in `push`.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the top element and returns it. Storage is never shrunk.
    pub fn pop(&mut self) -> StackResult<T> {
        if self.len == 0 {
            return Err(StackError::Underflow);
        }
        self.len -= 1;
        // SAFETY: slot `len` was initialised and now lies outside the live
        // range, so it is read exactly once.
        Ok(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Top element
    pub fn top(&self) -> StackResult<&T> {
        self.as_slice().last().ok_or(StackError::Underflow)
    }

    /// Mutable top element
    pub fn top_mut(&mut self) -> StackResult<&mut T> {
        self.as_mut_slice().last_mut().ok_or(StackError::Underflow)
    }

    /// Live elements, bottom first
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` is non-null and aligned (dangling only when no
        // element is live or `T` is zero-sized) and slots `[0, len)` are
        // initialised.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Live elements, bottom first
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` makes the access unique.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Iterates from the bottom of the stack to the top
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    /// Iterates mutably from the bottom of the stack to the top
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.as_mut_slice())
    }

    /// Drops every element, keeping the storage
    pub fn clear(&mut self) {
        let live = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
        // reset first: a panicking destructor leaks the rest instead of
        // double-dropping them
        self.len = 0;
        // SAFETY: the first `len` slots were initialised and are no longer
        // reachable through the stack.
        unsafe { ptr::drop_in_place(live) };
    }

    fn reserve_for_push(&mut self) -> StackResult<()> {
        if self.len < self.capacity() {
            return Ok(());
        }
        if Self::IS_ZST {
            return Err(StackError::CapacityOverflow {
                requested: self.len.saturating_add(1),
            });
        }

        let new_cap = self
            .config
            .next_capacity(self.cap)
            .ok_or(StackError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        self.reallocate(new_cap)
    }

    /// Move the live elements into fresh storage for `new_cap` elements.
    fn reallocate(&mut self, new_cap: usize) -> StackResult<()> {
        debug_assert!(!Self::IS_ZST);
        debug_assert!(new_cap >= self.len);

        let layout = Layout::array::<T>(new_cap)
            .map_err(|_| StackError::CapacityOverflow { requested: new_cap })?;
        let new_ptr = self.resource.allocate_layout(layout)?.cast::<T>();

        if self.cap > 0 {
            // SAFETY: the old storage holds `len` initialised elements and the
            // new block is fresh, disjoint and large enough. After the copy
            // the old slots count as uninitialised and the old block is
            // returned with the layout it was obtained with.
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
                self.release_storage();
            }
        }

        debug!(
            old_capacity = self.cap,
            new_capacity = new_cap,
            len = self.len,
            "stack storage grown"
        );

        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// # Safety
    /// `cap > 0`, `T` is not zero-sized, and no live element remains in
    /// the storage that still needs it.
    unsafe fn release_storage(&mut self) {
        // SAFETY: `Layout::array::<T>(cap)` succeeded when this storage was
        // allocated, and it equals this size/align pair.
        let layout = unsafe {
            Layout::from_size_align_unchecked(mem::size_of::<T>() * self.cap, mem::align_of::<T>())
        };
        // SAFETY: `ptr` came from `resource` with exactly this layout.
        unsafe { self.resource.deallocate_layout(self.ptr.cast(), layout) };
    }
}

impl<T, R: MemoryResource + ?Sized> Drop for Stack<'_, T, R> {
    fn drop(&mut self) {
        self.clear();
        if !Self::IS_ZST && self.cap > 0 {
            trace!(capacity = self.cap, "stack storage released");
            // SAFETY: all elements were dropped above and the storage is not
            // used again.
            unsafe { self.release_storage() };
        }
    }
}

impl<'s, T, R: MemoryResource + ?Sized> IntoIterator for &'s Stack<'_, T, R> {
    type Item = &'s T;
    type IntoIter = Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'s, T, R: MemoryResource + ?Sized> IntoIterator for &'s mut Stack<'_, T, R> {
    type Item = &'s mut T;
    type IntoIter = IterMut<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: fmt::Debug, R: MemoryResource + ?Sized> fmt::Debug for Stack<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
