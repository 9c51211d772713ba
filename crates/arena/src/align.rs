//! Alignment arithmetic

/// Aligns a value up to the nearest multiple of alignment
///
/// Returns `None` if rounding overflows `usize`.
///
/// # Examples
/// ```
/// use fixmem_arena::align::align_up;
/// assert_eq!(align_up(13, 8), Some(16));
/// assert_eq!(align_up(16, 8), Some(16));
/// assert_eq!(align_up(usize::MAX, 2), None);
/// ```
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    match value.checked_add(alignment - 1) {
        Some(bumped) => Some(bumped & !(alignment - 1)),
        None => None,
    }
}

/// Checks if a value is aligned to the given alignment
#[inline]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Bytes of padding needed to move `addr` up to `alignment`
#[inline]
pub const fn padding_for(addr: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    addr.wrapping_neg() & (alignment - 1)
}
