//! Bottom-to-top iterators over a [`Stack`](crate::Stack)

use core::iter::FusedIterator;
use core::slice;

/// Shared iterator over the elements of a stack, bottom first.
///
/// Created by [`Stack::iter`](crate::Stack::iter).
#[derive(Debug, Clone)]
pub struct Iter<'s, T> {
    inner: slice::Iter<'s, T>,
}

impl<'s, T> Iter<'s, T> {
    pub(crate) fn new(items: &'s [T]) -> Self {
        Self {
            inner: items.iter(),
        }
    }
}

impl<'s, T> Iterator for Iter<'s, T> {
    type Item = &'s T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator over the elements of a stack, bottom first.
///
/// Created by [`Stack::iter_mut`](crate::Stack::iter_mut).
#[derive(Debug)]
pub struct IterMut<'s, T> {
    inner: slice::IterMut<'s, T>,
}

impl<'s, T> IterMut<'s, T> {
    pub(crate) fn new(items: &'s mut [T]) -> Self {
        Self {
            inner: items.iter_mut(),
        }
    }
}

impl<'s, T> Iterator for IterMut<'s, T> {
    type Item = &'s mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}
