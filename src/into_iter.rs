use std::iter::FusedIterator;

use crate::{SegmentCapacity, UnrolledList, Usize};

/// An owning iterator over the elements of an UnrolledList.
///
/// This struct is created by UnrolledList::into_iter().
pub struct IntoIter<T, const N: usize>
where
    Usize<N>: SegmentCapacity,
{
    list: UnrolledList<T, N>,
}

impl<T, const N: usize> Default for IntoIter<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn default() -> Self {
        Self {
            list: UnrolledList::new(),
        }
    }
}

impl<T: Clone, const N: usize> Clone for IntoIter<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}

impl<T, const N: usize> IntoIter<T, N>
where
    Usize<N>: SegmentCapacity,
{
    pub(crate) fn from_list(list: UnrolledList<T, N>) -> Self {
        Self { list }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N>
where
    Usize<N>: SegmentCapacity,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N>
where
    Usize<N>: SegmentCapacity,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> where Usize<N>: SegmentCapacity {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> where Usize<N>: SegmentCapacity {}

impl<T, const N: usize> std::fmt::Debug for IntoIter<T, N>
where
    T: std::fmt::Debug,
    Usize<N>: SegmentCapacity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}
