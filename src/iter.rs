use std::iter::FusedIterator;

use crate::arena::Arena;
use crate::{SearchTarget, SegmentCapacity, UnrolledList, Usize};

/// An iterator over the elements of an UnrolledList.
///
/// This struct is created by UnrolledList::iter().
pub struct Iter<'a, T, const N: usize>
where
    Usize<N>: SegmentCapacity,
{
    arena: &'a Arena<T, N>,
    front: Option<SearchTarget>,
    back: Option<SearchTarget>,
    len: usize,
}

impl<'a, T, const N: usize> Iter<'a, T, N>
where
    Usize<N>: SegmentCapacity,
{
    pub(crate) fn from_list(list: &'a UnrolledList<T, N>) -> Self {
        Self {
            arena: &list.arena,
            front: list.head.map(|segment| SearchTarget { segment, offset: 0 }),
            back: list.tail.map(|segment| SearchTarget {
                segment,
                offset: list.arena[segment].len().saturating_sub(1),
            }),
            len: list.len,
        }
    }
}

impl<T, const N: usize> Clone for Iter<'_, T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N>
where
    Usize<N>: SegmentCapacity,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let arena = self.arena;
        let SearchTarget { segment, offset } = self.front?;
        let current = &arena[segment];

        self.front = if offset + 1 < current.len() {
            Some(SearchTarget {
                segment,
                offset: offset + 1,
            })
        } else {
            current
                .next()
                .map(|segment| SearchTarget { segment, offset: 0 })
        };

        self.len -= 1;
        current.get(offset)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T, const N: usize> DoubleEndedIterator for Iter<'_, T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let arena = self.arena;
        let SearchTarget { segment, offset } = self.back?;
        let current = &arena[segment];

        self.back = match offset.checked_sub(1) {
            Some(offset) => Some(SearchTarget { segment, offset }),
            None => current.prev().map(|segment| SearchTarget {
                segment,
                offset: arena[segment].len().saturating_sub(1),
            }),
        };

        self.len -= 1;
        current.get(offset)
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> where Usize<N>: SegmentCapacity {}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> where Usize<N>: SegmentCapacity {}

impl<T, const N: usize> std::fmt::Debug for Iter<'_, T, N>
where
    T: std::fmt::Debug,
    Usize<N>: SegmentCapacity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::{SegmentCapacity, UnrolledList, Usize};

    #[quickcheck]
    fn test_iter_next(seed: Vec<i32>) {
        fn _test<const N: usize>(seed: &[i32])
        where
            Usize<N>: SegmentCapacity,
        {
            let list = UnrolledList::<_, N>::from_iter(seed.iter().copied());
            let mut sut = list.iter();

            for (i, expected) in seed.iter().enumerate() {
                assert_eq!(sut.len(), seed.len() - i);
                assert_eq!(sut.next(), Some(expected));
            }

            assert_eq!(sut.len(), 0);
            assert_eq!(sut.next(), None);
            assert_eq!(sut.next_back(), None);
        }

        _test::<2>(&seed);
        _test::<4>(&seed);
        _test::<6>(&seed);
        _test::<8>(&seed);
        _test::<32>(&seed);
    }

    #[quickcheck]
    fn test_iter_next_back(seed: Vec<i32>) {
        fn _test<const N: usize>(seed: &[i32])
        where
            Usize<N>: SegmentCapacity,
        {
            let list = UnrolledList::<_, N>::from_iter(seed.iter().copied());
            assert!(list.iter().rev().eq(seed.iter().rev()));
            assert_eq!(list.iter().last(), seed.last());
        }

        _test::<2>(&seed);
        _test::<4>(&seed);
        _test::<6>(&seed);
        _test::<8>(&seed);
        _test::<32>(&seed);
    }

    #[quickcheck]
    fn test_iter_meets_in_the_middle(seed: Vec<i32>) {
        fn _test<const N: usize>(seed: &[i32])
        where
            Usize<N>: SegmentCapacity,
        {
            let list = UnrolledList::<_, N>::from_iter(seed.iter().copied());
            let mut sut = list.iter();
            let mut front = Vec::new();
            let mut back = Vec::new();

            loop {
                match sut.next() {
                    Some(value) => front.push(*value),
                    None => break,
                }
                match sut.next_back() {
                    Some(value) => back.push(*value),
                    None => break,
                }
            }

            back.reverse();
            front.extend(back);
            assert_eq!(front, seed);
        }

        _test::<2>(&seed);
        _test::<4>(&seed);
        _test::<8>(&seed);
    }

    #[test]
    fn test_iter_debug_lists_remaining_elements() {
        let list = UnrolledList::<_, 2>::from([1, 2, 3]);
        let mut sut = list.iter();
        sut.next();
        assert_eq!(format!("{sut:?}"), "[2, 3]");
    }
}
