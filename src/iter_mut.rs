use std::iter::{Flatten, FusedIterator};

use crate::{SegmentCapacity, UnrolledList, Usize};

/// A mutable iterator over the elements of an UnrolledList.
///
/// This struct is created by UnrolledList::iter_mut().
pub struct IterMut<'a, T, const N: usize>
where
    Usize<N>: SegmentCapacity,
{
    delegate: Flatten<std::vec::IntoIter<&'a mut [T]>>,
    len: usize,
}

impl<'a, T, const N: usize> IterMut<'a, T, N>
where
    Usize<N>: SegmentCapacity,
{
    pub(crate) fn from_list(list: &'a mut UnrolledList<T, N>) -> Self {
        let len = list.len;
        let mut cursor = list.head;
        let mut segments = list.arena.segments_mut();
        let mut slices = Vec::with_capacity(segments.len());

        while let Some(key) = cursor {
            let Some(segment) = segments.get_mut(key.index()).and_then(Option::take) else {
                break;
            };

            cursor = segment.next();
            slices.push(segment.as_mut_slice());
        }

        Self {
            delegate: slices.into_iter().flatten(),
            len,
        }
    }
}

impl<'a, T, const N: usize> Iterator for IterMut<'a, T, N>
where
    Usize<N>: SegmentCapacity,
{
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.delegate.next()?;
        self.len -= 1;
        Some(out)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T, const N: usize> DoubleEndedIterator for IterMut<'_, T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let out = self.delegate.next_back()?;
        self.len -= 1;
        Some(out)
    }
}

impl<T, const N: usize> ExactSizeIterator for IterMut<'_, T, N> where Usize<N>: SegmentCapacity {}

impl<T, const N: usize> FusedIterator for IterMut<'_, T, N> where Usize<N>: SegmentCapacity {}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::{SegmentCapacity, UnrolledList, Usize};

    #[quickcheck]
    fn test_iter_mut_visits_every_element_once(seed: Vec<i32>) {
        fn _test<const N: usize>(seed: &[i32])
        where
            Usize<N>: SegmentCapacity,
        {
            let mut list = UnrolledList::<_, N>::from_iter(seed.iter().map(|&v| v as i64));
            let sut = list.iter_mut();
            assert_eq!(sut.len(), seed.len());

            sut.for_each(|v| *v *= 2);
            assert!(list.iter().copied().eq(seed.iter().map(|&v| v as i64 * 2)));
        }

        _test::<2>(&seed);
        _test::<4>(&seed);
        _test::<8>(&seed);
        _test::<32>(&seed);
    }

    #[test]
    fn test_iter_mut_after_removals_follows_chain_order() {
        let mut list = UnrolledList::<i32, 4>::new();
        (0..10).for_each(|v| list.push_front(v));
        list.remove(3).unwrap();
        list.insert(0, 100).unwrap();

        let expected: Vec<i32> = list.iter().copied().collect();
        let actual: Vec<i32> = list.iter_mut().map(|v| *v).collect();
        assert_eq!(actual, expected);

        let reversed: Vec<i32> = list.iter_mut().rev().map(|v| *v).collect();
        assert!(reversed.into_iter().eq(expected.into_iter().rev()));
    }
}
