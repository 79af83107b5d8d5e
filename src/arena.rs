use std::ops::{Index, IndexMut};

use crate::segment::Segment;

/// A stable handle to a segment stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SegmentKey(usize);

impl SegmentKey {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

enum Slot<T, const N: usize> {
    Occupied(Segment<T, N>),
    Vacant { next_free: Option<usize> },
}

/// Slot storage for the segments of a single list.
///
/// Released slots are threaded into a free list and handed out again,
/// so a handle stays valid exactly until its segment is removed.
pub(crate) struct Arena<T, const N: usize> {
    slots: Vec<Slot<T, N>>,
    free: Option<usize>,
    occupied: usize,
}

impl<T, const N: usize> Arena<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            occupied: 0,
        }
    }

    pub fn insert(&mut self, segment: Segment<T, N>) -> SegmentKey {
        self.occupied += 1;

        match self.free {
            Some(index) => {
                let slot = std::mem::replace(&mut self.slots[index], Slot::Occupied(segment));
                let Slot::Vacant { next_free } = slot else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free = next_free;
                SegmentKey(index)
            }
            None => {
                self.slots.push(Slot::Occupied(segment));
                SegmentKey(self.slots.len() - 1)
            }
        }
    }

    pub fn remove(&mut self, key: SegmentKey) -> Segment<T, N> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };

        match std::mem::replace(&mut self.slots[key.index()], vacant) {
            Slot::Occupied(segment) => {
                self.free = Some(key.index());
                self.occupied -= 1;
                segment
            }
            Slot::Vacant { next_free } => {
                self.slots[key.index()] = Slot::Vacant { next_free };
                panic!("segment handle {key:?} refers to a released slot");
            }
        }
    }

    pub fn get(&self, key: SegmentKey) -> Option<&Segment<T, N>> {
        match self.slots.get(key.index())? {
            Slot::Occupied(segment) => Some(segment),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, key: SegmentKey) -> Option<&mut Segment<T, N>> {
        match self.slots.get_mut(key.index())? {
            Slot::Occupied(segment) => Some(segment),
            Slot::Vacant { .. } => None,
        }
    }

    /// Borrows two distinct segments mutably at the same time, in argument order.
    pub fn pair_mut(
        &mut self,
        a: SegmentKey,
        b: SegmentKey,
    ) -> (&mut Segment<T, N>, &mut Segment<T, N>) {
        assert_ne!(a, b, "cannot borrow segment {a:?} twice");

        let (low, high) = (a.index().min(b.index()), a.index().max(b.index()));
        let (left, right) = self.slots.split_at_mut(high);

        let (Slot::Occupied(first), Slot::Occupied(second)) = (&mut left[low], &mut right[0])
        else {
            panic!("segment handles {a:?} and {b:?} must both be live");
        };

        if a.index() < b.index() {
            (first, second)
        } else {
            (second, first)
        }
    }

    /// Every live segment, indexed by handle; released slots are `None`.
    pub fn segments_mut(&mut self) -> Vec<Option<&mut Segment<T, N>>> {
        self.slots
            .iter_mut()
            .map(|slot| match slot {
                Slot::Occupied(segment) => Some(segment),
                Slot::Vacant { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.occupied = 0;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.occupied
    }
}

impl<T, const N: usize> Index<SegmentKey> for Arena<T, N> {
    type Output = Segment<T, N>;

    fn index(&self, key: SegmentKey) -> &Self::Output {
        match self.get(key) {
            Some(segment) => segment,
            None => panic!("segment handle {key:?} refers to a released slot"),
        }
    }
}

impl<T, const N: usize> IndexMut<SegmentKey> for Arena<T, N> {
    fn index_mut(&mut self, key: SegmentKey) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(segment) => segment,
            None => panic!("segment handle {key:?} refers to a released slot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::Arena;
    use crate::segment::Segment;

    fn segment_of(values: &[i32]) -> Segment<i32, 4> {
        let mut segment = Segment::new();
        values.iter().for_each(|&v| segment.push_back(v));
        segment
    }

    #[test]
    fn test_insert_then_get_returns_the_same_segment() {
        let mut sut = Arena::new();
        let a = sut.insert(segment_of(&[1, 2]));
        let b = sut.insert(segment_of(&[3]));

        assert_eq!(sut.len(), 2);
        assert_eq!(sut[a].as_slice(), &[1, 2]);
        assert_eq!(sut[b].as_slice(), &[3]);
    }

    #[test]
    fn test_remove_releases_the_slot_for_reuse() {
        let mut sut = Arena::new();
        let a = sut.insert(segment_of(&[1]));
        let b = sut.insert(segment_of(&[2]));

        assert_eq!(sut.remove(a).as_slice(), &[1]);
        assert_eq!(sut.len(), 1);
        assert!(sut.get(a).is_none());

        let c = sut.insert(segment_of(&[3]));
        assert_eq!(c, a);
        assert_eq!(sut[c].as_slice(), &[3]);
        assert_eq!(sut[b].as_slice(), &[2]);
    }

    #[test]
    fn test_remove_twice_panics() {
        let mut sut = Arena::new();
        let a = sut.insert(segment_of(&[1]));
        sut.remove(a);

        let result = std::panic::catch_unwind(move || {
            sut.remove(a);
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_pair_mut_returns_segments_in_argument_order() {
        let mut sut = Arena::new();
        let a = sut.insert(segment_of(&[1, 2]));
        let b = sut.insert(segment_of(&[3, 4]));

        let (second, first) = sut.pair_mut(b, a);
        assert_eq!(second.as_slice(), &[3, 4]);
        assert_eq!(first.as_slice(), &[1, 2]);

        second.move_head_to_back_of(first, 1);
        assert_eq!(sut[a].as_slice(), &[1, 2, 3]);
        assert_eq!(sut[b].as_slice(), &[4]);
    }

    #[test]
    fn test_pair_mut_with_same_key_panics() {
        let mut sut = Arena::new();
        let a = sut.insert(segment_of(&[1]));

        let result = std::panic::catch_unwind(move || {
            sut.pair_mut(a, a);
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_segments_mut_skips_released_slots() {
        let mut sut = Arena::new();
        let a = sut.insert(segment_of(&[1]));
        let _ = sut.insert(segment_of(&[2]));
        sut.remove(a);

        let segments = sut.segments_mut();
        assert_eq!(segments.len(), 2);
        assert!(segments[0].is_none());
        assert!(segments[1].is_some());
    }
}
