use std::mem::MaybeUninit;
use std::ptr;

use crate::arena::SegmentKey;

/// A fixed-capacity run of up to `N` elements, linked to its neighbours by arena handle.
///
/// Slots `[0, len)` are initialized, the rest are not.
pub(crate) struct Segment<T, const N: usize> {
    len: usize,
    prev: Option<SegmentKey>,
    next: Option<SegmentKey>,
    data: [MaybeUninit<T>; N],
}

impl<T, const N: usize> Segment<T, N> {
    pub fn new() -> Self {
        Self::with_links(None, None)
    }

    pub fn with_links(prev: Option<SegmentKey>, next: Option<SegmentKey>) -> Self {
        Self {
            len: 0,
            prev,
            next,
            data: [const { MaybeUninit::uninit() }; N],
        }
    }

    #[inline]
    pub fn push_back(&mut self, value: T) {
        self.insert(self.len(), value);
    }

    pub fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len(), "insert at {index} past segment len {}", self.len());
        assert!(!self.is_full(), "insert into a full segment");

        unsafe {
            let data_ptr = self.data.as_mut_ptr();

            // open a gap at `index`
            ptr::copy(
                data_ptr.add(index),
                data_ptr.add(index + 1),
                self.len() - index,
            );

            data_ptr.add(index).write(MaybeUninit::new(value));
        }

        self.len += 1;
    }

    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len(), "remove at {index} past segment len {}", self.len());

        let value = unsafe { self.data[index].assume_init_read() };

        unsafe {
            // close the gap
            let data_ptr = self.data.as_mut_ptr();
            ptr::copy(
                data_ptr.add(index + 1),
                data_ptr.add(index),
                self.len() - index - 1,
            );
        }

        self.len -= 1;
        value
    }

    /// Moves the last `count` elements of `self` to the front of `other`,
    /// shifting the elements already in `other` to the right.
    pub fn move_tail_to_front_of(&mut self, other: &mut Self, count: usize) {
        assert!(count <= self.len(), "cannot move {count} of {} elements", self.len());
        assert!(
            other.len() + count <= N,
            "target segment cannot take {count} more elements"
        );

        unsafe {
            let dst = other.data.as_mut_ptr();
            ptr::copy(dst, dst.add(count), other.len());
            ptr::copy_nonoverlapping(self.data.as_ptr().add(self.len() - count), dst, count);
        }

        self.len -= count;
        other.len += count;
    }

    /// Moves the first `count` elements of `self` to the back of `other`,
    /// shifting the elements left behind in `self` to the left.
    pub fn move_head_to_back_of(&mut self, other: &mut Self, count: usize) {
        assert!(count <= self.len(), "cannot move {count} of {} elements", self.len());
        assert!(
            other.len() + count <= N,
            "target segment cannot take {count} more elements"
        );

        unsafe {
            let src = self.data.as_mut_ptr();
            ptr::copy_nonoverlapping(src, other.data.as_mut_ptr().add(other.len()), count);
            ptr::copy(src.add(count), src, self.len() - count);
        }

        self.len -= count;
        other.len += count;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len() {
            return Some(unsafe { self.data[index].assume_init_ref() });
        }

        None
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            return Some(unsafe { self.data[index].assume_init_mut() });
        }

        None
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn back(&self) -> Option<&T> {
        self.get(self.len().checked_sub(1)?)
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len().checked_sub(1)?)
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr().cast::<T>(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_mut_ptr().cast::<T>(), self.len) }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len() == N
    }

    #[inline]
    pub const fn prev(&self) -> Option<SegmentKey> {
        self.prev
    }

    #[inline]
    pub const fn next(&self) -> Option<SegmentKey> {
        self.next
    }

    #[inline]
    pub fn set_prev(&mut self, prev: Option<SegmentKey>) {
        self.prev = prev;
    }

    #[inline]
    pub fn set_next(&mut self, next: Option<SegmentKey>) {
        self.next = next;
    }
}

impl<T, const N: usize> Drop for Segment<T, N> {
    fn drop(&mut self) {
        let live: *mut [T] = self.as_mut_slice();
        self.len = 0;
        unsafe { ptr::drop_in_place(live) };
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::segment::Segment;

    fn segment_of<const N: usize>(values: &[i64]) -> Segment<i64, N> {
        let mut segment = Segment::new();
        values.iter().for_each(|&v| segment.push_back(v));
        segment
    }

    #[test]
    fn segment_insert_puts_elements_in_the_correct_positions() {
        let mut sut: Segment<i64, 6> = Segment::new();
        assert_eq!(sut.len(), 0);
        assert!(sut.is_empty());

        sut.insert(0, 10);
        assert_eq!(sut.as_slice(), &[10]);

        sut.insert(1, 15);
        assert_eq!(sut.as_slice(), &[10, 15]);

        sut.insert(0, 5);
        assert_eq!(sut.as_slice(), &[5, 10, 15]);

        sut.insert(3, 20);
        assert_eq!(sut.as_slice(), &[5, 10, 15, 20]);

        sut.insert(2, 13);
        assert_eq!(sut.as_slice(), &[5, 10, 13, 15, 20]);

        sut.insert(4, 17);
        assert_eq!(sut.as_slice(), &[5, 10, 13, 15, 17, 20]);
        assert!(sut.is_full());

        let result = std::panic::catch_unwind(move || sut.insert(6, 100));
        assert!(result.is_err());
    }

    #[test]
    fn segment_insert_panics_on_index_out_of_bounds() {
        let mut sut: Segment<i64, 6> = Segment::new();
        let result = std::panic::catch_unwind(move || sut.insert(usize::MAX, 100));
        assert!(result.is_err());
    }

    #[test]
    fn segment_remove_removes_correct_elements() {
        let mut sut: Segment<i64, 6> = segment_of(&[0, 1, 2, 3, 4, 5]);

        assert_eq!(sut.remove(2), 2);
        assert_eq!(sut.as_slice(), &[0, 1, 3, 4, 5]);

        assert_eq!(sut.remove(3), 4);
        assert_eq!(sut.as_slice(), &[0, 1, 3, 5]);

        assert_eq!(sut.remove(0), 0);
        assert_eq!(sut.as_slice(), &[1, 3, 5]);

        assert_eq!(sut.remove(2), 5);
        assert_eq!(sut.as_slice(), &[1, 3]);

        assert_eq!(sut.remove(0), 1);
        assert_eq!(sut.remove(0), 3);
        assert!(sut.is_empty());

        let result = std::panic::catch_unwind(move || sut.remove(0));
        assert!(result.is_err());
    }

    #[test]
    fn segment_accessors_with_empty_segment_return_none() {
        let mut sut: Segment<i64, 4> = Segment::new();
        assert_eq!(sut.get(0), None);
        assert_eq!(sut.get_mut(0), None);
        assert_eq!(sut.front(), None);
        assert_eq!(sut.back(), None);
        assert_eq!(sut.front_mut(), None);
        assert_eq!(sut.back_mut(), None);
    }

    #[test]
    fn segment_front_and_back_track_the_live_range() {
        let mut sut: Segment<i64, 4> = segment_of(&[1, 2, 3]);
        assert_eq!(sut.front(), Some(&1));
        assert_eq!(sut.back(), Some(&3));

        *sut.back_mut().unwrap() = 30;
        *sut.front_mut().unwrap() = 10;
        assert_eq!(sut.as_slice(), &[10, 2, 30]);
    }

    #[test]
    fn segment_move_tail_to_front_of_keeps_order() {
        let mut source: Segment<i64, 6> = segment_of(&[0, 1, 2, 3, 4, 5]);
        let mut target: Segment<i64, 6> = segment_of(&[6, 7]);

        source.move_tail_to_front_of(&mut target, 3);
        assert_eq!(source.as_slice(), &[0, 1, 2]);
        assert_eq!(target.as_slice(), &[3, 4, 5, 6, 7]);
    }

    #[test]
    fn segment_move_head_to_back_of_keeps_order() {
        let mut source: Segment<i64, 6> = segment_of(&[4, 5, 6, 7, 8, 9]);
        let mut target: Segment<i64, 6> = segment_of(&[1, 2, 3]);

        source.move_head_to_back_of(&mut target, 3);
        assert_eq!(target.as_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(source.as_slice(), &[7, 8, 9]);
    }

    #[test]
    fn segment_move_everything_empties_the_source() {
        let mut source: Segment<i64, 4> = segment_of(&[1, 2]);
        let mut target: Segment<i64, 4> = segment_of(&[3, 4]);

        source.move_tail_to_front_of(&mut target, 2);
        assert!(source.is_empty());
        assert_eq!(target.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn segment_move_panics_when_target_would_overflow() {
        let mut source: Segment<i64, 4> = segment_of(&[1, 2, 3]);
        let mut target: Segment<i64, 4> = segment_of(&[4, 5]);

        let result = std::panic::catch_unwind(move || source.move_head_to_back_of(&mut target, 3));
        assert!(result.is_err());
    }

    #[test]
    fn segment_drop_releases_only_live_elements() {
        let tracker = Rc::new(());
        {
            let mut source: Segment<Rc<()>, 4> = Segment::new();
            let mut target: Segment<Rc<()>, 4> = Segment::new();
            (0..4).for_each(|_| source.push_back(Rc::clone(&tracker)));
            assert_eq!(Rc::strong_count(&tracker), 5);

            source.move_tail_to_front_of(&mut target, 2);
            drop(source.remove(0));
            assert_eq!(Rc::strong_count(&tracker), 4);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }
}
