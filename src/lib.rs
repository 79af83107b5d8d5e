//! # unrolled_list
//!
//! `unrolled_list` implements an **unrolled linked list**: elements live in fixed-capacity
//! array segments that are linked into a doubly linked chain.
//!
//! ## Features
//! - Ordered sequence with index based access; lookups walk whole segments at a time
//!   and start from whichever end of the chain is closer.
//! - Chunked storage, which improves cache locality and reduces pointer overhead
//!   compared to a one-element-per-node linked list.
//! - Insertions and removals anywhere in the list shift at most one segment worth
//!   of elements, splitting full segments and merging sparse ones as needed.
//! - Detached, fail-fast [`Cursor`]s that detect structural changes made behind
//!   their back.
//!
//! ## Layout invariants
//! Every segment reachable from the list holds between 1 and `N` elements and,
//! once the list spans more than one segment, at least `N / 2` of them between
//! operations.
//!
//! ## Example
//! ```rust
//! use unrolled_list::UnrolledList;
//!
//! let mut list: UnrolledList<i64, 4> = UnrolledList::new();
//! list.push_back(2);
//! list.push_front(0);
//! list.insert(1, 1).unwrap();
//!
//! assert_eq!(list.front(), Some(&0));
//! assert_eq!(list.get(1), Some(&1));
//! assert_eq!(list.back(), Some(&2));
//!
//! assert_eq!(list.remove(1), Ok(1));
//! assert_eq!(list.pop_back(), Some(2));
//! assert_eq!(list.pop_front(), Some(0));
//! ```

mod arena;
mod cursor;
mod error;
mod into_iter;
mod iter;
mod iter_mut;
#[cfg(feature = "serde")]
mod persistence;
mod sailed;
mod segment;

pub use cursor::{Cursor, DescendingCursor};
pub use error::{Error, Result};
pub use into_iter::IntoIter;
pub use iter::Iter;
pub use iter_mut::IterMut;

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use log::trace;

use crate::arena::{Arena, SegmentKey};
use crate::segment::Segment;

/// Segment capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 32;

pub enum Usize<const N: usize> {}

/// Implemented for the segment capacities a list may be instantiated with.
///
/// Capacities are even so that a split or a merge always moves exactly half a segment.
pub trait SegmentCapacity: crate::sailed::Sailed {}

/// An ordered sequence stored as a doubly linked chain of fixed-capacity segments.
///
/// # Type Parameters
/// - `T`: The type of elements stored in the list.
/// - `N`: The number of elements each segment can hold (defaults to [`DEFAULT_CAPACITY`]).
///
/// # Example
/// ```rust
/// use unrolled_list::UnrolledList;
///
/// let mut list: UnrolledList<i64, 6> = UnrolledList::new();
/// list.push_back(3);
/// list.push_front(1);
/// list.insert(1, 2).unwrap();
///
/// assert!(!list.is_empty());
/// assert_eq!(list.len(), 3);
///
/// assert_eq!(list.pop_front(), Some(1));
/// assert_eq!(list.pop_front(), Some(2));
/// assert_eq!(list.pop_front(), Some(3));
/// ```
pub struct UnrolledList<T, const N: usize = DEFAULT_CAPACITY>
where
    Usize<N>: SegmentCapacity,
{
    arena: Arena<T, N>,
    head: Option<SegmentKey>,
    tail: Option<SegmentKey>,
    len: usize,
    generation: u64,
}

impl<T, const N: usize, const M: usize> From<[T; M]> for UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn from(values: [T; M]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, const N: usize> FromIterator<T> for UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<T, const N: usize> Extend<T> for UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|value| self.push_back(value));
    }
}

impl<'a, T, const N: usize> Extend<&'a T> for UnrolledList<T, N>
where
    T: Clone,
    Usize<N>: SegmentCapacity,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T, const N: usize> Default for UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    const HALF: usize = N / 2;

    /// Creates a new, empty `UnrolledList` with no elements and no allocated segments.
    ///
    /// # Example
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i64> = UnrolledList::new();
    ///
    /// assert!(list.is_empty());
    /// ```
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            head: None,
            tail: None,
            len: 0,
            generation: 0,
        }
    }

    /// Adds an element to the front of the list.
    ///
    /// When the first segment is full its upper half moves toward the next segment first.
    ///
    /// # Example
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 2> = UnrolledList::new();
    /// list.push_front(10);
    /// list.push_front(20);
    /// list.push_front(30);
    ///
    /// assert_eq!(list, [30, 20, 10]);
    /// ```
    pub fn push_front(&mut self, value: T) {
        match self.head {
            None => self.push_first(value),
            Some(head) => self.insert_at(
                SearchTarget {
                    segment: head,
                    offset: 0,
                },
                value,
            ),
        }

        self.len += 1;
        self.bump_generation();
    }

    /// Adds an element to the back of the list.
    ///
    /// When the last segment is full its lower half moves toward the previous segment
    /// first, so lists built by appending stay densely packed.
    ///
    /// # Example
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 2> = UnrolledList::new();
    /// list.push_back(10);
    /// list.push_back(20);
    /// list.push_back(30);
    ///
    /// assert_eq!(list, [10, 20, 30]);
    /// ```
    pub fn push_back(&mut self, value: T) {
        match self.tail {
            None => self.push_first(value),
            Some(tail) => {
                if self.arena[tail].is_full() {
                    self.split_toward_prev(tail);
                }
                self.arena[tail].push_back(value);
            }
        }

        self.len += 1;
        self.bump_generation();
    }

    /// Inserts an element at `index`, shifting subsequent elements to the right.
    ///
    /// # Errors
    /// [`Error::IndexOutOfBounds`] if `index > len`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::{Error, UnrolledList};
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::new();
    /// list.insert(0, 10).unwrap();
    /// list.insert(1, 30).unwrap();
    /// list.insert(1, 20).unwrap();
    ///
    /// assert_eq!(list, [10, 20, 30]);
    /// assert_eq!(list.insert(9, 0), Err(Error::IndexOutOfBounds { index: 9, len: 3 }));
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.check_position_index(index)?;

        if index == self.len {
            self.push_back(value);
            return Ok(());
        }

        let target = self.resolve(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.len,
        })?;

        self.insert_at(target, value);
        self.len += 1;
        self.bump_generation();
        Ok(())
    }

    /// Inserts every element of `iter` starting at `index`, preserving their order.
    ///
    /// The source is drained before the first insertion; an empty source leaves
    /// the list untouched.
    ///
    /// # Errors
    /// [`Error::IndexOutOfBounds`] if `index > len`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::from([1, 5]);
    /// list.insert_all(1, [2, 3, 4]).unwrap();
    ///
    /// assert_eq!(list, [1, 2, 3, 4, 5]);
    /// ```
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, iter: I) -> Result<()> {
        self.check_position_index(index)?;

        let values: Vec<T> = iter.into_iter().collect();
        for (offset, value) in values.into_iter().enumerate() {
            self.insert(index + offset, value)?;
        }

        Ok(())
    }

    /// Moves all elements from `other` to the end of this list, leaving `other` empty.
    ///
    /// Segments are moved as they are rather than element by element.
    ///
    /// # Example
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list1: UnrolledList<i32, 4> = UnrolledList::from([1, 2]);
    /// let mut list2: UnrolledList<i32, 4> = UnrolledList::from([3, 4]);
    ///
    /// list1.append(&mut list2);
    ///
    /// assert_eq!(list1, [1, 2, 3, 4]);
    /// assert!(list2.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        if other.is_empty() {
            return;
        }

        let seam = self.tail;
        let mut moved_head = None;
        let mut cursor = other.head;

        while let Some(key) = cursor {
            let mut segment = other.arena.remove(key);
            cursor = segment.next();

            segment.set_prev(self.tail);
            segment.set_next(None);
            let new_key = self.arena.insert(segment);

            match self.tail {
                Some(tail) => self.arena[tail].set_next(Some(new_key)),
                None => self.head = Some(new_key),
            }
            self.tail = Some(new_key);
            if moved_head.is_none() {
                moved_head = Some(new_key);
            }
        }

        self.len += other.len;
        self.bump_generation();

        other.arena.clear();
        other.head = None;
        other.tail = None;
        other.len = 0;
        other.bump_generation();

        // Either side of the seam may come from a single-segment list below half capacity.
        for key in [seam, moved_head].into_iter().flatten() {
            if self
                .arena
                .get(key)
                .is_some_and(|segment| segment.len() < Self::HALF)
            {
                self.repair_underflow(key);
            }
        }
    }

    /// Removes and returns the first element, or `None` if the list is empty.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::from([10, 20]);
    ///
    /// assert_eq!(list.pop_front(), Some(10));
    /// assert_eq!(list.pop_front(), Some(20));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        Some(self.remove_at(SearchTarget {
            segment: head,
            offset: 0,
        }))
    }

    /// Removes and returns the last element, or `None` if the list is empty.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::from([10, 20]);
    ///
    /// assert_eq!(list.pop_back(), Some(20));
    /// assert_eq!(list.pop_back(), Some(10));
    /// assert_eq!(list.pop_back(), None);
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        let offset = self.arena[tail].len().checked_sub(1)?;
        Some(self.remove_at(SearchTarget {
            segment: tail,
            offset,
        }))
    }

    /// Removes and returns the first element.
    ///
    /// # Errors
    /// [`Error::NoSuchElement`] if the list is empty.
    pub fn remove_first(&mut self) -> Result<T> {
        self.pop_front().ok_or(Error::NoSuchElement)
    }

    /// Removes and returns the last element.
    ///
    /// # Errors
    /// [`Error::NoSuchElement`] if the list is empty.
    pub fn remove_last(&mut self) -> Result<T> {
        self.pop_back().ok_or(Error::NoSuchElement)
    }

    /// Removes and returns the element at `index`, shifting subsequent elements left.
    ///
    /// # Errors
    /// [`Error::IndexOutOfBounds`] if `index >= len`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::{Error, UnrolledList};
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::from([10, 20, 30, 40, 50]);
    ///
    /// assert_eq!(list.remove(1), Ok(20));
    /// assert_eq!(list.get(1), Some(&30));
    /// assert_eq!(list.len(), 4);
    ///
    /// assert_eq!(list.remove(10), Err(Error::IndexOutOfBounds { index: 10, len: 4 }));
    /// ```
    pub fn remove(&mut self, index: usize) -> Result<T> {
        self.check_element_index(index)?;

        let target = self.resolve(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.len,
        })?;

        Ok(self.remove_at(target))
    }

    /// Removes the first element equal to `value`, returning it.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::from([1, 2, 1]);
    ///
    /// assert_eq!(list.remove_first_occurrence(&1), Some(1));
    /// assert_eq!(list, [2, 1]);
    /// assert_eq!(list.remove_first_occurrence(&7), None);
    /// ```
    pub fn remove_first_occurrence(&mut self, value: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.index_of(value)?;
        self.remove(index).ok()
    }

    /// Removes the last element equal to `value`, returning it.
    pub fn remove_last_occurrence(&mut self, value: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.last_index_of(value)?;
        self.remove(index).ok()
    }

    /// Removes all elements and releases every segment.
    ///
    /// # Example
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 4> = UnrolledList::from([1, 2, 3]);
    /// list.clear();
    ///
    /// assert!(list.is_empty());
    /// assert_eq!(list.front(), None);
    /// assert_eq!(list.back(), None);
    /// ```
    pub fn clear(&mut self) {
        trace!("clearing {} segments holding {} elements", self.arena.len(), self.len);

        self.arena.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.bump_generation();
    }

    /// Returns a reference to the first element, if any.
    pub fn front(&self) -> Option<&T> {
        self.arena[self.head?].front()
    }

    /// Returns a mutable reference to the first element, if any.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.arena[self.head?].front_mut()
    }

    /// Returns a reference to the last element, if any.
    pub fn back(&self) -> Option<&T> {
        self.arena[self.tail?].back()
    }

    /// Returns a mutable reference to the last element, if any.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.arena[self.tail?].back_mut()
    }

    /// Returns the first element.
    ///
    /// # Errors
    /// [`Error::NoSuchElement`] if the list is empty.
    pub fn first(&self) -> Result<&T> {
        self.front().ok_or(Error::NoSuchElement)
    }

    /// Returns the last element.
    ///
    /// # Errors
    /// [`Error::NoSuchElement`] if the list is empty.
    pub fn last(&self) -> Result<&T> {
        self.back().ok_or(Error::NoSuchElement)
    }

    /// Returns a reference to the element at `index`, if any.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i64, 4> = UnrolledList::from([10, 20]);
    ///
    /// assert_eq!(list.get(0), Some(&10));
    /// assert_eq!(list.get(1), Some(&20));
    /// assert_eq!(list.get(2), None); // Out of bounds
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        let SearchTarget { segment, offset } = self.resolve(index)?;
        self.arena[segment].get(offset)
    }

    /// Returns a mutable reference to the element at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let SearchTarget { segment, offset } = self.resolve(index)?;
        self.arena[segment].get_mut(offset)
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// This is not a structural change: outstanding cursors stay valid.
    ///
    /// # Errors
    /// [`Error::IndexOutOfBounds`] if `index >= len`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i64, 4> = UnrolledList::from([1, 2, 3]);
    ///
    /// assert_eq!(list.set(1, 20), Ok(2));
    /// assert_eq!(list, [1, 20, 3]);
    /// ```
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.len;
        let slot = self
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;

        Ok(std::mem::replace(slot, value))
    }

    /// Returns the index of the first element equal to `value`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<Option<i64>, 4> = UnrolledList::from([Some(1), None, Some(1), None]);
    ///
    /// assert_eq!(list.index_of(&Some(1)), Some(0));
    /// assert_eq!(list.index_of(&None), Some(1));
    /// assert_eq!(list.last_index_of(&None), Some(3));
    /// assert_eq!(list.index_of(&Some(2)), None);
    /// ```
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|v| v == value)
    }

    /// Returns the index of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().rposition(|v| v == value)
    }

    /// Returns `true` if the list contains an element equal to `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Copies every element, in order, into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.len);
        self.segments().for_each(|segment| out.extend_from_slice(segment));
        out
    }

    /// Returns the number of elements currently stored in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the structural modification counter.
    ///
    /// Every insertion, removal and clear increments it; reads and [`set`](Self::set) do not.
    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Provides an iterator over the list's elements.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<_, 2> = UnrolledList::from([0, 1, 2]);
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next_back(), Some(&2));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter::from_list(self)
    }

    /// Provides a mutable iterator over the list's elements.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        IterMut::from_list(self)
    }

    /// Provides a cursor positioned before the element at `index`.
    ///
    /// # Errors
    /// [`Error::IndexOutOfBounds`] if `index > len`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i64, 4> = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor(1).unwrap();
    ///
    /// assert_eq!(cursor.next(&list), Ok(&2));
    /// assert_eq!(cursor.next(&list), Ok(&3));
    /// assert!(cursor.next(&list).is_err());
    /// ```
    pub fn cursor(&self, index: usize) -> Result<Cursor<T, N>> {
        self.check_position_index(index)?;
        Ok(Cursor::new(self, index))
    }

    /// Provides a cursor positioned before the first element.
    #[inline]
    pub fn cursor_front(&self) -> Cursor<T, N> {
        Cursor::new(self, 0)
    }

    /// Provides a cursor positioned after the last element.
    #[inline]
    pub fn cursor_back(&self) -> Cursor<T, N> {
        Cursor::new(self, self.len)
    }

    /// Provides a cursor that walks the list from back to front.
    #[inline]
    pub fn descending_cursor(&self) -> DescendingCursor<T, N> {
        DescendingCursor::new(self.cursor_back())
    }

    /// Resolves an element index to its segment and the offset inside it,
    /// walking from whichever end of the chain is closer.
    fn resolve(&self, index: usize) -> Option<SearchTarget> {
        if index >= self.len {
            return None;
        }

        if index < self.len / 2 {
            let mut index = index;
            let mut cursor = self.head;
            while let Some(key) = cursor {
                let segment = &self.arena[key];
                if index < segment.len() {
                    return Some(SearchTarget {
                        segment: key,
                        offset: index,
                    });
                }

                index -= segment.len();
                cursor = segment.next();
            }

            return None;
        }

        let mut start = self.len;
        let mut cursor = self.tail;
        while let Some(key) = cursor {
            let segment = &self.arena[key];
            start -= segment.len();
            if index >= start {
                return Some(SearchTarget {
                    segment: key,
                    offset: index - start,
                });
            }

            cursor = segment.prev();
        }

        None
    }

    fn push_first(&mut self, value: T) {
        debug_assert!(self.head.is_none() && self.tail.is_none());

        let mut segment = Segment::new();
        segment.push_back(value);

        let key = self.arena.insert(segment);
        self.head = Some(key);
        self.tail = Some(key);
    }

    fn insert_at(&mut self, target: SearchTarget, value: T) {
        let SearchTarget { segment, offset } = target;

        if self.arena[segment].is_full() {
            let next = self.split_toward_next(segment);
            if offset > Self::HALF {
                // The next segment may itself be full now; let it split in turn.
                return self.insert_at(
                    SearchTarget {
                        segment: next,
                        offset: offset - Self::HALF,
                    },
                    value,
                );
            }
        }

        self.arena[segment].insert(offset, value);
    }

    fn remove_at(&mut self, target: SearchTarget) -> T {
        let SearchTarget { segment, offset } = target;

        let value = self.arena[segment].remove(offset);
        self.len -= 1;
        self.bump_generation();

        let remaining = self.arena[segment].len();
        if remaining == 0 {
            self.detach(segment);
        } else if remaining == Self::HALF {
            self.rebalance_with_neighbors(segment);
        } else if remaining < Self::HALF {
            self.repair_underflow(segment);
        }

        value
    }

    /// Moves the upper half of a full segment into the next segment, or into a
    /// new one when the next segment has no room for it.
    fn split_toward_next(&mut self, key: SegmentKey) -> SegmentKey {
        let target = match self.arena[key].next() {
            Some(next) if self.arena[next].len() <= Self::HALF => next,
            _ => {
                let created = self.link_after(key);
                trace!("split {key:?}: created {created:?} after it");
                created
            }
        };

        let (source, target_segment) = self.arena.pair_mut(key, target);
        source.move_tail_to_front_of(target_segment, Self::HALF);
        target
    }

    /// Moves the lower half of a full segment into the previous segment, or into a
    /// new one when the previous segment has no room for it.
    fn split_toward_prev(&mut self, key: SegmentKey) -> SegmentKey {
        let target = match self.arena[key].prev() {
            Some(prev) if self.arena[prev].len() <= Self::HALF => prev,
            _ => {
                let created = self.link_before(key);
                trace!("split {key:?}: created {created:?} before it");
                created
            }
        };

        let (source, target_segment) = self.arena.pair_mut(key, target);
        source.move_head_to_back_of(target_segment, Self::HALF);
        target
    }

    /// Runs when a segment has just dropped to exactly half capacity. If both
    /// neighbours exist and the three segments fit in two, the segment is
    /// emptied into them and detached; boundary segments are left as they are.
    fn rebalance_with_neighbors(&mut self, key: SegmentKey) {
        let segment = &self.arena[key];
        let (Some(prev), Some(next)) = (segment.prev(), segment.next()) else {
            return;
        };

        let total = self.arena[prev].len() + segment.len() + self.arena[next].len();
        if total >= 2 * N {
            return;
        }

        let room = N - self.arena[prev].len();
        let (this, prev_segment) = self.arena.pair_mut(key, prev);
        let moved = room.min(this.len());
        this.move_head_to_back_of(prev_segment, moved);

        let rest = self.arena[key].len();
        if rest > 0 {
            let (this, next_segment) = self.arena.pair_mut(key, next);
            this.move_tail_to_front_of(next_segment, rest);
        }

        trace!("rebalanced {key:?}: {moved} elements to {prev:?}, {rest} to {next:?}");
        self.detach(key);
    }

    /// Runs when a segment has dropped below half capacity: merges it into a
    /// neighbour that has room, or else borrows from that neighbour until both
    /// are at least half full.
    fn repair_underflow(&mut self, key: SegmentKey) {
        let segment = &self.arena[key];
        let len = segment.len();

        let (neighbor, is_next) = match (segment.next(), segment.prev()) {
            (Some(next), _) => (next, true),
            (None, Some(prev)) => (prev, false),
            (None, None) => return,
        };

        let other = self.arena[neighbor].len();
        let (this, neighbor_segment) = self.arena.pair_mut(key, neighbor);

        if len + other <= N {
            if is_next {
                this.move_tail_to_front_of(neighbor_segment, len);
            } else {
                this.move_head_to_back_of(neighbor_segment, len);
            }

            trace!("merged {key:?} into {neighbor:?}");
            self.detach(key);
            return;
        }

        let borrowed = (other - len) / 2;
        if is_next {
            neighbor_segment.move_head_to_back_of(this, borrowed);
        } else {
            neighbor_segment.move_tail_to_front_of(this, borrowed);
        }

        trace!("{key:?} borrowed {borrowed} elements from {neighbor:?}");
    }

    fn link_after(&mut self, key: SegmentKey) -> SegmentKey {
        let next = self.arena[key].next();
        let created = self.arena.insert(Segment::with_links(Some(key), next));

        self.arena[key].set_next(Some(created));
        match next {
            Some(next) => self.arena[next].set_prev(Some(created)),
            None => self.tail = Some(created),
        }

        created
    }

    fn link_before(&mut self, key: SegmentKey) -> SegmentKey {
        let prev = self.arena[key].prev();
        let created = self.arena.insert(Segment::with_links(prev, Some(key)));

        self.arena[key].set_prev(Some(created));
        match prev {
            Some(prev) => self.arena[prev].set_next(Some(created)),
            None => self.head = Some(created),
        }

        created
    }

    /// Unlinks an emptied segment from the chain and releases its slot.
    fn detach(&mut self, key: SegmentKey) {
        let segment = self.arena.remove(key);
        debug_assert!(segment.is_empty(), "detached segment {key:?} still holds elements");

        let (prev, next) = (segment.prev(), segment.next());
        match prev {
            Some(prev) => self.arena[prev].set_next(next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.arena[next].set_prev(prev),
            None => self.tail = prev,
        }

        trace!("detached {key:?}");
    }

    fn segments(&self) -> impl Iterator<Item = &[T]> {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let segment = &self.arena[cursor?];
            cursor = segment.next();
            Some(segment.as_slice())
        })
    }

    #[inline]
    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn check_element_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            return Ok(());
        }

        Err(Error::IndexOutOfBounds {
            index,
            len: self.len,
        })
    }

    fn check_position_index(&self, index: usize) -> Result<()> {
        if index <= self.len {
            return Ok(());
        }

        Err(Error::IndexOutOfBounds {
            index,
            len: self.len,
        })
    }
}

/// A resolved element location: the owning segment and the offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchTarget {
    segment: SegmentKey,
    offset: usize,
}

impl<T: Clone, const N: usize> Clone for UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T, const N: usize, const M: usize> PartialEq<[T; M]> for UnrolledList<T, N>
where
    T: PartialEq,
    Usize<N>: SegmentCapacity,
{
    fn eq(&self, other: &[T; M]) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, const N: usize> PartialEq<&[T]> for UnrolledList<T, N>
where
    T: PartialEq,
    Usize<N>: SegmentCapacity,
{
    fn eq(&self, other: &&[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, const N: usize> PartialEq<[T]> for UnrolledList<T, N>
where
    T: PartialEq,
    Usize<N>: SegmentCapacity,
{
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, const N: usize> PartialEq for UnrolledList<T, N>
where
    T: PartialEq,
    Usize<N>: SegmentCapacity,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, const N: usize> Eq for UnrolledList<T, N>
where
    T: Eq,
    Usize<N>: SegmentCapacity,
{
}

impl<T, const N: usize> PartialOrd for UnrolledList<T, N>
where
    T: PartialOrd,
    Usize<N>: SegmentCapacity,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T, const N: usize> Ord for UnrolledList<T, N>
where
    T: Ord,
    Usize<N>: SegmentCapacity,
{
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<T, const N: usize> Hash for UnrolledList<T, N>
where
    T: Hash,
    Usize<N>: SegmentCapacity,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        self.iter().for_each(|v| v.hash(state));
    }
}

impl<T, const N: usize> std::fmt::Debug for UnrolledList<T, N>
where
    T: std::fmt::Debug,
    Usize<N>: SegmentCapacity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.segments()).finish()
    }
}

impl<T, const N: usize> IntoIterator for UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::from_list(self)
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        Iter::from_list(self)
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut UnrolledList<T, N>
where
    Usize<N>: SegmentCapacity,
{
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        IterMut::from_list(self)
    }
}
