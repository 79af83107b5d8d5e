use std::marker::PhantomData;

use crate::{DEFAULT_CAPACITY, Error, Result, SearchTarget, SegmentCapacity, UnrolledList, Usize};

/// A bidirectional, fail-fast position over an [`UnrolledList`].
///
/// A cursor rests between two elements: `index` is the position of the element
/// [`next`](Cursor::next) would return. It does not borrow the list; every operation
/// takes the list the cursor was created from, which lets callers interleave list
/// mutations with cursor operations. A structural change made behind the cursor's
/// back is reported as [`Error::ConcurrentModification`] by the next cursor call,
/// before any state is touched.
///
/// Passing a list other than the one the cursor was created from is a logic error:
/// the result is unspecified but memory safe.
///
/// # Examples
/// ```
/// use unrolled_list::{Error, UnrolledList};
///
/// let mut list: UnrolledList<i64, 4> = UnrolledList::from([1, 2, 3, 4, 5]);
/// let mut cursor = list.cursor_front();
///
/// assert_eq!(cursor.next(&list), Ok(&1));
/// assert_eq!(cursor.next(&list), Ok(&2));
/// assert_eq!(cursor.remove(&mut list), Ok(2));
/// assert_eq!(cursor.next(&list), Ok(&3));
/// assert_eq!(list, [1, 3, 4, 5]);
///
/// list.push_back(6);
/// assert!(matches!(cursor.next(&list), Err(Error::ConcurrentModification { .. })));
/// ```
pub struct Cursor<T, const N: usize = DEFAULT_CAPACITY>
where
    Usize<N>: SegmentCapacity,
{
    index: usize,
    // Location of the element at `index`, valid while the generation matches.
    cached: Option<SearchTarget>,
    last: Option<usize>,
    expected_generation: u64,
    marker: PhantomData<fn(&T)>,
}

impl<T, const N: usize> Cursor<T, N>
where
    Usize<N>: SegmentCapacity,
{
    pub(crate) fn new(list: &UnrolledList<T, N>, index: usize) -> Self {
        Self {
            index,
            cached: None,
            last: None,
            expected_generation: list.generation,
            marker: PhantomData,
        }
    }

    /// Returns the position of the element the next call to [`next`](Self::next) would return.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if [`next`](Self::next) has an element to return.
    #[inline]
    pub fn has_next(&self, list: &UnrolledList<T, N>) -> bool {
        self.index < list.len
    }

    /// Returns `true` if [`previous`](Self::previous) has an element to return.
    #[inline]
    pub const fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Returns the element after the cursor and moves past it.
    ///
    /// # Errors
    /// - [`Error::ConcurrentModification`] if the list was structurally changed elsewhere.
    /// - [`Error::NoSuchElement`] if the cursor is at the end of the list.
    pub fn next<'a>(&mut self, list: &'a UnrolledList<T, N>) -> Result<&'a T> {
        self.check(list)?;
        if self.index >= list.len {
            return Err(Error::NoSuchElement);
        }

        let target = match self.cached {
            Some(target) => target,
            None => list.resolve(self.index).ok_or(Error::NoSuchElement)?,
        };

        let segment = &list.arena[target.segment];
        let value = segment.get(target.offset).ok_or(Error::NoSuchElement)?;

        self.cached = if target.offset + 1 < segment.len() {
            Some(SearchTarget {
                offset: target.offset + 1,
                ..target
            })
        } else {
            segment
                .next()
                .map(|segment| SearchTarget { segment, offset: 0 })
        };
        self.last = Some(self.index);
        self.index += 1;

        Ok(value)
    }

    /// Returns the element before the cursor and moves in front of it.
    ///
    /// # Errors
    /// - [`Error::ConcurrentModification`] if the list was structurally changed elsewhere.
    /// - [`Error::NoSuchElement`] if the cursor is at the start of the list.
    pub fn previous<'a>(&mut self, list: &'a UnrolledList<T, N>) -> Result<&'a T> {
        self.check(list)?;
        if self.index == 0 {
            return Err(Error::NoSuchElement);
        }

        let target = match self.cached {
            Some(SearchTarget { segment, offset }) if offset > 0 => SearchTarget {
                segment,
                offset: offset - 1,
            },
            Some(SearchTarget { segment, .. }) => list.arena[segment]
                .prev()
                .map(|segment| SearchTarget {
                    segment,
                    offset: list.arena[segment].len().saturating_sub(1),
                })
                .ok_or(Error::NoSuchElement)?,
            None => list.resolve(self.index - 1).ok_or(Error::NoSuchElement)?,
        };

        let value = list.arena[target.segment]
            .get(target.offset)
            .ok_or(Error::NoSuchElement)?;

        self.index -= 1;
        self.cached = Some(target);
        self.last = Some(self.index);

        Ok(value)
    }

    /// Removes the element last returned by [`next`](Self::next) or
    /// [`previous`](Self::previous).
    ///
    /// # Errors
    /// - [`Error::ConcurrentModification`] if the list was structurally changed elsewhere.
    /// - [`Error::IllegalState`] if no element has been returned since the cursor was
    ///   created or last mutated the list.
    pub fn remove(&mut self, list: &mut UnrolledList<T, N>) -> Result<T> {
        self.check(list)?;
        let last = self.last.ok_or(Error::IllegalState(
            "remove requires a preceding call to next or previous",
        ))?;

        let value = list.remove(last)?;
        if last < self.index {
            self.index -= 1;
        }

        self.cached = None;
        self.last = None;
        self.expected_generation = list.generation;

        Ok(value)
    }

    /// Inserts `value` before the element [`next`](Self::next) would return and moves past it.
    ///
    /// # Errors
    /// [`Error::ConcurrentModification`] if the list was structurally changed elsewhere.
    pub fn insert(&mut self, list: &mut UnrolledList<T, N>, value: T) -> Result<()> {
        self.check(list)?;
        list.insert(self.index, value)?;

        self.index += 1;
        self.cached = None;
        self.last = None;
        self.expected_generation = list.generation;

        Ok(())
    }

    /// Replaces the element last returned by [`next`](Self::next) or
    /// [`previous`](Self::previous), returning the old one.
    ///
    /// # Errors
    /// - [`Error::ConcurrentModification`] if the list was structurally changed elsewhere.
    /// - [`Error::IllegalState`] if no element has been returned since the cursor was
    ///   created or last mutated the list.
    pub fn set(&mut self, list: &mut UnrolledList<T, N>, value: T) -> Result<T> {
        self.check(list)?;
        let last = self.last.ok_or(Error::IllegalState(
            "set requires a preceding call to next or previous",
        ))?;

        list.set(last, value)
    }

    fn check(&self, list: &UnrolledList<T, N>) -> Result<()> {
        if self.expected_generation != list.generation {
            return Err(Error::ConcurrentModification {
                expected: self.expected_generation,
                found: list.generation,
            });
        }

        Ok(())
    }
}

impl<T, const N: usize> Clone for Cursor<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T, const N: usize> std::fmt::Debug for Cursor<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("last", &self.last)
            .field("expected_generation", &self.expected_generation)
            .finish()
    }
}

/// A cursor that walks an [`UnrolledList`] from back to front.
///
/// This struct is created by [`UnrolledList::descending_cursor`].
///
/// # Examples
/// ```
/// use unrolled_list::UnrolledList;
///
/// let list: UnrolledList<i64, 2> = UnrolledList::from([1, 2, 3]);
/// let mut cursor = list.descending_cursor();
///
/// let mut out = Vec::new();
/// while cursor.has_next() {
///     out.push(*cursor.next(&list).unwrap());
/// }
/// assert_eq!(out, [3, 2, 1]);
/// ```
pub struct DescendingCursor<T, const N: usize = DEFAULT_CAPACITY>
where
    Usize<N>: SegmentCapacity,
{
    inner: Cursor<T, N>,
}

impl<T, const N: usize> DescendingCursor<T, N>
where
    Usize<N>: SegmentCapacity,
{
    pub(crate) fn new(inner: Cursor<T, N>) -> Self {
        Self { inner }
    }

    #[inline]
    pub const fn has_next(&self) -> bool {
        self.inner.has_previous()
    }

    /// Returns the element before the cursor and moves in front of it.
    #[inline]
    pub fn next<'a>(&mut self, list: &'a UnrolledList<T, N>) -> Result<&'a T> {
        self.inner.previous(list)
    }

    /// Removes the element last returned by [`next`](Self::next).
    #[inline]
    pub fn remove(&mut self, list: &mut UnrolledList<T, N>) -> Result<T> {
        self.inner.remove(list)
    }

    /// Replaces the element last returned by [`next`](Self::next).
    #[inline]
    pub fn set(&mut self, list: &mut UnrolledList<T, N>, value: T) -> Result<T> {
        self.inner.set(list, value)
    }

    pub fn into_inner(self) -> Cursor<T, N> {
        self.inner
    }
}

impl<T, const N: usize> Clone for DescendingCursor<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, const N: usize> std::fmt::Debug for DescendingCursor<T, N>
where
    Usize<N>: SegmentCapacity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DescendingCursor").field(&self.inner).finish()
    }
}
