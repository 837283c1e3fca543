//! Slice views that keep their parent block alive.

use std::fmt;
use std::mem;
use std::ops::{Deref, Range};

use contig_core::{BufferError, ElementStorage, Identity};

use crate::buffer::{check_range, Buffer};

/// A view of `len` elements starting at `start` in a shared block.
///
/// Holds a counted reference to the parent [`Buffer`], so the elements
/// outlive the buffer the view was taken from. Never copies.
pub struct Slice<T> {
    owner: Buffer<T>,
    start: usize,
    len: usize,
}

impl<T> Slice<T> {
    pub(crate) fn new(owner: Buffer<T>, range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= owner.len());
        Self {
            owner,
            start: range.start,
            len: range.end - range.start,
        }
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the first element within the parent block.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The handle keeping the parent block alive.
    pub fn owner(&self) -> &Buffer<T> {
        &self.owner
    }

    /// Identity of the viewed elements: the parent block's identity
    /// offset by `start` elements.
    ///
    /// Two views with equal identity and equal length show the same
    /// elements. Use `owner().identity()` to ask whether views share a
    /// block.
    pub fn identity(&self) -> Identity {
        let offset = self.start * mem::size_of::<T>();
        Identity::from_addr(self.owner.identity().addr() + offset)
    }

    /// The viewed elements.
    pub fn as_slice(&self) -> &[T] {
        &self.owner.as_slice()[self.start..self.start + self.len]
    }

    /// Element at `index` within the view.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// A narrower view over the same block, `range` relative to this one.
    pub fn slice(&self, range: Range<usize>) -> Result<Self, BufferError> {
        check_range(&range, self.len)?;
        Ok(Self {
            owner: self.owner.clone(),
            start: self.start + range.start,
            len: range.end - range.start,
        })
    }
}

impl<T: Clone> Slice<T> {
    /// Copy the viewed elements into a new, uniquely owned buffer.
    pub fn to_buffer(&self) -> Buffer<T> {
        Buffer::from(self.as_slice())
    }
}

impl<T> Clone for Slice<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            start: self.start,
            len: self.len,
        }
    }
}

impl<T> Deref for Slice<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for Slice<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> ElementStorage for Slice<T> {
    type Element = T;

    fn count(&self) -> usize {
        self.len
    }

    fn elements(&self) -> &[T] {
        self.as_slice()
    }

    fn identity(&self) -> Identity {
        Slice::identity(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reads_range_of_parent() {
        let b = Buffer::from(vec![10, 20, 30, 40, 50]);
        let s = b.slice(1..4);
        assert_eq!(s.len(), 3);
        assert_eq!(s.as_slice(), &[20, 30, 40]);
        assert_eq!(s.start(), 1);
        assert_eq!(s.owner().identity(), b.identity());
        assert_eq!(s.element(2), Ok(&40));
        assert_eq!(
            s.element(3),
            Err(BufferError::IndexOutOfBounds { index: 3, count: 3 })
        );
    }

    #[test]
    fn overlapping_slices_have_distinct_identities() {
        let b = Buffer::from(vec![1, 2, 3]);
        let front = b.slice(0..2);
        let back = b.slice(1..3);
        assert_eq!(front.len(), back.len());
        assert_ne!(front.identity(), back.identity());
        assert_eq!(front.owner().identity(), back.owner().identity());
        assert_eq!(front.identity(), b.identity());
        assert_eq!(back.slice(0..2).unwrap().identity(), back.identity());
        assert_eq!(
            front.slice(1..2).unwrap().identity(),
            back.slice(0..1).unwrap().identity()
        );
    }

    #[test]
    fn slice_shares_parent_block() {
        let b = Buffer::from(vec![1, 2, 3]);
        let s = b.slice(0..2);
        assert!(!b.is_uniquely_owned());
        drop(s);
        assert!(b.is_uniquely_owned());
    }

    #[test]
    fn slice_outlives_parent_handle() {
        let s = {
            let b = Buffer::from(vec![String::from("x"), "y".into()]);
            b.slice(1..2)
        };
        assert_eq!(s.as_slice(), &["y"]);
        assert!(s.owner().is_uniquely_owned());
    }

    #[test]
    fn empty_slices_are_allowed() {
        let b = Buffer::from(vec![1]);
        assert!(b.slice(1..1).is_empty());
        assert!(Buffer::<u8>::new().slice(0..0).is_empty());
    }

    #[test]
    #[should_panic(expected = "range 1..3 out of bounds for count 2")]
    fn slice_past_end_panics() {
        let _ = Buffer::from(vec![1, 2]).slice(1..3);
    }

    #[test]
    fn sub_slices_are_relative() {
        let b = Buffer::from_fn(10, 0, |i| i);
        let s = b.slice(2..8).slice(1..3).unwrap();
        assert_eq!(s.as_slice(), &[3, 4]);
        assert_eq!(s.start(), 3);
        assert!(b.slice(2..4).slice(0..3).is_err());
    }

    #[test]
    fn to_buffer_copies() {
        let b = Buffer::from(vec![1, 2, 3]);
        let copy = b.slice(1..3).to_buffer();
        assert_eq!(copy.as_slice(), &[2, 3]);
        assert!(!Buffer::ptr_eq(&copy, &b));
        assert!(copy.is_uniquely_owned());
    }

    #[test]
    fn mutating_parent_after_slicing_copies() {
        let mut b = Buffer::from(vec![1, 2, 3]);
        let s = b.slice(0..3);
        b.set(0, 9).unwrap();
        assert_eq!(s.as_slice(), &[1, 2, 3]);
        assert_eq!(b.as_slice(), &[9, 2, 3]);
    }
}
