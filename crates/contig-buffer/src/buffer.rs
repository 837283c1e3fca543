//! The buffer handle: a counted reference to a storage block.
//!
//! Cloning a [`Buffer`] never copies elements, it bumps the block's
//! reference count. Mutation goes through `&mut self` and is done in
//! place only while the handle is the block's sole owner; otherwise the
//! elements are copied to a fresh block first.

#![allow(unsafe_code)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Deref, Range};
use std::ptr;
use std::slice;

use contig_core::{BufferError, ElementStorage, Identity};

use crate::slice::Slice;
use crate::storage::Block;

/// A copy-on-write, reference-counted, growable contiguous buffer.
///
/// Elements live inline in a single allocation after a small header.
/// Buffers with no storage share one static empty block, so
/// [`Buffer::new`] never allocates.
pub struct Buffer<T> {
    pub(crate) block: Block<T>,
}

// SAFETY: handles share elements across threads (`Sync` on `T`) and the
// last handle may drop them on any thread (`Send` on `T`). The reference
// count is atomic, and element writes require a unique handle.
unsafe impl<T: Send + Sync> Send for Buffer<T> {}
// SAFETY: see above; `&Buffer<T>` only hands out `&T`.
unsafe impl<T: Send + Sync> Sync for Buffer<T> {}

impl<T> Buffer<T> {
    /// An empty buffer backed by the shared empty block. O(1).
    pub fn new() -> Self {
        Self {
            block: Block::empty(),
        }
    }

    /// An empty buffer with room for at least `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::allocate(capacity)
    }

    /// Build `count` elements with `init(index)`, in a block with room
    /// for at least `max(count, minimum_capacity)` elements.
    ///
    /// If `init` panics, the elements built so far are dropped with the
    /// buffer and the rest are never read.
    pub fn from_fn<F>(count: usize, minimum_capacity: usize, mut init: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        let buffer = Self {
            block: Block::allocate(count, minimum_capacity),
        };
        for index in 0..count {
            let value = init(index);
            // SAFETY: `index < count <= capacity`, the fresh block is
            // unique, and slot `index` is written before it is counted.
            unsafe {
                buffer.block.element_pointer(index).write(value);
                buffer.block.set_count(index + 1);
            }
        }
        buffer
    }

    /// A unique, empty buffer with room for `capacity` elements.
    pub(crate) fn allocate(capacity: usize) -> Self {
        Self {
            block: Block::allocate(0, capacity),
        }
    }

    /// Move up to `capacity` items from `items` into a fresh block.
    pub(crate) fn from_iter_exact<I>(capacity: usize, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let buffer = Self::allocate(capacity);
        for (index, value) in items.into_iter().take(capacity).enumerate() {
            // SAFETY: `take` bounds `index` by the capacity; the block is
            // unique and slot `index` is written before it is counted.
            unsafe {
                buffer.block.element_pointer(index).write(value);
                buffer.block.set_count(index + 1);
            }
        }
        buffer
    }

    /// Number of live elements. O(1).
    pub fn len(&self) -> usize {
        self.block.count()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements storable without reallocating. 0 for the empty block.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Whether this handle is the only one referencing its block.
    ///
    /// Always `false` for the shared empty block, which is never mutated.
    pub fn is_uniquely_owned(&self) -> bool {
        self.block.is_unique()
    }

    /// Whether the handle can move its elements out without copying:
    /// it owns its block, or the block is the empty singleton.
    pub(crate) fn is_exclusive(&self) -> bool {
        self.block.is_singleton() || self.block.is_unique()
    }

    /// Address of the storage block.
    pub fn identity(&self) -> Identity {
        Identity::of(self.block.addr())
    }

    /// Whether both handles reference the same block.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.block.addr() == other.block.addr()
    }

    /// Whether both handles denote literally the same elements: same
    /// block and same count.
    pub fn is_identical(this: &Self, other: &Self) -> bool {
        Self::ptr_eq(this, other) && this.len() == other.len()
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are initialized and stay alive while
        // `self` holds its reference; nobody writes them while shared.
        unsafe { slice::from_raw_parts(self.block.elements(), self.len()) }
    }

    /// Mutable access to the elements, if this handle owns its block.
    pub fn get_mut(&mut self) -> Option<&mut [T]> {
        if !self.is_uniquely_owned() {
            return None;
        }
        // SAFETY: unique ownership plus `&mut self` rules out any other
        // reader of slots `[0, len)`.
        Some(unsafe { slice::from_raw_parts_mut(self.block.elements(), self.len()) })
    }

    /// Element at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Element at `index`, or [`BufferError::IndexOutOfBounds`].
    pub fn at(&self, index: usize) -> Result<&T, BufferError> {
        let count = self.len();
        self.get(index)
            .ok_or(BufferError::IndexOutOfBounds { index, count })
    }

    /// Overwrite the live count.
    ///
    /// On the empty block only `0` is accepted, as a no-op.
    ///
    /// # Safety
    ///
    /// The handle must own its block uniquely. Growing the count exposes
    /// slots that must already be initialized; shrinking it leaks the
    /// elements that fall outside.
    ///
    /// # Panics
    ///
    /// Panics with [`BufferError::CapacityExceeded`] if
    /// `count > capacity`, and if the handle is shared.
    pub unsafe fn set_count(&mut self, count: usize) {
        assert!(
            self.block.is_singleton() || self.is_uniquely_owned(),
            "set_count on a shared buffer"
        );
        // SAFETY: forwarded from the caller; capacity is asserted inside.
        unsafe { self.block.set_count(count) }
    }

    /// Return `self` if it is uniquely owned with room for
    /// `minimum_capacity` elements; `None` tells the caller to reallocate.
    pub fn request_unique_mutable_buffer(&mut self, minimum_capacity: usize) -> Option<&mut Self> {
        if self.is_uniquely_owned() && self.capacity() >= minimum_capacity {
            Some(self)
        } else {
            None
        }
    }

    /// A handle that keeps the elements alive.
    pub fn owner(&self) -> Self {
        self.clone()
    }

    /// A view of `range` that shares this block. O(1).
    ///
    /// # Panics
    ///
    /// Panics with [`BufferError::RangeOutOfBounds`] if the range is
    /// reversed or reaches past `len`.
    pub fn slice(&self, range: Range<usize>) -> Slice<T> {
        match self.try_slice(range) {
            Ok(slice) => slice,
            Err(e) => panic!("{e}"),
        }
    }

    /// A view of `range` that shares this block, or an error if the
    /// range is invalid.
    pub fn try_slice(&self, range: Range<usize>) -> Result<Slice<T>, BufferError> {
        check_range(&range, self.len())?;
        Ok(Slice::new(self.clone(), range))
    }

    /// Drop all elements, keeping the capacity when the block is owned.
    pub fn clear(&mut self) {
        if !self.is_uniquely_owned() {
            *self = Self::new();
            return;
        }
        let len = self.len();
        // SAFETY: unique; the count is zeroed before the elements are
        // dropped so a panicking destructor cannot cause a double drop.
        unsafe {
            self.block.set_count(0);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.block.elements(), len));
        }
    }
}

impl<T: Clone> Buffer<T> {
    /// Make this handle the sole owner of its elements, copying them to a
    /// fresh block of the same capacity if the block is shared.
    pub fn make_mut(&mut self) -> &mut [T] {
        if !self.is_uniquely_owned() {
            if self.block.is_singleton() {
                return &mut [];
            }
            log::debug!(
                "copy-on-write: cloning {} elements out of shared block {}",
                self.len(),
                self.identity()
            );
            let copy = Self::from_iter_exact(self.capacity(), self.as_slice().iter().cloned());
            *self = copy;
        }
        // SAFETY: unique after the copy above.
        unsafe { slice::from_raw_parts_mut(self.block.elements(), self.len()) }
    }

    /// Replace the element at `index`, returning the old one.
    ///
    /// Copies first if the block is shared.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, BufferError> {
        let count = self.len();
        if index >= count {
            return Err(BufferError::IndexOutOfBounds { index, count });
        }
        Ok(mem::replace(&mut self.make_mut()[index], value))
    }

    /// Shorten to `len` elements, dropping the rest.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len();
        if len >= old_len {
            return;
        }
        if !self.is_uniquely_owned() {
            let copy = Self::from_iter_exact(len, self.as_slice()[..len].iter().cloned());
            *self = copy;
            return;
        }
        // SAFETY: unique; the count shrinks before the tail is dropped.
        unsafe {
            self.block.set_count(len);
            let tail = self.block.elements().add(len);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(tail, old_len - len));
        }
    }
}

pub(crate) fn check_range(range: &Range<usize>, count: usize) -> Result<(), BufferError> {
    if range.start > range.end || range.end > count {
        return Err(BufferError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            count,
        });
    }
    Ok(())
}

impl<T> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        self.block.retain();
        Self { block: self.block }
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        // SAFETY: each handle holds exactly one reference and this is the
        // last use of it.
        unsafe { self.block.release() }
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsRef<[T]> for Buffer<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Element-wise, like `[T]`. Handles sharing a block still compare their
/// elements, so a `NaN` element is unequal to itself.
impl<T: PartialEq> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Buffer<T> {}

impl<T: Hash> Hash for Buffer<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<'a, T> IntoIterator for &'a Buffer<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: Clone> From<&[T]> for Buffer<T> {
    fn from(items: &[T]) -> Self {
        Self::from_iter_exact(items.len(), items.iter().cloned())
    }
}

impl<T> From<Vec<T>> for Buffer<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_iter_exact(items.len(), items)
    }
}

impl<T> ElementStorage for Buffer<T> {
    type Element = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn elements(&self) -> &[T] {
        self.as_slice()
    }

    fn identity(&self) -> Identity {
        Buffer::identity(self)
    }
}
