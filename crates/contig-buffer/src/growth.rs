//! Append, reserve and range replacement.
//!
//! Writes into a block happen only through a uniquely owned handle. When
//! the handle is shared or the block is full, the elements move to a new
//! block first: bitwise when this handle is the sole owner, by `Clone`
//! otherwise.

#![allow(unsafe_code)]

use std::mem;
use std::ops::Range;
use std::ptr;

use smallvec::SmallVec;

use contig_core::{ArrayBuffer, BufferError};

use crate::buffer::{check_range, Buffer};
use crate::config::GrowthPolicy;

/// Staging area for replacement elements; short replacements stay inline.
type Staged<T> = SmallVec<[T; 8]>;

impl<T: Clone> Buffer<T> {
    /// Capacity needed to hold `new_count` elements under `policy`.
    fn target_capacity(&self, new_count: usize, policy: &GrowthPolicy) -> usize {
        let capacity = self.capacity();
        if new_count <= capacity {
            capacity
        } else {
            new_count.max(policy.grow(capacity))
        }
    }

    /// Swap to a fresh, unique block of `new_capacity` slots holding the
    /// current elements.
    fn reallocate(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.len());
        let moved = self.is_exclusive();
        log::trace!(
            "reallocating block {}: capacity {} -> {} ({})",
            self.identity(),
            self.capacity(),
            new_capacity,
            if moved { "moved" } else { "cloned" }
        );
        let fresh = if moved {
            self.reallocate_moving(new_capacity)
        } else {
            Self::from_iter_exact(new_capacity, self.as_slice().iter().cloned())
        };
        *self = fresh;
    }

    fn reallocate_moving(&mut self, new_capacity: usize) -> Self {
        let len = self.len();
        let fresh = Self::allocate(new_capacity);
        // SAFETY: `self` is unique (or the empty singleton, with `len == 0`)
        // and `fresh` is unique with room for `len` slots. The old count is
        // zeroed before the new one is set, so each element is owned by
        // exactly one block at any point where a drop could run.
        unsafe {
            ptr::copy_nonoverlapping(self.block.elements(), fresh.block.elements(), len);
            self.block.set_count(0);
            fresh.block.set_count(len);
        }
        fresh
    }

    /// Write `value` into the next free slot.
    ///
    /// # Safety
    ///
    /// The handle must be uniquely owned with `len < capacity`.
    unsafe fn push_unchecked(&mut self, value: T) {
        let len = self.len();
        // SAFETY: per the caller, slot `len` is in bounds and unobserved.
        unsafe {
            self.block.element_pointer(len).write(value);
            self.block.set_count(len + 1);
        }
    }

    /// Append one element, growing by `policy` when full.
    fn push_growing(&mut self, value: T, policy: &GrowthPolicy) {
        let len = self.len();
        if len == self.capacity() || !self.is_uniquely_owned() {
            self.reallocate(self.target_capacity(len + 1, policy));
        }
        // SAFETY: unique with a free slot after the check above.
        unsafe { self.push_unchecked(value) }
    }

    /// Append `new_elements` with the default doubling policy.
    pub fn append<I>(&mut self, new_elements: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.append_with(&GrowthPolicy::default(), new_elements);
    }

    /// Append `new_elements`, growing by `policy` if they do not fit.
    ///
    /// Fits in place when the handle is uniquely owned and has room for
    /// all of them; the block identity is then unchanged. Otherwise the
    /// buffer reallocates once, to at least `len + new_elements.len()`.
    /// Appending nothing never copies.
    ///
    /// # Panics
    ///
    /// If `policy` fails [`GrowthPolicy::validate`].
    pub fn append_with<I>(&mut self, policy: &GrowthPolicy, new_elements: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        if let Err(e) = policy.validate() {
            panic!("{e}");
        }
        let items = new_elements.into_iter();
        let old_count = self.len();
        let new_count = old_count.saturating_add(items.len());
        if new_count > self.capacity() || (new_count > old_count && !self.is_uniquely_owned()) {
            self.reallocate(self.target_capacity(new_count, policy));
        }
        for value in items {
            self.push_growing(value, policy);
        }
    }

    /// Append one element.
    pub fn push(&mut self, value: T) {
        self.push_growing(value, &GrowthPolicy::default());
    }

    /// Append clones of `items`.
    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.append(items.iter().cloned());
    }

    /// Make the buffer uniquely owned with room for at least
    /// `minimum_capacity` elements.
    ///
    /// Reserving zero on the empty buffer leaves it on the shared empty
    /// block.
    pub fn reserve(&mut self, minimum_capacity: usize) {
        if self.request_unique_mutable_buffer(minimum_capacity).is_some() {
            return;
        }
        let capacity = minimum_capacity.max(self.len());
        if capacity == 0 {
            return;
        }
        self.reallocate(capacity.max(self.capacity()));
    }

    /// Replace the elements in `range` with `new_elements`.
    ///
    /// In place when the handle is unique and the result fits; otherwise
    /// the result is built in a new block sized by the default policy.
    /// On error the buffer is untouched.
    pub fn replace_range<I>(&mut self, range: Range<usize>, new_elements: I) -> Result<(), BufferError>
    where
        I: IntoIterator<Item = T>,
    {
        let old_count = self.len();
        check_range(&range, old_count)?;
        let staged: Staged<T> = new_elements.into_iter().collect();
        let removed = range.end - range.start;
        let new_count = old_count - removed + staged.len();

        if self.is_uniquely_owned() && new_count <= self.capacity() {
            // SAFETY: unique and large enough.
            unsafe { self.replace_in_place(range, staged) };
            return Ok(());
        }

        let capacity = self.target_capacity(new_count, &GrowthPolicy::default());
        if self.is_exclusive() {
            // SAFETY: unique (the singleton only reaches here with an empty
            // range on an empty buffer, where nothing is read).
            unsafe { self.replace_moving(range, staged, capacity) };
        } else {
            let (prefix, rest) = self.as_slice().split_at(range.start);
            let suffix = &rest[removed..];
            let items = prefix
                .iter()
                .cloned()
                .chain(staged)
                .chain(suffix.iter().cloned());
            *self = Self::from_iter_exact(capacity, items);
        }
        Ok(())
    }

    /// # Safety
    ///
    /// Unique, with `len - range.len() + staged.len() <= capacity`.
    unsafe fn replace_in_place(&mut self, range: Range<usize>, staged: Staged<T>) {
        let old_count = self.len();
        let tail = old_count - range.end;
        let inserted = staged.len();
        let base = self.block.elements();
        // SAFETY: the count drops to `range.start` before anything else, so
        // a panicking destructor in the removed run leaks the tail instead
        // of dropping moved-from slots. The tail shift may overlap, hence
        // `ptr::copy`. Every slot below the final count is written before
        // the count is restored.
        unsafe {
            self.block.set_count(range.start);
            let removed = ptr::slice_from_raw_parts_mut(base.add(range.start), range.end - range.start);
            ptr::drop_in_place(removed);
            ptr::copy(base.add(range.end), base.add(range.start + inserted), tail);
            for (offset, value) in staged.into_iter().enumerate() {
                base.add(range.start + offset).write(value);
            }
            self.block.set_count(range.start + inserted + tail);
        }
    }

    /// # Safety
    ///
    /// The handle must be exclusive and `capacity` must hold the result.
    unsafe fn replace_moving(&mut self, range: Range<usize>, staged: Staged<T>, capacity: usize) {
        let old_count = self.len();
        let tail = old_count - range.end;
        let inserted = staged.len();
        let fresh = Self::allocate(capacity);
        let src = self.block.elements();
        let dst = fresh.block.elements();
        // SAFETY: `fresh` is unique with room for the result. Prefix and
        // tail are moved bitwise; the old block's count is zeroed first so
        // it will not drop them again, then the removed run is dropped
        // from the old block by hand.
        unsafe {
            self.block.set_count(0);
            ptr::copy_nonoverlapping(src, dst, range.start);
            for (offset, value) in staged.into_iter().enumerate() {
                dst.add(range.start + offset).write(value);
            }
            ptr::copy_nonoverlapping(src.add(range.end), dst.add(range.start + inserted), tail);
            fresh.block.set_count(range.start + inserted + tail);
            let old = mem::replace(self, fresh);
            let removed = ptr::slice_from_raw_parts_mut(src.add(range.start), range.end - range.start);
            ptr::drop_in_place(removed);
            drop(old);
        }
    }
}

impl<T: Clone> Extend<T> for Buffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let items = iter.into_iter();
        let (lower, _) = items.size_hint();
        let policy = GrowthPolicy::default();
        if lower > 0 {
            let wanted = self.target_capacity(self.len().saturating_add(lower), &policy);
            self.reserve(wanted);
        }
        for value in items {
            self.push_growing(value, &policy);
        }
    }
}

impl<T: Clone> FromIterator<T> for Buffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

impl<T: Clone> ArrayBuffer for Buffer<T> {
    fn capacity(&self) -> usize {
        Buffer::capacity(self)
    }

    fn is_uniquely_owned(&self) -> bool {
        Buffer::is_uniquely_owned(self)
    }

    fn request_unique_mutable_buffer(&mut self, minimum_capacity: usize) -> Option<&mut Self> {
        Buffer::request_unique_mutable_buffer(self, minimum_capacity)
    }

    fn replace_range<I>(&mut self, range: Range<usize>, new_elements: I) -> Result<(), BufferError>
    where
        I: IntoIterator<Item = Self::Element>,
    {
        Buffer::replace_range(self, range, new_elements)
    }
}
