//! Abstraction traits between an array type and its backing storage.

use std::ops::Range;

use crate::error::BufferError;
use crate::id::Identity;

/// Read-only, indexable access to a contiguous run of elements.
///
/// Implemented by owning buffers and by slice views that borrow a
/// buffer's block. Iteration is sequential index access over
/// [`elements`](ElementStorage::elements).
pub trait ElementStorage {
    /// The stored element type.
    type Element;

    /// Number of live elements.
    fn count(&self) -> usize;

    /// The live elements, in index order.
    fn elements(&self) -> &[Self::Element];

    /// Identity of the storage block backing these elements.
    fn identity(&self) -> Identity;

    /// Bounds-checked element access.
    fn element(&self, index: usize) -> Result<&Self::Element, BufferError> {
        let count = self.count();
        self.elements()
            .get(index)
            .ok_or(BufferError::IndexOutOfBounds { index, count })
    }
}

/// A growable buffer that an array type can mutate in place when it is
/// the sole owner.
pub trait ArrayBuffer: ElementStorage + Sized {
    /// Number of elements storable without reallocation.
    fn capacity(&self) -> usize;

    /// Whether no other handle can observe an in-place mutation.
    fn is_uniquely_owned(&self) -> bool;

    /// Return `self` if it is uniquely owned and has room for
    /// `minimum_capacity` elements. `None` means the caller must
    /// reallocate or copy before mutating.
    fn request_unique_mutable_buffer(&mut self, minimum_capacity: usize) -> Option<&mut Self>;

    /// Replace the elements in `range` with `new_elements`.
    fn replace_range<I>(&mut self, range: Range<usize>, new_elements: I) -> Result<(), BufferError>
    where
        I: IntoIterator<Item = Self::Element>;
}
