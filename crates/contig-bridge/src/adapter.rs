//! Handing buffers to foreign code.
//!
//! [`BridgeExt`] is the only door between a typed [`Buffer`] and a
//! [`ForeignArray`]. The verbatim/converted decision is a compile-time
//! property of the element type, so there is no per-call type test.

use std::any::{self, TypeId};

use contig_buffer::Buffer;
use contig_core::{BridgeError, BufferError};

use crate::bridgeable::Bridgeable;
use crate::object::ForeignObject;
use crate::view::ForeignArray;

/// Foreign bridging operations on a [`Buffer`].
pub trait BridgeExt {
    /// Whether elements of this buffer's type bridge for free.
    fn elements_bridge_verbatim() -> bool
    where
        Self: Sized;

    /// A foreign view of the elements.
    ///
    /// Empty buffers map to [`ForeignArray::empty`]. Verbatim element
    /// types share the block in O(1); other types are converted into a
    /// new, independent block in O(n). A view is only labelled verbatim
    /// when [`Bridgeable::verbatim_buffer`] hands back this very block.
    fn to_foreign(&self) -> ForeignArray;

    /// Whether this particular buffer would bridge without conversion.
    /// False when empty, since the empty view needs no bridging at all.
    fn bridges_verbatim(&self) -> bool;

    /// Whether foreign code may store objects of dynamic type `candidate`
    /// into this buffer. Always false for the shared empty block.
    fn can_store_elements_of_type(&self, candidate: TypeId) -> bool;

    /// Store `object` at `index`, converting it to the element type.
    ///
    /// The type is checked before the buffer is touched; a mismatch
    /// returns [`BridgeError::TypeMismatch`] and leaves the buffer as it
    /// was. Copies first if the block is shared.
    fn store_foreign(&mut self, index: usize, object: &ForeignObject) -> Result<(), BridgeError>;
}

impl<T: Bridgeable> BridgeExt for Buffer<T> {
    fn elements_bridge_verbatim() -> bool {
        T::VERBATIM
    }

    fn to_foreign(&self) -> ForeignArray {
        if self.is_empty() {
            return ForeignArray::empty();
        }
        if T::VERBATIM {
            match T::verbatim_buffer(self) {
                Some(shared)
                    if shared.identity() == self.identity() && shared.len() == self.len() =>
                {
                    return ForeignArray::verbatim(shared);
                }
                _ => log::warn!(
                    "{} is tagged verbatim but did not share its block; converting",
                    any::type_name::<T>()
                ),
            }
        }
        log::trace!(
            "bridging {} elements of {} by conversion",
            self.len(),
            any::type_name::<T>()
        );
        let objects = Buffer::from_fn(self.len(), 0, |index| self[index].to_foreign());
        ForeignArray::converted(objects)
    }

    fn bridges_verbatim(&self) -> bool {
        T::VERBATIM && !self.is_empty()
    }

    fn can_store_elements_of_type(&self, candidate: TypeId) -> bool {
        if self.identity() == contig_buffer::empty_identity() {
            return false;
        }
        T::accepts(candidate)
    }

    fn store_foreign(&mut self, index: usize, object: &ForeignObject) -> Result<(), BridgeError> {
        let count = self.len();
        if index >= count {
            return Err(BufferError::IndexOutOfBounds { index, count }.into());
        }
        let mismatch = BridgeError::TypeMismatch {
            index,
            expected: any::type_name::<T>(),
        };
        if !self.can_store_elements_of_type(object.value_type_id()) {
            return Err(mismatch);
        }
        let value = T::from_foreign(object).ok_or(mismatch)?;
        self.set(index, value)?;
        Ok(())
    }
}
