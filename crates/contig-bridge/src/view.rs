//! Foreign container views.

use std::any::{self, Any};
use std::fmt;
use std::slice;

use contig_buffer::Buffer;
use contig_core::{BridgeError, BufferError, Identity};

use crate::bridgeable::Bridgeable;
use crate::object::ForeignObject;

/// How a [`ForeignArray`] came by its elements.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeKind {
    /// No elements; backed by the shared empty block.
    Empty = 0,
    /// Shares the source buffer's block.
    Verbatim = 1,
    /// Owns a converted copy of the source elements.
    Converted = 2,
}

/// A read-only, type-erased array of [`ForeignObject`]s.
///
/// Every form holds a `Buffer<ForeignObject>`: the empty singleton, the
/// source block itself, or an independent converted block. Cloning is
/// O(1) in all three cases.
#[derive(Clone)]
pub struct ForeignArray {
    kind: BridgeKind,
    objects: Buffer<ForeignObject>,
}

impl ForeignArray {
    /// The view over the shared empty block. Does not allocate.
    pub fn empty() -> Self {
        Self {
            kind: BridgeKind::Empty,
            objects: Buffer::new(),
        }
    }

    pub(crate) fn verbatim(objects: Buffer<ForeignObject>) -> Self {
        if objects.is_empty() {
            return Self::empty();
        }
        Self {
            kind: BridgeKind::Verbatim,
            objects,
        }
    }

    pub(crate) fn converted(objects: Buffer<ForeignObject>) -> Self {
        if objects.is_empty() {
            return Self::empty();
        }
        Self {
            kind: BridgeKind::Converted,
            objects,
        }
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the view holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object at `index`.
    pub fn get(&self, index: usize) -> Option<&ForeignObject> {
        self.objects.get(index)
    }

    /// Object at `index`, or [`BufferError::IndexOutOfBounds`].
    pub fn at(&self, index: usize) -> Result<&ForeignObject, BufferError> {
        self.objects.at(index)
    }

    /// All objects, in index order.
    pub fn as_slice(&self) -> &[ForeignObject] {
        self.objects.as_slice()
    }

    /// Iterate over the objects.
    pub fn iter(&self) -> slice::Iter<'_, ForeignObject> {
        self.as_slice().iter()
    }

    /// How the view was built.
    pub fn kind(&self) -> BridgeKind {
        self.kind
    }

    /// Identity of the backing block. For a verbatim view this equals the
    /// source buffer's identity.
    pub fn identity(&self) -> Identity {
        self.objects.identity()
    }

    /// Whether every object holds a `V`. True when empty.
    pub fn stores_only<V: Any>(&self) -> bool {
        self.iter().all(ForeignObject::is::<V>)
    }

    /// Convert back into a native buffer of `T`.
    ///
    /// Fails with [`BridgeError::TypeMismatch`] at the first object that
    /// `T` cannot take back. Verbatim element types get the shared block
    /// back without copying.
    pub fn to_native<T: Bridgeable>(&self) -> Result<Buffer<T>, BridgeError> {
        if T::VERBATIM {
            if let Some(shared) = T::from_verbatim_buffer(&self.objects) {
                return Ok(shared);
            }
        }
        let mut native = Buffer::with_capacity(self.len());
        for (index, object) in self.iter().enumerate() {
            let value = T::from_foreign(object).ok_or(BridgeError::TypeMismatch {
                index,
                expected: any::type_name::<T>(),
            })?;
            native.push(value);
        }
        Ok(native)
    }
}

impl Default for ForeignArray {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Buffer<ForeignObject>> for ForeignArray {
    fn from(objects: Buffer<ForeignObject>) -> Self {
        Self::verbatim(objects)
    }
}

impl<'a> IntoIterator for &'a ForeignArray {
    type Item = &'a ForeignObject;
    type IntoIter = slice::Iter<'a, ForeignObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ForeignArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignArray")
            .field("kind", &self.kind)
            .field("identity", &self.identity())
            .field("objects", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_view_uses_singleton() {
        let view = ForeignArray::empty();
        assert_eq!(view.kind(), BridgeKind::Empty);
        assert_eq!(view.len(), 0);
        assert_eq!(view.identity(), contig_buffer::empty_identity());
        assert!(view.stores_only::<u8>());
    }

    #[test]
    fn empty_buffers_collapse_to_empty_kind() {
        let view = ForeignArray::from(Buffer::<ForeignObject>::with_capacity(4));
        assert_eq!(view.kind(), BridgeKind::Empty);
        assert_eq!(view.identity(), contig_buffer::empty_identity());
    }

    #[test]
    fn to_native_reports_first_mismatch() {
        let objects = Buffer::from(vec![
            ForeignObject::new(1u8),
            ForeignObject::new(2u8),
            ForeignObject::new("three"),
        ]);
        let view = ForeignArray::converted(objects);
        assert!(!view.stores_only::<u8>());
        assert_eq!(
            view.to_native::<u8>(),
            Err(BridgeError::TypeMismatch {
                index: 2,
                expected: "u8"
            })
        );
    }

    #[test]
    fn at_is_bounds_checked() {
        let view = ForeignArray::from(Buffer::from(vec![ForeignObject::new(())]));
        assert!(view.at(0).is_ok());
        assert_eq!(
            view.at(1).unwrap_err(),
            BufferError::IndexOutOfBounds { index: 1, count: 1 }
        );
    }
}
