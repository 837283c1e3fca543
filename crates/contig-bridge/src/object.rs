//! The foreign element representation.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use contig_core::Identity;

/// A shared, type-erased object reference.
///
/// This is what a foreign container holds in every slot. Cloning shares
/// the object; [`identity`](ForeignObject::identity) tells two references
/// to the same object apart from two equal objects.
#[derive(Clone)]
pub struct ForeignObject {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ForeignObject {
    /// Box `value` as a foreign object.
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Arc::new(value),
            type_name: any::type_name::<V>(),
        }
    }

    /// The wrapped value, if it is a `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }

    /// Whether the wrapped value is a `V`.
    pub fn is<V: Any>(&self) -> bool {
        self.value_type_id() == TypeId::of::<V>()
    }

    /// Dynamic type of the wrapped value.
    pub fn value_type_id(&self) -> TypeId {
        Any::type_id(&*self.value)
    }

    /// Name of the wrapped value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Address of the shared object.
    pub fn identity(&self) -> Identity {
        Identity::of(Arc::as_ptr(&self.value))
    }

    /// Whether both references point at the same object.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.identity() == other.identity()
    }
}

impl fmt::Debug for ForeignObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignObject<{}>@{}", self.type_name, self.identity())
    }
}
