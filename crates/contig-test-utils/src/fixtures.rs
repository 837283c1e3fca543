//! Reusable element fixtures for bridging tests.

use std::any::TypeId;

use contig_bridge::{Bridgeable, ForeignObject};

/// A user-defined element type that bridges by conversion.
///
/// Unlike the primitive impls, it also accepts [`OpaqueRef`] objects,
/// modelling a foreign subtype that may be stored in its slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opaque {
    pub id: u32,
    pub label: String,
}

impl Opaque {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A foreign-side reference that converts into an [`Opaque`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpaqueRef(pub u32);

impl Bridgeable for Opaque {
    fn to_foreign(&self) -> ForeignObject {
        ForeignObject::new(self.clone())
    }

    fn from_foreign(object: &ForeignObject) -> Option<Self> {
        if let Some(opaque) = object.downcast_ref::<Opaque>() {
            return Some(opaque.clone());
        }
        object
            .downcast_ref::<OpaqueRef>()
            .map(|r| Opaque::new(r.0, format!("ref-{}", r.0)))
    }

    fn accepts(candidate: TypeId) -> bool {
        candidate == TypeId::of::<Opaque>() || candidate == TypeId::of::<OpaqueRef>()
    }
}

/// `n` distinct [`Opaque`] values, labelled by index.
pub fn opaque_sequence(n: u32) -> Vec<Opaque> {
    (0..n).map(|i| Opaque::new(i, format!("item-{i}"))).collect()
}
