//! Element types that can cross into a foreign container.

use std::any::TypeId;

use contig_buffer::Buffer;

use crate::object::ForeignObject;

/// An element type a [`Buffer`] can hand to foreign code.
///
/// Whether the hand-off is free is a static fact of the type:
/// [`VERBATIM`](Bridgeable::VERBATIM) types are already foreign objects
/// and share their block as is, every other type converts each element
/// through [`to_foreign`](Bridgeable::to_foreign).
pub trait Bridgeable: Clone + Send + Sync + 'static {
    /// Elements are foreign objects already; bridging shares the block.
    ///
    /// A type setting this must also return `Some` from
    /// [`verbatim_buffer`](Bridgeable::verbatim_buffer), holding the same
    /// block as its argument; otherwise bridging falls back to conversion.
    const VERBATIM: bool = false;

    /// Convert one element.
    fn to_foreign(&self) -> ForeignObject;

    /// Convert one foreign object back, or `None` if it holds some other
    /// type.
    fn from_foreign(object: &ForeignObject) -> Option<Self>;

    /// Whether an object of dynamic type `candidate` may be stored as
    /// `Self`.
    fn accepts(candidate: TypeId) -> bool {
        candidate == TypeId::of::<Self>()
    }

    /// `buffer` viewed as foreign objects, sharing its block.
    fn verbatim_buffer(_buffer: &Buffer<Self>) -> Option<Buffer<ForeignObject>> {
        None
    }

    /// The inverse of [`verbatim_buffer`](Bridgeable::verbatim_buffer).
    fn from_verbatim_buffer(_objects: &Buffer<ForeignObject>) -> Option<Buffer<Self>> {
        None
    }
}

impl Bridgeable for ForeignObject {
    const VERBATIM: bool = true;

    fn to_foreign(&self) -> ForeignObject {
        self.clone()
    }

    fn from_foreign(object: &ForeignObject) -> Option<Self> {
        Some(object.clone())
    }

    /// A slot of foreign objects holds any type.
    fn accepts(_candidate: TypeId) -> bool {
        true
    }

    fn verbatim_buffer(buffer: &Buffer<Self>) -> Option<Buffer<ForeignObject>> {
        Some(buffer.clone())
    }

    fn from_verbatim_buffer(objects: &Buffer<ForeignObject>) -> Option<Buffer<Self>> {
        Some(objects.clone())
    }
}

/// Bridge plain values by boxing a clone of each element.
macro_rules! bridge_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bridgeable for $ty {
                fn to_foreign(&self) -> ForeignObject {
                    ForeignObject::new(self.clone())
                }

                fn from_foreign(object: &ForeignObject) -> Option<Self> {
                    object.downcast_ref::<$ty>().cloned()
                }
            }
        )*
    };
}

bridge_by_value!(
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
    Box<str>,
);
