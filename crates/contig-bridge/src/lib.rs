//! Foreign bridging for contig buffers.
//!
//! Turns a typed [`Buffer`](contig_buffer::Buffer) into a type-erased
//! [`ForeignArray`] of [`ForeignObject`]s that code outside Rust can hold,
//! and exposes those arrays over a C ABI. This crate is one of two that
//! may contain `unsafe` code (along with `contig-buffer`); here it is
//! confined to the `extern "C"` entry points.
//!
//! ```
//! use contig_bridge::{BridgeExt, BridgeKind, ForeignObject};
//! use contig_buffer::Buffer;
//!
//! let numbers = Buffer::from(vec![1u32, 2, 3]);
//! let view = numbers.to_foreign();
//! assert_eq!(view.kind(), BridgeKind::Converted);
//! assert_eq!(view.to_native::<u32>().unwrap(), numbers);
//!
//! let objects = Buffer::from(vec![ForeignObject::new("a")]);
//! assert_eq!(objects.to_foreign().identity(), objects.identity());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into `ContigStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(status) => status,
            Err(_) => {
                log::error!("panic caught at the FFI boundary");
                $crate::status::ContigStatus::Panicked as i32
            }
        }
    };
}

/// Lock a mutex inside `ffi_guard!`, returning `InternalError` from
/// the guarded body if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::ContigStatus::InternalError as i32,
        }
    };
}

pub mod adapter;
pub mod bridgeable;
pub mod ffi;
mod handle;
pub mod object;
pub mod status;
pub mod view;

// Public re-exports for the primary API surface.
pub use adapter::BridgeExt;
pub use bridgeable::Bridgeable;
pub use ffi::{register_array, registered_arrays, take_array};
pub use object::ForeignObject;
pub use status::ContigStatus;
pub use view::{BridgeKind, ForeignArray};
