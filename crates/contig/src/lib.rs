//! contig: copy-on-write, reference-counted contiguous buffers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all contig sub-crates. For most users, adding `contig` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use contig::prelude::*;
//!
//! // Clones share one block until someone writes.
//! let mut a: Buffer<u32> = Buffer::new();
//! a.append([1, 2, 3]);
//! let b = a.clone();
//! assert!(!a.is_uniquely_owned());
//!
//! // Appending past capacity reallocates; `b` still sees the old block.
//! a.append([4]);
//! assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
//! assert_eq!(b.as_slice(), &[1, 2, 3]);
//! assert!(b.is_uniquely_owned());
//!
//! // Hand the elements to foreign code and read them back.
//! let view = a.to_foreign();
//! assert_eq!(view.kind(), BridgeKind::Converted);
//! assert_eq!(view.to_native::<u32>().unwrap(), a);
//!
//! // Slices keep their block alive after the parent handle is gone.
//! let tail = a.slice(2..4);
//! drop(a);
//! assert_eq!(tail.as_slice(), &[3, 4]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `contig-core` | Errors, `Identity`, storage traits |
//! | [`buffer`] | `contig-buffer` | `Buffer`, `Slice`, `GrowthPolicy` |
//! | [`bridge`] | `contig-bridge` | Foreign objects and views, C ABI |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Errors, identities and storage traits (`contig-core`).
///
/// [`types::ElementStorage`] and [`types::ArrayBuffer`] are the seams a
/// higher-level array type drives its storage through.
pub use contig_core as types;

/// Storage blocks and handles (`contig-buffer`).
///
/// [`buffer::Buffer`] is the handle; [`buffer::GrowthPolicy`] tunes how
/// it grows.
pub use contig_buffer as buffer;

/// Foreign-object bridging and the C ABI (`contig-bridge`).
pub use contig_bridge as bridge;

/// Common imports for typical contig usage.
///
/// ```rust
/// use contig::prelude::*;
/// ```
pub mod prelude {
    // Storage
    pub use contig_buffer::{Buffer, GrowthPolicy, Slice};

    // Core types and traits
    pub use contig_core::{ArrayBuffer, ElementStorage, Identity};

    // Errors
    pub use contig_buffer::ConfigError;
    pub use contig_core::{BridgeError, BufferError};

    // Bridging
    pub use contig_bridge::{BridgeExt, BridgeKind, Bridgeable, ForeignArray, ForeignObject};
}
