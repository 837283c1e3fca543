//! Copy-on-write, reference-counted contiguous storage for contig.
//!
//! A [`Buffer`] is a counted handle to a single heap allocation holding a
//! small header followed by the elements inline. Handles clone in O(1)
//! and share the block; a mutation through a handle that does not own
//! its block alone copies the elements first. This crate is one of two
//! that may contain `unsafe` code (along with `contig-bridge`).
//!
//! # Architecture
//!
//! ```text
//! Buffer<T> (handle, Clone = retain, Drop = release)
//! ├── Block<T> → Header { refcount, count, capacity } + [T; capacity]
//! ├── EMPTY_STORAGE (static zero-capacity header, never freed)
//! ├── growth: append / push / reserve / replace_range under a GrowthPolicy
//! └── Slice<T> (cloned Buffer<T> + start + len)
//! ```
//!
//! # Ownership rules
//!
//! - **Unique:** exactly one handle references the block. Writes happen
//!   in place.
//! - **Shared:** several handles (or slices) reference the block. Writes
//!   clone the elements into a new block first.
//! - **Empty:** the handle references the static singleton, which is
//!   never unique and never written.
//!
//! ```
//! use contig_buffer::Buffer;
//!
//! let mut a = Buffer::new();
//! a.append([1, 2, 3]);
//! let b = a.clone();
//! a.push(4);
//! assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
//! assert_eq!(b.as_slice(), &[1, 2, 3]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
mod empty;
mod growth;
pub mod slice;
mod storage;

// Public re-exports for the primary API surface.
pub use buffer::Buffer;
pub use config::{ConfigError, GrowthPolicy};
pub use empty::empty_identity;
pub use slice::Slice;
