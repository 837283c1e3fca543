//! Core types and traits for contig buffers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the storage and bridging crates: the error
//! taxonomy, the opaque [`Identity`] of a storage block, and the traits
//! through which a higher-level array type drives its backing buffer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{BridgeError, BufferError};
pub use id::Identity;
pub use traits::{ArrayBuffer, ElementStorage};
