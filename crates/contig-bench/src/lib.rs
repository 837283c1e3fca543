//! Benchmark workloads for contig.
//!
//! Pre-built inputs shared by the criterion benches, so every bench
//! measures the same element counts and element shapes:
//!
//! - [`SIZES`]: element counts from cache-resident to well past L2
//! - [`sequential`]: a uniquely owned buffer of `0..n`
//! - [`labels`]: heap-owning elements, where clone and drop cost matters
//! - [`objects`]: foreign objects, which bridge verbatim

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use contig_bridge::ForeignObject;
use contig_buffer::Buffer;

/// Element counts every bench sweeps over.
pub const SIZES: [usize; 4] = [16, 256, 4_096, 65_536];

/// A uniquely owned buffer holding `0..n`, filled to capacity.
pub fn sequential(n: usize) -> Buffer<u64> {
    Buffer::from_fn(n, 0, |i| i as u64)
}

/// `n` short strings, each with its own heap allocation.
pub fn labels(n: usize) -> Buffer<String> {
    Buffer::from_fn(n, 0, |i| format!("label-{i:06}"))
}

/// `n` foreign objects wrapping their index.
pub fn objects(n: usize) -> Buffer<ForeignObject> {
    Buffer::from_fn(n, 0, |i| ForeignObject::new(i as u64))
}
