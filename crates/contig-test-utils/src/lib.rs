//! Test fixtures for contig development.
//!
//! Element types that count how often they are cloned and dropped, so
//! tests can check that a buffer destroys each element exactly once, and
//! a user-defined type that bridges by conversion.
//!
//! - [`DropCounter`]: a shared counter of destructions.
//! - [`Tracked`]: an element reporting its clones and drops.
//! - [`fixtures::Opaque`]: a non-verbatim [`Bridgeable`](contig_bridge::Bridgeable) type.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts clones and drops of the [`Tracked`] elements it hands out.
///
/// Cheap to clone; all clones share the same counters, so it can be
/// moved into another thread while the test keeps a copy.
#[derive(Clone, Debug, Default)]
pub struct DropCounter {
    drops: Arc<AtomicUsize>,
    clones: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new element carrying `value`, reporting to this counter.
    pub fn track(&self, value: u64) -> Tracked {
        Tracked {
            value,
            counter: self.clone(),
        }
    }

    /// Elements dropped so far.
    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    /// Elements cloned so far.
    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    /// Elements still alive, given how many were made by
    /// [`track`](Self::track).
    pub fn live(&self, tracked: usize) -> usize {
        tracked + self.clones() - self.drops()
    }
}

/// An element whose clones and drops are recorded in a [`DropCounter`].
#[derive(Debug)]
pub struct Tracked {
    pub value: u64,
    counter: DropCounter,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.counter.clones.fetch_add(1, Ordering::SeqCst);
        Self {
            value: self.value,
            counter: self.counter.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counter.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
