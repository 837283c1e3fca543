//! Storage blocks: a header followed by inline element slots, in one
//! allocation.
//!
//! ```text
//! +----------------------------+------+------+-----+------------------+
//! | Header                     | T[0] | T[1] | ... | T[capacity - 1]  |
//! | refcount | count | capacity|      |      |     |                  |
//! +----------------------------+------+------+-----+------------------+
//!                              ^ elements_offset::<T>()
//! ```
//!
//! Slots `[0, count)` are initialized, `[count, capacity)` are not. A
//! [`Block`] is a raw, `Copy` pointer to such an allocation. It does not
//! own anything by itself: [`Buffer`](crate::Buffer) decides when to
//! retain and release.
//!
//! Every `unsafe` operation on element memory in this crate funnels
//! through here or through the handle and growth modules, each with a
//! `// SAFETY:` note.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::cmp;
use std::marker::PhantomData;
use std::mem;
use std::process;
use std::ptr::{self, NonNull};
use std::sync::atomic::{self, AtomicUsize, Ordering};

use crate::empty;

/// Past this many references the count could overflow into garbage.
const MAX_REFCOUNT: usize = isize::MAX as usize;

/// Block metadata, laid out immediately before the element slots.
#[repr(C)]
pub(crate) struct Header {
    /// Live handles referencing this block.
    refcount: AtomicUsize,
    /// Initialized slots. Written only by a unique owner.
    count: AtomicUsize,
    /// Allocated slots. Fixed at allocation.
    capacity: usize,
}

impl Header {
    /// Header of the zero-capacity singleton.
    pub(crate) const fn empty() -> Self {
        Self {
            refcount: AtomicUsize::new(1),
            count: AtomicUsize::new(0),
            capacity: 0,
        }
    }
}

/// Raw pointer to a storage block holding elements of type `T`.
pub(crate) struct Block<T> {
    header: NonNull<Header>,
    _marker: PhantomData<T>,
}

impl<T> Clone for Block<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Block<T> {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl<T> Block<T> {
    /// The shared zero-capacity block.
    pub(crate) fn empty() -> Self {
        Self {
            header: empty::empty_header(),
            _marker: PhantomData,
        }
    }

    /// Allocate a block sized for `max(count, minimum_capacity)` slots.
    ///
    /// All slots start uninitialized and the live count starts at zero;
    /// callers advance it as they initialize slots. A zero-slot request
    /// returns the singleton without allocating.
    ///
    /// Aborts via [`alloc::handle_alloc_error`] if the allocator fails.
    pub(crate) fn allocate(count: usize, minimum_capacity: usize) -> Self {
        let capacity = cmp::max(count, minimum_capacity);
        if capacity == 0 {
            return Self::empty();
        }
        let layout = Self::layout(capacity);
        // SAFETY: the layout always includes the header, so it is never
        // zero-sized.
        let raw = unsafe { alloc::alloc(layout) }.cast::<Header>();
        let Some(header) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout)
        };
        // SAFETY: `header` is a fresh allocation, sized and aligned for
        // `Header` at offset 0.
        unsafe {
            header.as_ptr().write(Header {
                refcount: AtomicUsize::new(1),
                count: AtomicUsize::new(0),
                capacity,
            });
        }
        Self {
            header,
            _marker: PhantomData,
        }
    }

    /// Allocation layout for a block of `capacity` slots.
    fn layout(capacity: usize) -> Layout {
        Layout::array::<T>(capacity)
            .and_then(|elements| Layout::new::<Header>().extend(elements))
            .map(|(layout, _)| layout.pad_to_align())
            .unwrap_or_else(|_| capacity_overflow())
    }

    /// Byte offset of slot 0 from the start of the block.
    ///
    /// Matches the offset `Layout::extend` computes in [`Block::layout`].
    const fn elements_offset() -> usize {
        let align = mem::align_of::<T>();
        let header = mem::size_of::<Header>();
        header.div_ceil(align) * align
    }

    fn header(&self) -> &Header {
        // SAFETY: `header` points at the static singleton or at a block
        // kept alive by the handle that owns this `Block`.
        unsafe { self.header.as_ref() }
    }

    /// Whether this is the shared zero-capacity singleton.
    pub(crate) fn is_singleton(self) -> bool {
        self.header == empty::empty_header()
    }

    /// Address of the header, used as the block's identity.
    pub(crate) fn addr(self) -> *const Header {
        self.header.as_ptr()
    }

    pub(crate) fn count(self) -> usize {
        self.header().count.load(Ordering::Relaxed)
    }

    pub(crate) fn capacity(self) -> usize {
        self.header().capacity
    }

    /// Set the live count.
    ///
    /// Setting the singleton's count to zero is a no-op.
    ///
    /// # Safety
    ///
    /// The caller must own the block uniquely, and slots `[0, count)`
    /// must be initialized.
    ///
    /// # Panics
    ///
    /// Panics if `count > capacity`.
    pub(crate) unsafe fn set_count(self, count: usize) {
        let capacity = self.capacity();
        assert!(
            count <= capacity,
            "{}",
            contig_core::BufferError::CapacityExceeded {
                requested: count,
                capacity,
            }
        );
        if self.is_singleton() {
            return;
        }
        self.header().count.store(count, Ordering::Relaxed);
    }

    /// Pointer to slot 0.
    ///
    /// Dangling (but aligned) for a zero-capacity block.
    pub(crate) fn elements(self) -> *mut T {
        if self.capacity() == 0 {
            return NonNull::dangling().as_ptr();
        }
        // SAFETY: the offset stays inside the allocation because the
        // block has at least one slot after the header.
        unsafe {
            self.header
                .as_ptr()
                .cast::<u8>()
                .add(Self::elements_offset())
                .cast::<T>()
        }
    }

    /// Pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity`.
    pub(crate) unsafe fn element_pointer(self, index: usize) -> *mut T {
        debug_assert!(index < self.capacity());
        // SAFETY: in bounds of the element region per the caller.
        unsafe { self.elements().add(index) }
    }

    /// Record one more handle.
    pub(crate) fn retain(self) {
        if self.is_singleton() {
            return;
        }
        let old = self.header().refcount.fetch_add(1, Ordering::Relaxed);
        if old > MAX_REFCOUNT {
            process::abort();
        }
    }

    /// Drop one handle's reference, destroying the block on the last one.
    ///
    /// # Safety
    ///
    /// The caller must hold a reference it has not yet released, and must
    /// not use the block afterwards.
    pub(crate) unsafe fn release(self) {
        if self.is_singleton() {
            return;
        }
        if self.header().refcount.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        atomic::fence(Ordering::Acquire);
        // SAFETY: that was the last reference.
        unsafe { self.destroy() }
    }

    /// Exactly one handle references this block. Never true for the
    /// singleton.
    pub(crate) fn is_unique(self) -> bool {
        !self.is_singleton() && self.header().refcount.load(Ordering::Acquire) == 1
    }

    /// Drop the live elements in index order, then free the allocation.
    ///
    /// # Safety
    ///
    /// Called once, after the last reference is gone.
    unsafe fn destroy(self) {
        struct Dealloc(*mut u8, Layout);

        impl Drop for Dealloc {
            fn drop(&mut self) {
                // SAFETY: allocated by `Block::allocate` with this layout.
                unsafe { alloc::dealloc(self.0, self.1) }
            }
        }

        let count = self.count();
        let _dealloc = Dealloc(
            self.header.as_ptr().cast::<u8>(),
            Self::layout(self.capacity()),
        );
        // SAFETY: slots `[0, count)` are initialized and nobody else can
        // reach them any more. The memory is freed even if a destructor
        // panics.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.elements(), count));
        }
    }
}
