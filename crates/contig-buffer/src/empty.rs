//! The process-wide empty storage block.
//!
//! Every buffer without storage points here instead of allocating. The
//! header is statically initialized, never mutated and never freed;
//! refcounting skips it by address.

use std::ptr::NonNull;

use contig_core::Identity;

use crate::storage::Header;

static EMPTY_STORAGE: Header = Header::empty();

pub(crate) fn empty_header() -> NonNull<Header> {
    NonNull::from(&EMPTY_STORAGE)
}

/// Identity shared by every empty buffer, whatever its element type.
pub fn empty_identity() -> Identity {
    Identity::of(&EMPTY_STORAGE as *const Header)
}
