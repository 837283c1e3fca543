//! Foreign array lifecycle over the C ABI: register, inspect, clone,
//! destroy.
//!
//! Rust code hands a [`ForeignArray`] to foreign code by registering it
//! and passing the returned handle across. Foreign code never touches a
//! block directly; it reads through these functions and releases its
//! reference with [`contig_array_destroy`]. The global table lock is held
//! only for the lookup itself.

use std::sync::Mutex;

use crate::handle::HandleTable;
use crate::status::ContigStatus;
use crate::view::ForeignArray;

static ARRAYS: Mutex<HandleTable<ForeignArray>> = Mutex::new(HandleTable::new());

/// Clone the view behind `handle`, briefly locking the global table.
///
/// Returns `None` if the handle is invalid or the mutex is poisoned.
fn get_array(handle: u64) -> Option<ForeignArray> {
    ARRAYS.lock().ok()?.get(handle).cloned()
}

/// Publish `array` to foreign code, returning its handle.
///
/// The table holds its own reference, so the storage stays alive until
/// the handle is destroyed on either side.
pub fn register_array(array: ForeignArray) -> u64 {
    let mut arrays = ARRAYS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    arrays.insert(array)
}

/// Reclaim the view behind `handle`, invalidating the handle.
pub fn take_array(handle: u64) -> Option<ForeignArray> {
    ARRAYS.lock().ok()?.remove(handle)
}

/// Number of views currently registered.
pub fn registered_arrays() -> usize {
    ARRAYS.lock().map(|arrays| arrays.len()).unwrap_or(0)
}

/// Write the number of objects in the array to `len_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn contig_array_len(handle: u64, len_out: *mut u64) -> i32 {
    ffi_guard!({
        if len_out.is_null() {
            return ContigStatus::InvalidArgument as i32;
        }
        let Some(array) = get_array(handle) else {
            return ContigStatus::InvalidHandle as i32;
        };
        // SAFETY: len_out is non-null and valid per caller contract.
        unsafe { *len_out = array.len() as u64 };
        ContigStatus::Ok as i32
    })
}

/// Write how the array was built to `kind_out`: 0 empty, 1 verbatim,
/// 2 converted.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn contig_array_kind(handle: u64, kind_out: *mut i32) -> i32 {
    ffi_guard!({
        if kind_out.is_null() {
            return ContigStatus::InvalidArgument as i32;
        }
        let Some(array) = get_array(handle) else {
            return ContigStatus::InvalidHandle as i32;
        };
        // SAFETY: kind_out is non-null and valid per caller contract.
        unsafe { *kind_out = array.kind() as i32 };
        ContigStatus::Ok as i32
    })
}

/// Write the identity of the array's backing block to `identity_out`.
///
/// Two handles with equal identity and equal length view the same
/// elements.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn contig_array_identity(handle: u64, identity_out: *mut u64) -> i32 {
    ffi_guard!({
        if identity_out.is_null() {
            return ContigStatus::InvalidArgument as i32;
        }
        let Some(array) = get_array(handle) else {
            return ContigStatus::InvalidHandle as i32;
        };
        // SAFETY: identity_out is non-null and valid per caller contract.
        unsafe { *identity_out = array.identity().addr() as u64 };
        ContigStatus::Ok as i32
    })
}

/// Write the identity of the object at `index` to `identity_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn contig_array_object_identity(
    handle: u64,
    index: u64,
    identity_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if identity_out.is_null() {
            return ContigStatus::InvalidArgument as i32;
        }
        let Some(array) = get_array(handle) else {
            return ContigStatus::InvalidHandle as i32;
        };
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        let object = match array.at(index) {
            Ok(object) => object,
            Err(e) => return ContigStatus::from(&e) as i32,
        };
        // SAFETY: identity_out is non-null and valid per caller contract.
        unsafe { *identity_out = object.identity().addr() as u64 };
        ContigStatus::Ok as i32
    })
}

/// Register a second handle to the same array. O(1); no elements are
/// copied.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn contig_array_clone(handle: u64, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return ContigStatus::InvalidArgument as i32;
        }
        let mut arrays = ffi_lock!(ARRAYS);
        let Some(array) = arrays.get(handle).cloned() else {
            return ContigStatus::InvalidHandle as i32;
        };
        let cloned = arrays.insert(array);
        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = cloned };
        ContigStatus::Ok as i32
    })
}

/// Release a handle. The storage is freed once no handle or Rust value
/// references it. Destroying a stale handle returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn contig_array_destroy(handle: u64) -> i32 {
    ffi_guard!({
        let removed = ffi_lock!(ARRAYS).remove(handle);
        match removed {
            Some(_) => ContigStatus::Ok as i32,
            None => ContigStatus::InvalidHandle as i32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BridgeExt;
    use crate::object::ForeignObject;
    use crate::view::BridgeKind;
    use contig_buffer::Buffer;

    #[test]
    fn len_and_kind_round_trip() {
        let h = register_array(Buffer::from(vec![1u32, 2, 3]).to_foreign());
        let mut len = 0u64;
        let mut kind = -1i32;
        assert_eq!(contig_array_len(h, &mut len), ContigStatus::Ok as i32);
        assert_eq!(contig_array_kind(h, &mut kind), ContigStatus::Ok as i32);
        assert_eq!(len, 3);
        assert_eq!(kind, BridgeKind::Converted as i32);
        assert_eq!(contig_array_destroy(h), ContigStatus::Ok as i32);
    }

    #[test]
    fn destroyed_handle_is_invalid() {
        let h = register_array(ForeignArray::empty());
        assert_eq!(contig_array_destroy(h), ContigStatus::Ok as i32);
        let mut len = 0u64;
        assert_eq!(
            contig_array_len(h, &mut len),
            ContigStatus::InvalidHandle as i32
        );
        assert_eq!(contig_array_destroy(h), ContigStatus::InvalidHandle as i32);
    }

    #[test]
    fn null_out_pointer_is_rejected() {
        let h = register_array(ForeignArray::empty());
        assert_eq!(
            contig_array_len(h, std::ptr::null_mut()),
            ContigStatus::InvalidArgument as i32
        );
        assert!(take_array(h).is_some());
    }

    #[test]
    fn clone_shares_block_and_objects() {
        let source = Buffer::from(vec![ForeignObject::new('x')]);
        let h = register_array(source.to_foreign());
        let mut h2 = 0u64;
        assert_eq!(contig_array_clone(h, &mut h2), ContigStatus::Ok as i32);
        assert_ne!(h, h2);

        let (mut a, mut b) = (0u64, 0u64);
        contig_array_identity(h, &mut a);
        contig_array_identity(h2, &mut b);
        assert_eq!(a, b);
        assert_eq!(a, source.identity().addr() as u64);

        let mut object = 0u64;
        assert_eq!(
            contig_array_object_identity(h2, 0, &mut object),
            ContigStatus::Ok as i32
        );
        assert_eq!(object, source[0].identity().addr() as u64);
        assert_eq!(
            contig_array_object_identity(h2, 1, &mut object),
            ContigStatus::IndexOutOfBounds as i32
        );

        contig_array_destroy(h);
        let back = take_array(h2).unwrap();
        assert_eq!(back.identity(), source.identity());
    }

    #[test]
    fn registered_view_keeps_storage_alive() {
        let h = {
            let source = Buffer::from(vec![ForeignObject::new(5u64)]);
            register_array(source.to_foreign())
        };
        let view = take_array(h).unwrap();
        assert_eq!(view.get(0).unwrap().downcast_ref::<u64>(), Some(&5));
    }
}
