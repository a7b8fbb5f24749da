//! Array lifecycle and mutation FFI.
//!
//! Arrays live in a process-global `Registry`. The registry lock is held
//! for the duration of each call, which serialises all access; callers
//! that share one array across threads get no additional guarantees.
//!
//! Element values cross the boundary as raw byte pointers that must cover
//! exactly `element_size` bytes. They may point into the array itself:
//! values are copied out before the array is mutated.

use std::sync::Mutex;

use fatarray::{ArrayConfig, FatArray};

use crate::registry::Registry;
use crate::status::FatArrayStatus;

static ARRAYS: Mutex<Registry> = Mutex::new(Registry::new());

/// Read one header field into `out`.
#[allow(unsafe_code)]
fn query(handle: u64, out: *mut usize, read: impl FnOnce(&FatArray) -> usize) -> i32 {
    if out.is_null() {
        return FatArrayStatus::InvalidArgument as i32;
    }
    match ffi_lock!(ARRAYS).read(handle, read) {
        Ok(value) => {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = value };
            FatArrayStatus::Ok as i32
        }
        Err(status) => status as i32,
    }
}

/// Create an array and write its handle to `out`.
///
/// `capacity == 0` selects the default of one slot. When `data` is
/// non-null, `length * element_size` bytes are copied from it; otherwise
/// the `length` live elements are zeroed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_make(
    element_size: usize,
    capacity: usize,
    length: usize,
    data: *const u8,
    out: *mut u64,
) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FatArrayStatus::InvalidArgument as i32;
        }
        let capacity = if capacity == 0 {
            ArrayConfig::DEFAULT_CAPACITY
        } else {
            capacity
        };
        let config = ArrayConfig::new(element_size)
            .with_capacity(capacity)
            .with_length(length);
        if let Err(e) = config.validate() {
            return FatArrayStatus::from(&e) as i32;
        }

        let source = if data.is_null() {
            None
        } else {
            // SAFETY: data points to at least length * element_size readable
            // bytes per caller contract; validate() bounded the product.
            Some(unsafe { std::slice::from_raw_parts(data, config.live_bytes()) })
        };

        let arr = match FatArray::create(config, source) {
            Ok(arr) => arr,
            Err(e) => return FatArrayStatus::from(&e) as i32,
        };
        let handle = ffi_lock!(ARRAYS).adopt(arr);
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = handle };
        FatArrayStatus::Ok as i32
    })
}

/// Release an array. Freeing a stale handle returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_free(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(ARRAYS).release(handle) {
            Some(_) => FatArrayStatus::Ok as i32,
            None => FatArrayStatus::InvalidHandle as i32,
        }
    })
}

/// Write the array's capacity (in elements) to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_capacity(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({ query(handle, out, FatArray::capacity) })
}

/// Write the array's live length to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_length(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({ query(handle, out, FatArray::len) })
}

/// Write the array's element size in bytes to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_element_size(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({ query(handle, out, FatArray::element_size) })
}

/// Set the live length after writing elements directly through
/// [`fatarray_data`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_set_length(handle: u64, length: usize) -> i32 {
    ffi_guard!({ ffi_lock!(ARRAYS).update(handle, |arr| arr.set_len(length)) })
}

/// Reallocate to exactly `capacity` elements, truncating if needed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_resize(handle: u64, capacity: usize) -> i32 {
    ffi_guard!({ ffi_lock!(ARRAYS).update(handle, |arr| arr.resize(capacity)) })
}

/// Insert the `element_size` bytes at `value` at position `index`.
///
/// `value` may point into this array's storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_insert(handle: u64, index: usize, value: *const u8) -> i32 {
    ffi_guard!({
        if value.is_null() {
            return FatArrayStatus::InvalidArgument as i32;
        }
        let mut arrays = ffi_lock!(ARRAYS);
        // SAFETY: value points to element_size readable bytes per caller
        // contract.
        let staged = match unsafe { arrays.stage_element(handle, value) } {
            Ok(staged) => staged,
            Err(status) => return status as i32,
        };
        arrays.update(handle, |arr| arr.insert(index, &staged))
    })
}

/// Append the `element_size` bytes at `value`.
///
/// `value` may point into this array's storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_push(handle: u64, value: *const u8) -> i32 {
    ffi_guard!({
        if value.is_null() {
            return FatArrayStatus::InvalidArgument as i32;
        }
        let mut arrays = ffi_lock!(ARRAYS);
        // SAFETY: value points to element_size readable bytes per caller
        // contract.
        let staged = match unsafe { arrays.stage_element(handle, value) } {
            Ok(staged) => staged,
            Err(status) => return status as i32,
        };
        arrays.update(handle, |arr| arr.push(&staged))
    })
}

/// Replace the array's content with `len_bytes` bytes from `src`.
///
/// The new length is `len_bytes / element_size`. `src` may be null only
/// when `len_bytes == 0`. It may overlap this array's storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_copy(handle: u64, src: *const u8, len_bytes: usize) -> i32 {
    ffi_guard!({
        if src.is_null() && len_bytes > 0 {
            return FatArrayStatus::InvalidArgument as i32;
        }
        let mut arrays = ffi_lock!(ARRAYS);
        // SAFETY: src points to len_bytes readable bytes per caller
        // contract; bytes inside the array are copied out by the registry.
        let source = match unsafe { arrays.stage_source(handle, src, len_bytes) } {
            Ok(source) => source,
            Err(status) => return status as i32,
        };
        arrays.update(handle, |arr| arr.bulk_copy(&source))
    })
}

/// Remove the element at `index`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_remove(handle: u64, index: usize) -> i32 {
    ffi_guard!({ ffi_lock!(ARRAYS).update(handle, |arr| arr.remove(index)) })
}

/// Copy the last element into the `element_size` bytes at `out` and
/// remove it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_pop(handle: u64, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FatArrayStatus::InvalidArgument as i32;
        }
        let last = match ffi_lock!(ARRAYS).take_last(handle) {
            Ok(last) => last,
            Err(status) => return status as i32,
        };
        // SAFETY: out points to element_size writable bytes per caller
        // contract, and last holds exactly element_size bytes.
        unsafe { std::ptr::copy_nonoverlapping(last.as_ptr(), out, last.len()) };
        FatArrayStatus::Ok as i32
    })
}

/// Write the address of the first storage byte to `out`.
///
/// The address stays valid until the next `fatarray_resize`,
/// `fatarray_insert`, `fatarray_push`, `fatarray_copy` or `fatarray_free`
/// on the same handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_data(handle: u64, out: *mut *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return FatArrayStatus::InvalidArgument as i32;
        }
        match ffi_lock!(ARRAYS).data_ptr(handle) {
            Some(data) => {
                // SAFETY: out is non-null and valid per caller contract.
                unsafe { *out = data };
                FatArrayStatus::Ok as i32
            }
            None => FatArrayStatus::InvalidHandle as i32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(element_size: usize, capacity: usize) -> u64 {
        let mut h = 0u64;
        let status = fatarray_make(element_size, capacity, 0, std::ptr::null(), &mut h);
        assert_eq!(status, FatArrayStatus::Ok as i32);
        h
    }

    fn length(h: u64) -> usize {
        let mut n = usize::MAX;
        assert_eq!(fatarray_length(h, &mut n), 0);
        n
    }

    #[test]
    fn make_with_zero_capacity_uses_default() {
        let h = make(4, 0);
        let mut cap = 0usize;
        assert_eq!(fatarray_capacity(h, &mut cap), 0);
        assert_eq!(cap, 1);
        assert_eq!(fatarray_free(h), 0);
    }

    #[test]
    fn make_rejects_zero_element_size_and_null_out() {
        let mut h = 0u64;
        assert_eq!(
            fatarray_make(0, 4, 0, std::ptr::null(), &mut h),
            FatArrayStatus::ConfigError as i32
        );
        assert_eq!(
            fatarray_make(4, 4, 0, std::ptr::null(), std::ptr::null_mut()),
            FatArrayStatus::InvalidArgument as i32
        );
        assert_eq!(
            fatarray_make(4, 2, 3, std::ptr::null(), &mut h),
            FatArrayStatus::LengthExceedsCapacity as i32
        );
    }

    #[test]
    fn make_copies_initial_data() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut h = 0u64;
        assert_eq!(fatarray_make(2, 4, 3, data.as_ptr(), &mut h), 0);
        assert_eq!(length(h), 3);

        let mut out = [0u8; 2];
        assert_eq!(fatarray_pop(h, out.as_mut_ptr()), 0);
        assert_eq!(out, [5, 6]);
        fatarray_free(h);
    }

    #[test]
    fn null_value_pointers_are_rejected() {
        let h = make(4, 1);
        assert_eq!(
            fatarray_push(h, std::ptr::null()),
            FatArrayStatus::InvalidArgument as i32
        );
        assert_eq!(
            fatarray_insert(h, 0, std::ptr::null()),
            FatArrayStatus::InvalidArgument as i32
        );
        assert_eq!(
            fatarray_pop(h, std::ptr::null_mut()),
            FatArrayStatus::InvalidArgument as i32
        );
        assert_eq!(
            fatarray_copy(h, std::ptr::null(), 4),
            FatArrayStatus::InvalidArgument as i32
        );
        assert_eq!(fatarray_copy(h, std::ptr::null(), 0), 0);
        assert_eq!(
            fatarray_length(h, std::ptr::null_mut()),
            FatArrayStatus::InvalidArgument as i32
        );
        fatarray_free(h);
    }

    #[test]
    fn freed_handle_is_invalid() {
        let h = make(8, 2);
        assert_eq!(fatarray_free(h), 0);
        assert_eq!(fatarray_free(h), FatArrayStatus::InvalidHandle as i32);
        assert_eq!(
            fatarray_push(h, [0u8; 8].as_ptr()),
            FatArrayStatus::InvalidHandle as i32
        );
        let mut n = 0usize;
        assert_eq!(
            fatarray_length(h, &mut n),
            FatArrayStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn errors_map_to_status_codes() {
        let h = make(4, 1);
        let mut out = [0u8; 4];
        assert_eq!(
            fatarray_pop(h, out.as_mut_ptr()),
            FatArrayStatus::Empty as i32
        );
        assert_eq!(
            fatarray_remove(h, 0),
            FatArrayStatus::IndexOutOfBounds as i32
        );
        assert_eq!(
            fatarray_set_length(h, 2),
            FatArrayStatus::LengthExceedsCapacity as i32
        );
        assert_eq!(fatarray_resize(h, 0), FatArrayStatus::ConfigError as i32);
        fatarray_free(h);
    }
}
