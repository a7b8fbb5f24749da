//! C FFI bindings for fatarray.
//!
//! Exposes the array primitive to C callers behind opaque `u64` handles.
//! Every entry point returns an `i32` [`FatArrayStatus`] and writes results
//! through caller-provided out-pointers. This crate and `fatarray`'s raw
//! block module are the only places that contain `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::cell::RefCell;
use std::ffi::c_char;

thread_local! {
    /// Message of the most recent panic caught by `ffi_guard!` on this thread.
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Run an FFI body, converting a panic into `FatArrayStatus::Panicked`.
///
/// The body is a block evaluating to `i32`; `return` inside it leaves the
/// block, not the enclosing function.
macro_rules! ffi_guard {
    ($body:block) => {{
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(payload) => {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    String::from("unknown panic payload")
                };
                $crate::LAST_PANIC.with(|cell| *cell.borrow_mut() = msg);
                $crate::status::FatArrayStatus::Panicked as i32
            }
        }
    }};
}

/// Lock a mutex, returning `InternalError` from the enclosing body if it
/// is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::FatArrayStatus::InternalError as i32,
        }
    };
}

pub mod array;
mod registry;
pub mod status;

pub use status::FatArrayStatus;

/// Copy the last caught panic message on this thread into `buf`.
///
/// Returns the full message length in bytes (excluding the NUL). Pass a
/// null `buf` to query the length. The copy is truncated to `cap - 1`
/// bytes and always NUL-terminated when `cap > 0`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn fatarray_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let msg = cell.borrow();
        let bytes = msg.as_bytes();
        if !buf.is_null() && cap > 0 {
            let n = bytes.len().min(cap - 1);
            // SAFETY: buf points to at least cap writable bytes per caller
            // contract, and n + 1 <= cap.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}
