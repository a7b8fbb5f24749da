//! Low-level ownership of one header-prefixed allocation.
//!
//! This is the only module in the crate that contains `unsafe` code. Each
//! `unsafe` block carries a `// SAFETY:` comment tying it back to the
//! [`RawBlock`] invariant.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::slice;

use tracing::trace;

use crate::error::ArrayError;
use crate::header::{block_layout, Header, HEADER_SIZE};

/// Unique owner of one header+storage block.
///
/// Invariant: `handle` points `HEADER_SIZE` bytes past the start of a live
/// global-allocator block whose layout is
/// `block_layout(header.capacity, header.element_size)`. The header at the
/// start of the block is initialised, and so is every storage byte (slack
/// included).
pub(crate) struct RawBlock {
    handle: NonNull<u8>,
}

// SAFETY: the block is uniquely owned and holds plain bytes only.
unsafe impl Send for RawBlock {}
// SAFETY: `&RawBlock` only reads; every write goes through `&mut self`.
unsafe impl Sync for RawBlock {}

impl RawBlock {
    /// Allocate a zeroed block and write `header` in front of it.
    pub(crate) fn allocate(header: Header) -> Result<Self, ArrayError> {
        let layout = block_layout(header.capacity, header.element_size)?;
        // SAFETY: layout.size() >= HEADER_SIZE > 0.
        let base = unsafe { alloc::alloc_zeroed(layout) };
        let base = NonNull::new(base).ok_or(ArrayError::AllocationFailed {
            bytes: layout.size(),
        })?;
        // SAFETY: base is aligned to HEADER_ALIGN == align_of::<Header>() and
        // the block is at least HEADER_SIZE bytes long.
        unsafe { base.cast::<Header>().as_ptr().write(header) };
        // SAFETY: HEADER_SIZE <= layout.size(), so the result stays inside
        // the block or one past its end.
        let handle = unsafe { base.add(HEADER_SIZE) };
        trace!(
            "allocated block: capacity={} element_size={} bytes={}",
            header.capacity,
            header.element_size,
            layout.size()
        );
        Ok(Self { handle })
    }

    fn base(&self) -> NonNull<u8> {
        // SAFETY: per the invariant, handle sits HEADER_SIZE bytes into the block.
        unsafe { self.handle.sub(HEADER_SIZE) }
    }

    pub(crate) fn header(&self) -> &Header {
        // SAFETY: the header is initialised and aligned, and `&self` rules
        // out a concurrent `&mut`.
        unsafe { self.base().cast::<Header>().as_ref() }
    }

    pub(crate) fn header_mut(&mut self) -> &mut Header {
        // SAFETY: as in `header`, with `&mut self` guaranteeing uniqueness.
        unsafe { self.base().cast::<Header>().as_mut() }
    }

    /// The whole storage region, live elements followed by slack.
    pub(crate) fn storage(&self) -> &[u8] {
        let len = self.header().storage_bytes();
        // SAFETY: the storage region is `storage_bytes()` initialised bytes
        // starting at the handle.
        unsafe { slice::from_raw_parts(self.handle.as_ptr(), len) }
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        let len = self.header().storage_bytes();
        // SAFETY: as in `storage`, with `&mut self` guaranteeing uniqueness.
        unsafe { slice::from_raw_parts_mut(self.handle.as_ptr(), len) }
    }

    /// The handle: address of the first storage byte.
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.handle.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.handle.as_ptr()
    }

    /// Move the block to hold `new_capacity` slots.
    ///
    /// Length is truncated to `new_capacity`; newly gained slack is zeroed.
    /// On failure the block is left exactly as it was.
    pub(crate) fn reallocate(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        let old = *self.header();
        let old_layout: Layout = block_layout(old.capacity, old.element_size)?;
        let new_layout = block_layout(new_capacity, old.element_size)?;
        let old_base = self.base();

        // SAFETY: old_base came from the global allocator with old_layout;
        // new_layout.size() is non-zero and was validated by Layout.
        let new_base =
            unsafe { alloc::realloc(old_base.as_ptr(), old_layout, new_layout.size()) };
        let new_base = NonNull::new(new_base).ok_or(ArrayError::AllocationFailed {
            bytes: new_layout.size(),
        })?;

        // SAFETY: HEADER_SIZE <= new_layout.size().
        self.handle = unsafe { new_base.add(HEADER_SIZE) };

        let new_bytes = new_capacity * old.element_size;
        let old_bytes = old.storage_bytes();
        if new_bytes > old_bytes {
            // SAFETY: [old_bytes, new_bytes) lies inside the new storage
            // region. Raw writes avoid forming a slice over uninit memory.
            unsafe {
                self.handle
                    .as_ptr()
                    .add(old_bytes)
                    .write_bytes(0, new_bytes - old_bytes)
            };
        }

        let header = self.header_mut();
        header.capacity = new_capacity;
        header.length = header.length.min(new_capacity);

        trace!(
            "reallocated block: capacity {} -> {} element_size={} moved={}",
            old.capacity,
            new_capacity,
            old.element_size,
            new_base != old_base
        );
        Ok(())
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        let header = *self.header();
        // Always Ok: the same layout was accepted when the block was made.
        if let Ok(layout) = block_layout(header.capacity, header.element_size) {
            // SAFETY: the block was allocated with this layout and is
            // released exactly once, here.
            unsafe { alloc::dealloc(self.base().as_ptr(), layout) };
        }
    }
}
