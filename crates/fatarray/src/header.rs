//! The metadata block stored in front of every array's element storage.
//!
//! ```text
//!  base (allocation start)            handle
//!  │                                  │
//!  ▼                                  ▼
//!  ┌──────────┬────────┬──────────────┬──────────────────────┬───────────┐
//!  │ capacity │ length │ element_size │ live elements        │ slack     │
//!  └──────────┴────────┴──────────────┴──────────────────────┴───────────┘
//!  ◄──────────── HEADER_SIZE ────────►◄── length × size ───►◄ (cap-len) ►
//! ```
//!
//! The handle is the only address a caller ever sees. The header is found
//! at the fixed offset `handle - HEADER_SIZE`.

use std::alloc::Layout;

use crate::error::ArrayError;

/// Alignment of the header, and therefore of the storage region that
/// follows it. Matches `max_align_t` on mainstream 64-bit targets.
pub const HEADER_ALIGN: usize = 16;

/// Size of the header in bytes. Always a multiple of [`HEADER_ALIGN`].
pub const HEADER_SIZE: usize = std::mem::size_of::<Header>();

const _: () = assert!(HEADER_SIZE % HEADER_ALIGN == 0);
const _: () = assert!(std::mem::align_of::<Header>() == HEADER_ALIGN);

/// Array metadata: capacity, live length, and element size.
///
/// Returned by value from [`FatArray::header`](crate::FatArray::header);
/// the in-place copy is only ever modified by the array itself.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Number of element slots allocated.
    pub capacity: usize,
    /// Number of slots holding live data (`length <= capacity`).
    pub length: usize,
    /// Size of one element in bytes. Fixed at creation.
    pub element_size: usize,
}

impl Header {
    /// Storage bytes covered by `capacity` slots.
    pub fn storage_bytes(&self) -> usize {
        self.capacity * self.element_size
    }

    /// Bytes covered by the live elements.
    pub fn live_bytes(&self) -> usize {
        self.length * self.element_size
    }
}

/// Layout of a whole block (header + `capacity` slots).
pub(crate) fn block_layout(capacity: usize, element_size: usize) -> Result<Layout, ArrayError> {
    let overflow = ArrayError::SizeOverflow {
        capacity,
        element_size,
    };
    let size = capacity
        .checked_mul(element_size)
        .and_then(|storage| storage.checked_add(HEADER_SIZE))
        .ok_or_else(|| overflow.clone())?;
    Layout::from_size_align(size, HEADER_ALIGN).map_err(|_| overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_max_aligned() {
        assert_eq!(HEADER_SIZE % 16, 0);
        assert!(HEADER_SIZE >= 3 * std::mem::size_of::<usize>());
    }

    #[test]
    fn block_layout_adds_header() {
        let layout = block_layout(10, 4).unwrap();
        assert_eq!(layout.size(), HEADER_SIZE + 40);
        assert_eq!(layout.align(), HEADER_ALIGN);
    }

    #[test]
    fn block_layout_overflow_is_reported() {
        assert!(matches!(
            block_layout(usize::MAX, 2),
            Err(ArrayError::SizeOverflow { .. })
        ));
        assert!(matches!(
            block_layout(isize::MAX as usize, 1),
            Err(ArrayError::SizeOverflow { .. })
        ));
    }

    #[test]
    fn storage_and_live_bytes() {
        let h = Header {
            capacity: 8,
            length: 3,
            element_size: 4,
        };
        assert_eq!(h.storage_bytes(), 32);
        assert_eq!(h.live_bytes(), 12);
    }
}
