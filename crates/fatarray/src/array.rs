//! The owning dynamic array.
//!
//! [`FatArray`] wraps a single header-prefixed allocation (see
//! [`header`](crate::header)). Every operation that may move the
//! allocation takes `&mut self`, so no stale copy of the handle can
//! survive a reallocation in safe code.

use std::fmt;

use tracing::debug;

use crate::config::ArrayConfig;
use crate::error::ArrayError;
use crate::header::Header;
use crate::raw::RawBlock;

/// Factor by which capacity grows when an insert finds the array full.
pub const GROWTH_FACTOR: usize = 2;

/// A type-erased growable array of fixed-size byte elements.
///
/// Elements are opaque blocks of exactly [`element_size`](Self::element_size)
/// bytes, copied in and out with plain byte copies. The element size is
/// fixed at creation; capacity changes only through [`resize`](Self::resize)
/// (called implicitly by [`insert`](Self::insert), [`push`](Self::push) and
/// [`bulk_copy`](Self::bulk_copy) when space runs out).
///
/// The backing block is released when the array is dropped.
///
/// # Example
///
/// ```
/// use fatarray::FatArray;
///
/// let mut arr = FatArray::with_capacity(4, 2)?;
/// arr.push(&3u32.to_ne_bytes())?;
/// arr.push(&7u32.to_ne_bytes())?;
/// arr.push(&9u32.to_ne_bytes())?;
/// assert_eq!(arr.capacity(), 4);
///
/// let mut out = [0u8; 4];
/// arr.pop(&mut out)?;
/// assert_eq!(u32::from_ne_bytes(out), 9);
/// # Ok::<(), fatarray::ArrayError>(())
/// ```
pub struct FatArray {
    block: RawBlock,
}

impl FatArray {
    /// Create an array from a config, optionally copying initial data.
    ///
    /// When `source` is given, the first `length * element_size` bytes are
    /// copied into the live region. Otherwise the live region is zeroed.
    /// Slack slots always start zeroed.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error, [`ArrayError::SourceTooShort`]
    /// if `source` holds fewer than `length * element_size` bytes, or
    /// [`ArrayError::AllocationFailed`].
    pub fn create(config: ArrayConfig, source: Option<&[u8]>) -> Result<Self, ArrayError> {
        config.validate()?;
        let live = config.live_bytes();
        if let Some(src) = source {
            if src.len() < live {
                return Err(ArrayError::SourceTooShort {
                    expected: live,
                    actual: src.len(),
                });
            }
        }

        let mut block = RawBlock::allocate(Header {
            capacity: config.capacity,
            length: config.length,
            element_size: config.element_size,
        })?;
        if let Some(src) = source {
            block.storage_mut()[..live].copy_from_slice(&src[..live]);
        }
        Ok(Self { block })
    }

    /// Empty array with a single slot.
    pub fn new(element_size: usize) -> Result<Self, ArrayError> {
        Self::create(ArrayConfig::new(element_size), None)
    }

    /// Empty array with `capacity` slots.
    pub fn with_capacity(element_size: usize, capacity: usize) -> Result<Self, ArrayError> {
        Self::create(ArrayConfig::new(element_size).with_capacity(capacity), None)
    }

    /// Array with `length` zeroed live elements and `capacity` slots.
    pub fn with_length(
        element_size: usize,
        capacity: usize,
        length: usize,
    ) -> Result<Self, ArrayError> {
        let config = ArrayConfig::new(element_size)
            .with_capacity(capacity)
            .with_length(length);
        Self::create(config, None)
    }

    /// Array with `length` live elements copied from `data`.
    pub fn from_bytes(
        element_size: usize,
        capacity: usize,
        length: usize,
        data: &[u8],
    ) -> Result<Self, ArrayError> {
        let config = ArrayConfig::new(element_size)
            .with_capacity(capacity)
            .with_length(length);
        Self::create(config, Some(data))
    }

    /// Snapshot of the header.
    pub fn header(&self) -> Header {
        *self.block.header()
    }

    /// Number of element slots allocated.
    pub fn capacity(&self) -> usize {
        self.block.header().capacity
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.block.header().length
    }

    /// Whether the array holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.block.header().element_size
    }

    /// Overwrite the live length without touching storage bytes.
    ///
    /// Intended for use after writing elements directly into the slack
    /// region via [`spare_bytes_mut`](Self::spare_bytes_mut). Bytes between
    /// the old and new length are neither zeroed nor validated.
    ///
    /// # Errors
    ///
    /// [`ArrayError::LengthExceedsCapacity`] if `length > capacity`.
    pub fn set_len(&mut self, length: usize) -> Result<(), ArrayError> {
        let capacity = self.capacity();
        if length > capacity {
            return Err(ArrayError::LengthExceedsCapacity { length, capacity });
        }
        self.block.header_mut().length = length;
        Ok(())
    }

    /// Reallocate to hold exactly `new_capacity` elements.
    ///
    /// Shrinking below the current length truncates it; the first
    /// `new_capacity` elements are kept. The storage address may change.
    ///
    /// # Errors
    ///
    /// [`ArrayError::ZeroCapacity`], [`ArrayError::SizeOverflow`] or
    /// [`ArrayError::AllocationFailed`]. The array is unchanged on error.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        if new_capacity == 0 {
            return Err(ArrayError::ZeroCapacity);
        }
        let length = self.len();
        if new_capacity < length {
            debug!(
                "resize to {} truncates {} live elements",
                new_capacity,
                length - new_capacity
            );
        }
        self.block.reallocate(new_capacity)
    }

    /// Insert one element at `index`, shifting later elements right.
    ///
    /// `index == len()` appends. A full array doubles its capacity first.
    ///
    /// # Errors
    ///
    /// [`ArrayError::ElementSizeMismatch`] if `value` is not exactly one
    /// element long, [`ArrayError::IndexOutOfBounds`] if `index > len()`,
    /// or any error from growing.
    pub fn insert(&mut self, index: usize, value: &[u8]) -> Result<(), ArrayError> {
        let Header {
            capacity,
            length,
            element_size,
        } = self.header();
        self.check_value(value.len())?;
        if index > length {
            return Err(ArrayError::IndexOutOfBounds { index, length });
        }

        if length == capacity {
            let grown = capacity
                .checked_mul(GROWTH_FACTOR)
                .ok_or(ArrayError::SizeOverflow {
                    capacity,
                    element_size,
                })?;
            self.resize(grown)?;
        }

        let at = index * element_size;
        let end = length * element_size;
        let storage = self.block.storage_mut();
        storage.copy_within(at..end, at + element_size);
        storage[at..at + element_size].copy_from_slice(value);
        self.block.header_mut().length += 1;
        Ok(())
    }

    /// Append one element, growing as [`insert`](Self::insert) does.
    pub fn push(&mut self, value: &[u8]) -> Result<(), ArrayError> {
        self.insert(self.len(), value)
    }

    /// Replace the whole live content with `source`.
    ///
    /// Capacity grows to `ceil(source.len() / element_size)` slots if the
    /// bytes do not fit. The new length is `source.len() / element_size`;
    /// trailing bytes of a partial element are stored but not indexed.
    ///
    /// # Errors
    ///
    /// Any error from growing. The array is unchanged on error.
    pub fn bulk_copy(&mut self, source: &[u8]) -> Result<(), ArrayError> {
        let Header {
            capacity,
            element_size,
            ..
        } = self.header();
        let bytes = source.len();
        if bytes > capacity * element_size {
            self.resize(bytes.div_ceil(element_size))?;
        }

        self.block.storage_mut()[..bytes].copy_from_slice(source);
        self.block.header_mut().length = bytes / element_size;

        let remainder = bytes % element_size;
        if remainder != 0 {
            debug!(
                "bulk copy of {} bytes leaves {} trailing bytes unindexed (element size {})",
                bytes, remainder, element_size
            );
        }
        Ok(())
    }

    /// Remove the element at `index`, shifting later elements left.
    ///
    /// Capacity is never reduced.
    ///
    /// # Errors
    ///
    /// [`ArrayError::IndexOutOfBounds`] if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<(), ArrayError> {
        let Header {
            length,
            element_size,
            ..
        } = self.header();
        if index >= length {
            return Err(ArrayError::IndexOutOfBounds { index, length });
        }
        let at = index * element_size;
        let end = length * element_size;
        self.block
            .storage_mut()
            .copy_within(at + element_size..end, at);
        self.block.header_mut().length -= 1;
        Ok(())
    }

    /// Copy the last element into `out` and remove it.
    ///
    /// # Errors
    ///
    /// [`ArrayError::ElementSizeMismatch`] if `out` is not exactly one
    /// element long, [`ArrayError::Empty`] if there is nothing to pop.
    pub fn pop(&mut self, out: &mut [u8]) -> Result<(), ArrayError> {
        self.check_value(out.len())?;
        let last = self.len().checked_sub(1).ok_or(ArrayError::Empty)?;
        out.copy_from_slice(self.element(last));
        self.remove(last)
    }

    /// Bytes of the element at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        (index < self.len()).then(|| self.element(index))
    }

    /// Mutable bytes of the element at `index`, or `None` if out of range.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len() {
            return None;
        }
        let size = self.element_size();
        let at = index * size;
        Some(&mut self.block.storage_mut()[at..at + size])
    }

    /// The live elements as one contiguous byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        let live = self.block.header().live_bytes();
        &self.block.storage()[..live]
    }

    /// Mutable view of the live elements.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let live = self.block.header().live_bytes();
        &mut self.block.storage_mut()[..live]
    }

    /// The slack region after the live elements.
    ///
    /// Write elements here, then publish them with [`set_len`](Self::set_len).
    pub fn spare_bytes_mut(&mut self) -> &mut [u8] {
        let live = self.block.header().live_bytes();
        &mut self.block.storage_mut()[live..]
    }

    /// Address of the first storage byte.
    ///
    /// Invalidated by any call that may reallocate.
    pub fn as_ptr(&self) -> *const u8 {
        self.block.as_ptr()
    }

    /// Mutable address of the first storage byte.
    ///
    /// Invalidated by any call that may reallocate.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.block.as_mut_ptr()
    }

    /// Deep copy into a fresh block with the same capacity.
    ///
    /// Slack bytes are not carried over; they start zeroed in the copy.
    pub fn try_clone(&self) -> Result<Self, ArrayError> {
        let header = self.header();
        let config = ArrayConfig {
            element_size: header.element_size,
            capacity: header.capacity,
            length: header.length,
        };
        Self::create(config, Some(self.as_bytes()))
    }

    fn element(&self, index: usize) -> &[u8] {
        let size = self.element_size();
        let at = index * size;
        &self.block.storage()[at..at + size]
    }

    fn check_value(&self, actual: usize) -> Result<(), ArrayError> {
        let expected = self.element_size();
        if actual != expected {
            return Err(ArrayError::ElementSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl fmt::Debug for FatArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("FatArray")
            .field("capacity", &header.capacity)
            .field("length", &header.length)
            .field("element_size", &header.element_size)
            .finish()
    }
}

impl PartialEq for FatArray {
    /// Two arrays are equal when they hold the same live elements of the
    /// same size. Capacity and slack are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.element_size() == other.element_size() && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FatArray {}
