//! Array creation parameters.

use crate::error::ArrayError;
use crate::header::block_layout;

/// Creation parameters for a [`FatArray`](crate::FatArray).
///
/// Every constructor funnels into [`FatArray::create`](crate::FatArray::create)
/// with one of these. Validated at creation; the element size is immutable
/// for the life of the array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayConfig {
    /// Size of one element in bytes. Must be non-zero.
    pub element_size: usize,

    /// Number of element slots to allocate.
    ///
    /// Default: 1. Must be non-zero and at least `length`.
    pub capacity: usize,

    /// Number of slots that are live immediately after creation.
    ///
    /// Default: 0. Live slots are filled from the initial data if given,
    /// zeroed otherwise.
    pub length: usize,
}

impl ArrayConfig {
    /// Default capacity when none is given.
    pub const DEFAULT_CAPACITY: usize = 1;

    /// Default initial length when none is given.
    pub const DEFAULT_LENGTH: usize = 0;

    /// Create a config for the given element size with default capacity
    /// and length.
    pub fn new(element_size: usize) -> Self {
        Self {
            element_size,
            capacity: Self::DEFAULT_CAPACITY,
            length: Self::DEFAULT_LENGTH,
        }
    }

    /// Sets the initial capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the initial length.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Check the creation preconditions.
    pub fn validate(&self) -> Result<(), ArrayError> {
        if self.element_size == 0 {
            return Err(ArrayError::ZeroElementSize);
        }
        if self.capacity == 0 {
            return Err(ArrayError::ZeroCapacity);
        }
        if self.length > self.capacity {
            return Err(ArrayError::LengthExceedsCapacity {
                length: self.length,
                capacity: self.capacity,
            });
        }
        self.allocation_bytes().map(|_| ())
    }

    /// Bytes occupied by the initially live elements.
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeds, which
    /// guarantees the product cannot overflow.
    pub fn live_bytes(&self) -> usize {
        self.length * self.element_size
    }

    /// Total block size in bytes, header included.
    pub fn allocation_bytes(&self) -> Result<usize, ArrayError> {
        block_layout(self.capacity, self.element_size).map(|layout| layout.size())
    }
}
