//! Array-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during array operations.
///
/// Every contract violation the primitive can detect is reported through
/// this enum instead of aborting. The array is left unchanged whenever an
/// operation returns an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// Element size of zero was requested at creation.
    ZeroElementSize,
    /// Capacity of zero was requested at creation or resize.
    ZeroCapacity,
    /// A length larger than the available capacity.
    LengthExceedsCapacity {
        /// The requested length.
        length: usize,
        /// The capacity it was checked against.
        capacity: usize,
    },
    /// An index outside the valid range for the operation.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Current array length.
        length: usize,
    },
    /// Attempted to pop from an array with no live elements.
    Empty,
    /// A value buffer whose byte length differs from the element size.
    ElementSizeMismatch {
        /// The array's element size in bytes.
        expected: usize,
        /// Byte length of the buffer supplied.
        actual: usize,
    },
    /// Initial data shorter than `length * element_size` bytes.
    SourceTooShort {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
    /// `capacity * element_size` plus the header does not fit in `isize`.
    SizeOverflow {
        /// Requested capacity in elements.
        capacity: usize,
        /// Element size in bytes.
        element_size: usize,
    },
    /// The global allocator returned null.
    AllocationFailed {
        /// Total block size requested, header included.
        bytes: usize,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroElementSize => write!(f, "element size must be non-zero"),
            Self::ZeroCapacity => write!(f, "capacity must be non-zero"),
            Self::LengthExceedsCapacity { length, capacity } => {
                write!(f, "length {length} exceeds capacity {capacity}")
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "index {index} out of bounds for length {length}")
            }
            Self::Empty => write!(f, "array is empty"),
            Self::ElementSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "element size mismatch: expected {expected} bytes, got {actual}"
                )
            }
            Self::SourceTooShort { expected, actual } => {
                write!(
                    f,
                    "source data too short: need {expected} bytes, got {actual}"
                )
            }
            Self::SizeOverflow {
                capacity,
                element_size,
            } => {
                write!(
                    f,
                    "block size overflow: {capacity} elements of {element_size} bytes"
                )
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
        }
    }
}

impl Error for ArrayError {}
