//! C-compatible status codes.
//!
//! [`FatArrayStatus`] is a `repr(i32)` enum: `Ok` is zero and every error
//! is negative. Each [`ArrayError`] variant maps to exactly one code.

use fatarray::ArrayError;

/// Status code returned by every FFI function.
///
/// Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatArrayStatus {
    /// Success.
    Ok = 0,
    /// Handle is unknown or the array was already freed.
    InvalidHandle = -1,
    /// A required pointer argument is null or the input is malformed.
    InvalidArgument = -2,
    /// Element size or capacity of zero.
    ConfigError = -3,
    /// Index outside the valid range for the operation.
    IndexOutOfBounds = -4,
    /// Requested length is larger than the capacity.
    LengthExceedsCapacity = -5,
    /// Pop from an empty array.
    Empty = -6,
    /// Value buffer length differs from the element size.
    ElementSizeMismatch = -7,
    /// Requested block size does not fit in the address space.
    SizeOverflow = -8,
    /// The allocator returned null.
    AllocationFailed = -9,
    /// Internal error (e.g. the handle table mutex was poisoned).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArrayError> for FatArrayStatus {
    fn from(e: &ArrayError) -> Self {
        match e {
            ArrayError::ZeroElementSize | ArrayError::ZeroCapacity => FatArrayStatus::ConfigError,
            ArrayError::LengthExceedsCapacity { .. } => FatArrayStatus::LengthExceedsCapacity,
            ArrayError::IndexOutOfBounds { .. } => FatArrayStatus::IndexOutOfBounds,
            ArrayError::Empty => FatArrayStatus::Empty,
            ArrayError::ElementSizeMismatch { .. } => FatArrayStatus::ElementSizeMismatch,
            ArrayError::SourceTooShort { .. } => FatArrayStatus::InvalidArgument,
            ArrayError::SizeOverflow { .. } => FatArrayStatus::SizeOverflow,
            ArrayError::AllocationFailed { .. } => FatArrayStatus::AllocationFailed,
        }
    }
}

impl FatArrayStatus {
    /// Collapse an operation result into an `i32` status.
    pub(crate) fn code(result: Result<(), ArrayError>) -> i32 {
        match result {
            Ok(()) => FatArrayStatus::Ok as i32,
            Err(e) => FatArrayStatus::from(&e) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(FatArrayStatus::Ok as i32, 0);
        assert_eq!(FatArrayStatus::InvalidHandle as i32, -1);
        assert_eq!(FatArrayStatus::InvalidArgument as i32, -2);
        assert_eq!(FatArrayStatus::ConfigError as i32, -3);
        assert_eq!(FatArrayStatus::IndexOutOfBounds as i32, -4);
        assert_eq!(FatArrayStatus::LengthExceedsCapacity as i32, -5);
        assert_eq!(FatArrayStatus::Empty as i32, -6);
        assert_eq!(FatArrayStatus::ElementSizeMismatch as i32, -7);
        assert_eq!(FatArrayStatus::SizeOverflow as i32, -8);
        assert_eq!(FatArrayStatus::AllocationFailed as i32, -9);
        assert_eq!(FatArrayStatus::InternalError as i32, -20);
        assert_eq!(FatArrayStatus::Panicked as i32, -128);
    }

    #[test]
    fn array_error_to_status() {
        assert_eq!(
            FatArrayStatus::from(&ArrayError::ZeroElementSize),
            FatArrayStatus::ConfigError
        );
        assert_eq!(
            FatArrayStatus::from(&ArrayError::ZeroCapacity),
            FatArrayStatus::ConfigError
        );
        assert_eq!(
            FatArrayStatus::from(&ArrayError::IndexOutOfBounds {
                index: 3,
                length: 1
            }),
            FatArrayStatus::IndexOutOfBounds
        );
        assert_eq!(
            FatArrayStatus::from(&ArrayError::Empty),
            FatArrayStatus::Empty
        );
        assert_eq!(
            FatArrayStatus::from(&ArrayError::SourceTooShort {
                expected: 8,
                actual: 2
            }),
            FatArrayStatus::InvalidArgument
        );
        assert_eq!(
            FatArrayStatus::from(&ArrayError::AllocationFailed { bytes: 64 }),
            FatArrayStatus::AllocationFailed
        );
    }

    #[test]
    fn code_collapses_results() {
        assert_eq!(FatArrayStatus::code(Ok(())), 0);
        assert_eq!(
            FatArrayStatus::code(Err(ArrayError::Empty)),
            FatArrayStatus::Empty as i32
        );
    }
}
