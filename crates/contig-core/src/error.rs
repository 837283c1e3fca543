//! Error types for contig buffers.
//!
//! Only out-of-range access and foreign type mismatches are recoverable.
//! Allocation failure is fatal (`handle_alloc_error`), and
//! [`BufferError::CapacityExceeded`] exists to give invariant-violation
//! panics a uniform message.

use std::error::Error;
use std::fmt;

/// Errors from element access and range operations on a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// Element access with `index` outside `[0, count)`.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Live element count at the time of access.
        count: usize,
    },
    /// A range that is reversed or extends past the live elements.
    RangeOutOfBounds {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Live element count at the time of access.
        count: usize,
    },
    /// Attempt to set the live count beyond the allocated capacity.
    ///
    /// This is a programming error. The buffer reports it by panicking
    /// with this message rather than returning it.
    CapacityExceeded {
        /// The requested count.
        requested: usize,
        /// Allocated capacity.
        capacity: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, count } => {
                write!(f, "index out of bounds: index {index}, count {count}")
            }
            Self::RangeOutOfBounds { start, end, count } => {
                write!(f, "range {start}..{end} out of bounds for count {count}")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "capacity exceeded: requested count {requested}, capacity {capacity}"
                )
            }
        }
    }
}

impl Error for BufferError {}

/// Errors from moving elements across the foreign boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeError {
    /// A foreign object's dynamic type cannot be stored as the buffer's
    /// static element type.
    ///
    /// Reported before any storage is touched.
    TypeMismatch {
        /// Position of the rejected object.
        index: usize,
        /// Name of the element type the storage holds.
        expected: &'static str,
    },
    /// The underlying buffer operation failed.
    Buffer(BufferError),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { index, expected } => {
                write!(
                    f,
                    "type mismatch at index {index}: storage holds {expected}"
                )
            }
            Self::Buffer(e) => write!(f, "buffer error: {e}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Buffer(e) => Some(e),
            Self::TypeMismatch { .. } => None,
        }
    }
}

impl From<BufferError> for BridgeError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_bounds_message_names_index_and_count() {
        let e = BufferError::IndexOutOfBounds { index: 7, count: 3 };
        assert_eq!(e.to_string(), "index out of bounds: index 7, count 3");
    }

    #[test]
    fn capacity_exceeded_message() {
        let e = BufferError::CapacityExceeded {
            requested: 9,
            capacity: 4,
        };
        assert_eq!(
            e.to_string(),
            "capacity exceeded: requested count 9, capacity 4"
        );
    }

    #[test]
    fn bridge_error_wraps_buffer_error_as_source() {
        let inner = BufferError::RangeOutOfBounds {
            start: 2,
            end: 1,
            count: 5,
        };
        let e = BridgeError::from(inner.clone());
        assert_eq!(e, BridgeError::Buffer(inner));
        assert!(e.source().is_some());
    }

    #[test]
    fn type_mismatch_has_no_source() {
        let e = BridgeError::TypeMismatch {
            index: 0,
            expected: "i64",
        };
        assert!(e.source().is_none());
        assert!(e.to_string().contains("i64"));
    }
}
