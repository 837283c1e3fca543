//! C-compatible status codes.
//!
//! [`ContigStatus`] is a `repr(i32)` enum with a code for every Rust error
//! variant, so each maps to a stable value. Conversions from the Rust error
//! types ([`BufferError`], [`BridgeError`], [`ConfigError`]) are provided.
//! Codes no current entry point returns are marked reserved.

use contig_buffer::ConfigError;
use contig_core::{BridgeError, BufferError};

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContigStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An argument is null or otherwise invalid.
    InvalidArgument = -2,
    /// Element index outside `[0, count)`.
    IndexOutOfBounds = -3,
    /// Range reversed or past the live elements. Reserved: no current
    /// entry point takes a range.
    RangeOutOfBounds = -4,
    /// Count would exceed capacity. Reserved: no current entry point
    /// resizes an array.
    CapacityExceeded = -5,
    /// Foreign object type cannot be stored in the target buffer.
    TypeMismatch = -6,
    /// Growth configuration rejected. Reserved: no current entry point
    /// takes a growth policy.
    ConfigError = -7,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&BufferError> for ContigStatus {
    fn from(e: &BufferError) -> Self {
        match e {
            BufferError::IndexOutOfBounds { .. } => ContigStatus::IndexOutOfBounds,
            BufferError::RangeOutOfBounds { .. } => ContigStatus::RangeOutOfBounds,
            BufferError::CapacityExceeded { .. } => ContigStatus::CapacityExceeded,
        }
    }
}

impl From<&BridgeError> for ContigStatus {
    fn from(e: &BridgeError) -> Self {
        match e {
            BridgeError::TypeMismatch { .. } => ContigStatus::TypeMismatch,
            BridgeError::Buffer(inner) => ContigStatus::from(inner),
        }
    }
}

impl From<&ConfigError> for ContigStatus {
    fn from(_e: &ConfigError) -> Self {
        ContigStatus::ConfigError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(ContigStatus::Ok as i32, 0);
        assert_eq!(ContigStatus::InvalidHandle as i32, -1);
        assert_eq!(ContigStatus::InvalidArgument as i32, -2);
        assert_eq!(ContigStatus::IndexOutOfBounds as i32, -3);
        assert_eq!(ContigStatus::RangeOutOfBounds as i32, -4);
        assert_eq!(ContigStatus::CapacityExceeded as i32, -5);
        assert_eq!(ContigStatus::TypeMismatch as i32, -6);
        assert_eq!(ContigStatus::ConfigError as i32, -7);
        assert_eq!(ContigStatus::InternalError as i32, -20);
        assert_eq!(ContigStatus::Panicked as i32, -128);
    }

    #[test]
    fn buffer_error_to_status() {
        assert_eq!(
            ContigStatus::from(&BufferError::IndexOutOfBounds { index: 1, count: 0 }),
            ContigStatus::IndexOutOfBounds
        );
        assert_eq!(
            ContigStatus::from(&BufferError::RangeOutOfBounds {
                start: 2,
                end: 1,
                count: 3
            }),
            ContigStatus::RangeOutOfBounds
        );
        assert_eq!(
            ContigStatus::from(&BufferError::CapacityExceeded {
                requested: 4,
                capacity: 3
            }),
            ContigStatus::CapacityExceeded
        );
    }

    #[test]
    fn bridge_error_to_status() {
        assert_eq!(
            ContigStatus::from(&BridgeError::TypeMismatch {
                index: 0,
                expected: "u8"
            }),
            ContigStatus::TypeMismatch
        );
        assert_eq!(
            ContigStatus::from(&BridgeError::Buffer(BufferError::IndexOutOfBounds {
                index: 9,
                count: 1
            })),
            ContigStatus::IndexOutOfBounds
        );
    }

    #[test]
    fn config_error_to_status() {
        let e = ConfigError::InvalidGrowthFactor {
            numerator: 1,
            denominator: 1,
        };
        assert_eq!(ContigStatus::from(&e), ContigStatus::ConfigError);
    }
}
