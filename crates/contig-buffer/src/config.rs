//! Capacity growth configuration.

use std::error::Error;
use std::fmt;

/// How capacity grows when an append does not fit.
///
/// `grow(c) = max(c * numerator / denominator, c + 1, minimum_capacity)`.
/// The result is monotonic in `c` and always greater than `c`, and a
/// ratio above one keeps append amortized O(1). Arithmetic saturates instead of
/// overflowing; an unsatisfiable capacity then fails at allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Growth ratio numerator. Must exceed `denominator`.
    pub numerator: usize,
    /// Growth ratio denominator. Must be non-zero.
    pub denominator: usize,
    /// Smallest capacity a growing buffer reallocates to.
    ///
    /// Default: 0, so a first append allocates exactly what it needs.
    pub minimum_capacity: usize,
}

impl GrowthPolicy {
    /// Capacity doubles on each reallocation.
    pub const DOUBLING: Self = Self {
        numerator: 2,
        denominator: 1,
        minimum_capacity: 0,
    };

    /// A policy growing by `numerator / denominator`.
    pub const fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
            minimum_capacity: 0,
        }
    }

    /// Set the smallest reallocation capacity.
    pub const fn with_minimum_capacity(mut self, minimum_capacity: usize) -> Self {
        self.minimum_capacity = minimum_capacity;
        self
    }

    /// Check that the ratio is a real growth factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.denominator == 0 || self.numerator <= self.denominator {
            return Err(ConfigError::InvalidGrowthFactor {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }

    /// Capacity to reallocate to when a buffer of `capacity` is full.
    pub fn grow(&self, capacity: usize) -> usize {
        let scaled = capacity.saturating_mul(self.numerator) / self.denominator.max(1);
        scaled
            .max(capacity.saturating_add(1))
            .max(self.minimum_capacity)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DOUBLING
    }
}

/// Errors detected by [`GrowthPolicy::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The ratio does not grow: `numerator <= denominator`, or the
    /// denominator is zero.
    InvalidGrowthFactor {
        /// Configured numerator.
        numerator: usize,
        /// Configured denominator.
        denominator: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGrowthFactor {
                numerator,
                denominator,
            } => {
                write!(
                    f,
                    "invalid growth factor {numerator}/{denominator}: must be greater than 1"
                )
            }
        }
    }
}

impl Error for ConfigError {}
