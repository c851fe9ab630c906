//! Compile-time helpers for carrying validated invariants.

use std::fmt;

/// Proof wrapper indicating a value has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    /// Wrap a value that has been validated by the caller.
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Consume and return the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Out-of-range error for bounded numeric wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsError<T> {
    /// Raw value provided.
    pub value: T,
    /// Inclusive minimum.
    pub min: T,
    /// Inclusive maximum.
    pub max: T,
}

impl<T: fmt::Display> fmt::Display for BoundsError<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "value {} is outside [{}, {}]",
            self.value, self.min, self.max
        )
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for BoundsError<T> {}

/// `u64` constrained to the inclusive range `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedU64<const MIN: u64, const MAX: u64>(u64);

impl<const MIN: u64, const MAX: u64> BoundedU64<MIN, MAX> {
    /// Create a bounded value or return a bounds error.
    pub const fn try_new(value: u64) -> Result<Self, BoundsError<u64>> {
        if value < MIN || value > MAX {
            Err(BoundsError {
                value,
                min: MIN,
                max: MAX,
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Return the wrapped value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Timeout = BoundedU64<100, 600_000>;

    #[test]
    fn bounded_accepts_inclusive_edges() {
        assert!(matches!(Timeout::try_new(100), Ok(value) if value.get() == 100));
        assert!(matches!(Timeout::try_new(600_000), Ok(value) if value.get() == 600_000));
    }

    #[test]
    fn bounded_rejects_outside_values() {
        let error = Timeout::try_new(99);
        assert!(matches!(
            error,
            Err(BoundsError {
                value: 99,
                min: 100,
                max: 600_000
            })
        ));
        if let Err(error) = Timeout::try_new(700_000) {
            assert_eq!(error.to_string(), "value 700000 is outside [100, 600000]");
        }
    }

    #[test]
    fn validated_derefs_to_inner() {
        let validated = Validated::new(String::from("ok"));
        assert_eq!(validated.len(), 2);
        assert_eq!(validated.into_inner(), "ok");
    }
}
