//! Validation traits for request DTOs.

/// Trait for validation errors used by `Validate`.
pub trait ValidationError: Sized {
    /// A required field was empty (after trimming).
    fn empty(field: &'static str) -> Self;

    /// A field value is invalid for a specific reason.
    fn invalid(field: &'static str, reason: &'static str) -> Self;

    /// A text field exceeds its maximum length in characters.
    fn too_long(field: &'static str, len: usize, max: usize) -> Self;
}

/// Validate a DTO using compile-time derived rules.
pub trait Validate {
    /// Error type returned by validation.
    type Error: ValidationError;

    /// Validate the DTO.
    fn validate(&self) -> Result<(), Self::Error>;
}
