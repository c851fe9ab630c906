//! Serialized size estimation for the local size gate.

use serde::Serialize;

/// Size reported for values that fail to serialize.
///
/// It exceeds every ceiling, so un-serializable input is always rejected.
pub const UNSERIALIZABLE_SIZE: u64 = u64::MAX;

/// Byte length of the canonical JSON encoding of `value`.
///
/// Counts UTF-8 bytes, not characters.
pub fn estimate_serialized_size<T: Serialize + ?Sized>(value: &T) -> u64 {
    serde_json::to_vec(value).map_or(UNSERIALIZABLE_SIZE, |bytes| {
        u64::try_from(bytes.len()).unwrap_or(UNSERIALIZABLE_SIZE)
    })
}
