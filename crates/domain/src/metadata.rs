//! Metadata projection and metadata index ordering.
//!
//! The index is an ordered list of `ConfigMetadata`, sorted by name
//! case-insensitively with the id as a tie-breaker so the order is total.

use crate::primitives::{ConfigId, ConfigName};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Lightweight listing entry for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMetadata {
    /// Record id.
    pub id: ConfigId,
    /// Display name.
    pub name: ConfigName,
    /// Description (may be empty).
    #[serde(default)]
    pub description: String,
}

/// Case-insensitive name ordering, ties broken by id.
pub fn compare_by_name(left: &ConfigMetadata, right: &ConfigMetadata) -> Ordering {
    let by_name = left
        .name
        .as_str()
        .to_lowercase()
        .cmp(&right.name.as_str().to_lowercase());
    by_name
        .then_with(|| left.name.as_str().cmp(right.name.as_str()))
        .then_with(|| left.id.cmp(&right.id))
}

/// Sort an index in place.
pub fn sort_metadata(entries: &mut [ConfigMetadata]) {
    entries.sort_by(compare_by_name);
}

/// Replace the entry with the same id, or append; then re-sort.
pub fn upsert_metadata(entries: &mut Vec<ConfigMetadata>, entry: ConfigMetadata) {
    match entries.iter_mut().find(|existing| existing.id == entry.id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
    sort_metadata(entries);
}

/// Remove every entry with `id`. Returns true when something was removed.
pub fn remove_metadata(entries: &mut Vec<ConfigMetadata>, id: &ConfigId) -> bool {
    let before = entries.len();
    entries.retain(|entry| &entry.id != id);
    entries.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::PrimitiveError;
    use proptest::prelude::*;

    fn entry(id: &str, name: &str) -> Result<ConfigMetadata, PrimitiveError> {
        Ok(ConfigMetadata {
            id: ConfigId::parse(id)?,
            name: ConfigName::parse(name)?,
            description: String::new(),
        })
    }

    fn names(entries: &[ConfigMetadata]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[test]
    fn sort_ignores_case() -> Result<(), PrimitiveError> {
        let mut entries = vec![
            entry("1", "beta")?,
            entry("2", "Alpha")?,
            entry("3", "alpha two")?,
            entry("4", "Gamma")?,
        ];
        sort_metadata(&mut entries);
        assert_eq!(names(&entries), vec!["Alpha", "alpha two", "beta", "Gamma"]);
        Ok(())
    }

    #[test]
    fn upsert_replaces_existing_id() -> Result<(), PrimitiveError> {
        let mut entries = vec![entry("a1", "Zed")?, entry("b1", "Bob")?];
        sort_metadata(&mut entries);
        upsert_metadata(&mut entries, entry("a1", "Anna")?);

        assert_eq!(entries.len(), 2);
        assert_eq!(names(&entries), vec!["Anna", "Bob"]);
        Ok(())
    }

    #[test]
    fn remove_reports_whether_present() -> Result<(), PrimitiveError> {
        let mut entries = vec![entry("a1", "A")?];
        let id = ConfigId::parse("a1")?;
        assert!(remove_metadata(&mut entries, &id));
        assert!(!remove_metadata(&mut entries, &id));
        assert!(entries.is_empty());
        Ok(())
    }

    proptest! {
        #[test]
        fn sorted_output_is_ordered_for_any_insertion_order(
            raw in proptest::collection::vec("[A-Za-z][A-Za-z ]{0,8}", 0..20)
        ) {
            let mut entries = Vec::new();
            for (index, name) in raw.iter().enumerate() {
                let Ok(item) = entry(&format!("id{index}"), name) else {
                    continue;
                };
                upsert_metadata(&mut entries, item);
            }
            for pair in entries.windows(2) {
                if let [left, right] = pair {
                    prop_assert_ne!(compare_by_name(left, right), Ordering::Greater);
                }
            }
        }
    }
}
