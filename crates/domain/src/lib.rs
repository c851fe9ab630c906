//! # profile-store-domain
//!
//! Domain entities and value objects for assistant configuration profiles.
//!
//! - **Primitives** - `ConfigId`, `ConfigName`, `Identity`
//! - **Records** - `AssistantConfig`, `Capabilities`, `KnowledgeFile`, drafts
//! - **Metadata** - `ConfigMetadata` and metadata index ordering
//! - **Size** - serialized byte size estimation for the local size gate
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod metadata;
pub mod primitives;
pub mod record;
pub mod size;

pub use metadata::{
    ConfigMetadata, compare_by_name, remove_metadata, sort_metadata, upsert_metadata,
};
pub use primitives::{ConfigId, ConfigName, Identity, PrimitiveError};
pub use record::{
    AssistantConfig, Capabilities, ConfigCandidate, ConfigDraft, DraftAttachment, KnowledgeFile,
};
pub use size::{UNSERIALIZABLE_SIZE, estimate_serialized_size};
