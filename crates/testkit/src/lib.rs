//! # profile-store-testkit
//!
//! Test doubles and fixtures.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod errors;
pub mod fixtures;
pub mod in_memory;

pub use fixtures::{FixtureError, fixture_root, seed_records};
pub use in_memory::{
    FaultyKeyValueStore, InMemoryKeyValueStore, InMemoryRemote, KvOp, NoopLogger,
    RecordingLogger, RecordingNotifier, RemoteOp, SequentialIds, ToggleSession,
};
