//! # profile-store-adapters
//!
//! Adapter implementations for ports (key-value engines, the local
//! record/index backend, the HTTP remote, session, notifications, logging).
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod id;
pub mod kv;
pub mod local_backend;
pub mod log_sink;
pub mod logger;
pub mod notifier;
/// Remote backend adapters.
pub mod remote;
pub mod session;
pub mod tracing_logger;

pub use id::UuidIdGenerator;
pub use kv::file::FileKeyValueStore;
pub use kv::memory::MemoryKeyValueStore;
#[cfg(feature = "sqlite")]
pub use kv::sqlite::SqliteKeyValueStore;
pub use local_backend::{KeyLayout, KvLocalBackend};
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use notifier::ConsoleNotifier;
#[cfg(feature = "remote-http")]
pub use remote::http::{HttpRemoteConfig, HttpRemoteConfigStore};
pub use remote::UnconfiguredRemote;
pub use session::StaticSession;
pub use tracing_logger::TracingLogger;
