//! # profile-store-ports
//!
//! Port traits between the configuration store and its collaborators:
//! key-value storage, the local record/index backend, the remote account
//! backend, the session oracle, notifications, id minting, and structured
//! logging.
//!
//! This crate depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by I/O-bound port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub mod id;
pub mod kv;
pub mod local;
pub mod logger;
pub mod notifier;
pub mod remote;
pub mod session;

pub use id::IdGeneratorPort;
pub use kv::KeyValueStorePort;
pub use local::{LocalConfigBackendPort, LocalIndex};
pub use logger::{LogEvent, LogFields, LogLevel, LoggerPort};
pub use notifier::{Notification, NotifierPort, Severity};
pub use remote::RemoteConfigPort;
pub use session::SessionPort;

// Re-export domain types used in port signatures so adapter crates can
// implement ports without naming `profile-store-domain` directly.
pub use profile_store_domain::{
    AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, Identity,
};
