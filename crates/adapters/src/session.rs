//! Session oracle adapter.

use profile_store_domain::Identity;
use profile_store_ports::SessionPort;
use std::sync::{Arc, RwLock};

/// Session holder whose identity can change between calls (sign in/out).
///
/// Clones share the same state, so the composition root can keep a handle
/// while the store reads through the port.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    identity: Arc<RwLock<Option<Identity>>>,
}

impl StaticSession {
    /// Create a session with an optional initial identity.
    #[must_use]
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity: Arc::new(RwLock::new(identity)),
        }
    }

    /// Mark `identity` as signed in.
    pub fn sign_in(&self, identity: Identity) {
        self.set(Some(identity));
    }

    /// Clear the identity.
    pub fn sign_out(&self) {
        self.set(None);
    }

    fn set(&self, identity: Option<Identity>) {
        match self.identity.write() {
            Ok(mut guard) => *guard = identity,
            Err(poisoned) => *poisoned.into_inner() = identity,
        }
    }
}

impl SessionPort for StaticSession {
    fn current_identity(&self) -> Option<Identity> {
        match self.identity.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
