//! Session oracle contract.

use profile_store_domain::Identity;

/// Source of truth for "is there an authenticated identity right now".
///
/// Reads are synchronous and side-effect free. Callers resolve the identity
/// once per unit of work and pass it along instead of re-reading.
pub trait SessionPort: Send + Sync {
    /// Current identity, or `None` when signed out.
    fn current_identity(&self) -> Option<Identity>;
}
