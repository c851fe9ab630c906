//! Record id minting contract.

use profile_store_domain::ConfigId;
use profile_store_shared::Result;

/// Produces fresh, unique record ids for local creates.
pub trait IdGeneratorPort: Send + Sync {
    /// Mint a new id.
    fn next_id(&self) -> Result<ConfigId>;
}
