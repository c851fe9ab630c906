//! Record id generator.

use profile_store_domain::ConfigId;
use profile_store_ports::IdGeneratorPort;
use profile_store_shared::{ErrorEnvelope, Result};
use uuid::Uuid;

/// Mints random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGeneratorPort for UuidIdGenerator {
    fn next_id(&self) -> Result<ConfigId> {
        ConfigId::parse(Uuid::new_v4().to_string()).map_err(ErrorEnvelope::from)
    }
}
