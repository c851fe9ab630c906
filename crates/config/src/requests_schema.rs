//! JSON Schema exports for request DTOs.

use crate::SaveConfigRequestDto;
use schemars::{Schema, schema_for};

/// JSON Schema for `SaveConfigRequestDto`.
#[must_use]
pub fn save_config_request_schema() -> Schema {
    schema_for!(SaveConfigRequestDto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_draft_fields() {
        let value = save_config_request_schema().to_value();
        let properties = &value["properties"];
        assert!(properties.get("name").is_some());
        assert!(properties.get("knowledgeFiles").is_some());
        assert!(properties.get("capabilities").is_some());
        assert_eq!(value["required"], serde_json::json!(["name"]));
    }
}
