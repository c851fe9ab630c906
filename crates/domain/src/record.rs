//! Configuration records and the drafts they are built from.

use crate::metadata::ConfigMetadata;
use crate::primitives::{ConfigId, ConfigName, PrimitiveError};
use serde::{Deserialize, Serialize};

/// Capability flags of an assistant configuration.
///
/// The set is closed: every flag is a named boolean that defaults to `false`
/// when absent from stored data. New capabilities are added as new named
/// fields with `#[serde(default)]` so older records keep deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    /// Web search tool enabled.
    pub web_search: bool,
    /// Image generation tool enabled.
    pub image_generation: bool,
}

/// Textual document attached to a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeFile {
    /// File name as provided by the author.
    pub name: String,
    /// Media type (for example `text/markdown`).
    #[serde(rename = "type")]
    pub media_type: String,
    /// Text content.
    pub content: String,
}

/// Full, authoritative configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    /// Record id.
    pub id: ConfigId,
    /// Trimmed display name.
    pub name: ConfigName,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Directive text for the assistant.
    #[serde(default)]
    pub instructions: String,
    /// Capability flags.
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Ordered attachments.
    #[serde(default)]
    pub knowledge_files: Vec<KnowledgeFile>,
}

impl AssistantConfig {
    /// Project the record into its index entry.
    #[must_use]
    pub fn metadata(&self) -> ConfigMetadata {
        ConfigMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Attachment as edited by the author, possibly carrying a transient error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftAttachment {
    /// File name.
    pub name: String,
    /// Media type.
    #[serde(rename = "type", default)]
    pub media_type: String,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Editing-time error (failed read, unsupported type). Never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Unvalidated save request as submitted by a caller.
///
/// `id` absent means create; present means full replace of that record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigDraft {
    /// Existing record id for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw display name.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Capability flags.
    pub capabilities: Capabilities,
    /// Attachments, possibly with error markers.
    pub knowledge_files: Vec<DraftAttachment>,
}

impl ConfigDraft {
    /// Create a draft with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate the name and strip transient editing state.
    ///
    /// A blank `id` is treated as absent. Attachments with an error marker
    /// are dropped.
    pub fn normalize(self) -> Result<ConfigCandidate, PrimitiveError> {
        let name = ConfigName::parse(&self.name)?;
        let id = match self.id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(ConfigId::parse(raw)?),
            _ => None,
        };
        let knowledge_files = self
            .knowledge_files
            .into_iter()
            .filter(|file| file.error.is_none())
            .map(|file| KnowledgeFile {
                name: file.name,
                media_type: file.media_type,
                content: file.content,
            })
            .collect();

        Ok(ConfigCandidate {
            id,
            name,
            description: self.description.unwrap_or_default(),
            instructions: self.instructions.unwrap_or_default(),
            capabilities: self.capabilities,
            knowledge_files,
        })
    }
}

/// Validated save request: name trimmed, attachments sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCandidate {
    /// Existing id for updates; `None` creates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConfigId>,
    /// Trimmed display name.
    pub name: ConfigName,
    /// Description (empty when not provided).
    pub description: String,
    /// Instructions (empty when not provided).
    pub instructions: String,
    /// Capability flags.
    pub capabilities: Capabilities,
    /// Persistable attachments.
    pub knowledge_files: Vec<KnowledgeFile>,
}

impl ConfigCandidate {
    /// Build the full record under `id`.
    #[must_use]
    pub fn into_record(self, id: ConfigId) -> AssistantConfig {
        AssistantConfig {
            id,
            name: self.name,
            description: self.description,
            instructions: self.instructions,
            capabilities: self.capabilities,
            knowledge_files: self.knowledge_files,
        }
    }
}
