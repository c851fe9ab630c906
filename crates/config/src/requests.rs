//! Request DTOs and validation helpers.
//!
//! Requests are boundary inputs (CLI/API) and must be validated before being
//! passed into use-cases. Validation here is limited to:
//! - shape (required fields, trimming)
//! - bounds (name/attachment lengths)
//!
//! Domain rules (name trimming, attachment sanitation) stay in
//! `ConfigDraft::normalize` and are not duplicated here.

use profile_store_domain::{Capabilities, ConfigDraft, ConfigId, DraftAttachment};
use profile_store_shared::{ErrorCode, ErrorEnvelope, Validate, Validated, ValidationError};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability flags as accepted at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CapabilitiesDto {
    /// Enable the web search tool.
    pub web_search: bool,
    /// Enable the image generation tool.
    pub image_generation: bool,
}

impl From<CapabilitiesDto> for Capabilities {
    fn from(dto: CapabilitiesDto) -> Self {
        Self {
            web_search: dto.web_search,
            image_generation: dto.image_generation,
        }
    }
}

/// Knowledge file attached to a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KnowledgeFileDto {
    /// File name.
    pub name: String,
    /// Media type (for example `text/markdown`).
    #[serde(rename = "type", default)]
    pub media_type: String,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Editing-time error marker; marked files are never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Save request payload (boundary DTO).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    profile_store_validate_derive::Validate,
)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(error = "RequestValidationError")]
pub struct SaveConfigRequestDto {
    /// Existing id to replace; absent or blank creates a new record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[validate(non_empty, max_len = 200)]
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Capability flags.
    #[serde(default)]
    pub capabilities: CapabilitiesDto,
    /// Attachments.
    #[serde(default)]
    #[validate(field = "knowledgeFiles", custom = "check_knowledge_files")]
    pub knowledge_files: Vec<KnowledgeFileDto>,
}

/// Validated save request proof.
pub type ValidatedSaveConfigRequest = Validated<ConfigDraft>;

/// Request validation errors mapped to `ErrorEnvelope`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    /// A required string field is empty after trimming.
    EmptyField {
        /// Field name that failed validation.
        field: &'static str,
    },
    /// A field contains invalid content.
    InvalidField {
        /// Field name that failed validation.
        field: &'static str,
        /// Short reason describing why validation failed.
        reason: &'static str,
    },
    /// A text field exceeds its maximum length.
    TooLong {
        /// Field name that failed validation.
        field: &'static str,
        /// Length in characters.
        len: usize,
        /// Inclusive maximum.
        max: usize,
    },
}

impl RequestValidationError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyField { .. } => ErrorCode::new("config", "empty_field"),
            Self::InvalidField { .. } => ErrorCode::new("config", "invalid_field"),
            Self::TooLong { .. } => ErrorCode::new("config", "field_too_long"),
        }
    }
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { field } => write!(formatter, "{field} must be non-empty"),
            Self::InvalidField { field, reason } => {
                write!(formatter, "{field} is invalid: {reason}")
            },
            Self::TooLong { field, max, .. } => {
                write!(formatter, "{field} must be at most {max} characters")
            },
        }
    }
}

impl std::error::Error for RequestValidationError {}

impl ValidationError for RequestValidationError {
    fn empty(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidField { field, reason }
    }

    fn too_long(field: &'static str, len: usize, max: usize) -> Self {
        Self::TooLong { field, len, max }
    }
}

impl From<RequestValidationError> for ErrorEnvelope {
    fn from(error: RequestValidationError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            RequestValidationError::EmptyField { field } => envelope.with_metadata("field", field),
            RequestValidationError::InvalidField { field, reason } => envelope
                .with_metadata("field", field)
                .with_metadata("reason", reason),
            RequestValidationError::TooLong { field, len, max } => envelope
                .with_metadata("field", field)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}

fn check_knowledge_files(files: &[KnowledgeFileDto]) -> Result<(), RequestValidationError> {
    for file in files.iter().filter(|file| file.error.is_none()) {
        if file.name.trim().is_empty() {
            return Err(RequestValidationError::empty("knowledgeFiles.name"));
        }
        if file.name.contains('\0') {
            return Err(RequestValidationError::invalid(
                "knowledgeFiles.name",
                "contains NUL byte",
            ));
        }
    }
    Ok(())
}

/// Validate a save request and convert it into a domain draft.
pub fn validate_save_config_request(
    dto: &SaveConfigRequestDto,
) -> Result<ValidatedSaveConfigRequest, ErrorEnvelope> {
    dto.validate().map_err(ErrorEnvelope::from)?;

    let knowledge_files = dto
        .knowledge_files
        .iter()
        .map(|file| DraftAttachment {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
            content: file.content.clone(),
            error: file.error.clone(),
        })
        .collect();

    Ok(Validated::new(ConfigDraft {
        id: dto.id.clone(),
        name: dto.name.clone(),
        description: dto.description.clone(),
        instructions: dto.instructions.clone(),
        capabilities: dto.capabilities.into(),
        knowledge_files,
    }))
}

/// Parse and validate a save request from JSON.
pub fn parse_save_config_request_json(
    input: &str,
) -> Result<ValidatedSaveConfigRequest, ErrorEnvelope> {
    let dto: SaveConfigRequestDto = parse_request_json("saveConfig", input)?;
    validate_save_config_request(&dto)
}

/// Parse a config id argument.
pub fn parse_config_id(raw: &str) -> Result<ConfigId, ErrorEnvelope> {
    ConfigId::parse(raw).map_err(ErrorEnvelope::from)
}

fn parse_request_json<T: DeserializeOwned>(
    kind: &'static str,
    input: &str,
) -> Result<T, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid {kind} request JSON: {error}"),
        )
        .with_metadata("request_kind", kind)
    })
}
