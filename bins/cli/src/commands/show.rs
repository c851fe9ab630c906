use super::{infra_error_output, parse_id_arg};
use crate::error::CliError;
use crate::format::OutputMode;
use crate::{CliOutput, to_json_output};
use profile_store_domain::AssistantConfig;
use profile_store_infra::{StoreCommandOptions, run_show};
use std::fmt::Write as _;

pub fn run_show_command(
    mode: OutputMode,
    options: &StoreCommandOptions,
    raw_id: &str,
) -> Result<CliOutput, CliError> {
    let id = match parse_id_arg(mode, raw_id) {
        Ok(id) => id,
        Err(output) => return Ok(output),
    };
    let record = match run_show(options, &id) {
        Ok(record) => record,
        Err(error) => return Ok(infra_error_output(mode, &error)),
    };

    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "config": record,
        });
        return Ok(CliOutput::ok(to_json_output(&payload)?));
    }
    Ok(CliOutput::ok(format_record_text(&record)))
}

fn format_record_text(record: &AssistantConfig) -> String {
    let mut capabilities = Vec::new();
    if record.capabilities.web_search {
        capabilities.push("webSearch");
    }
    if record.capabilities.image_generation {
        capabilities.push("imageGeneration");
    }

    let mut out = String::new();
    let _ = writeln!(out, "id: {}", record.id);
    let _ = writeln!(out, "name: {}", record.name);
    let _ = writeln!(out, "description: {}", record.description);
    let _ = writeln!(out, "capabilities: {}", capabilities.join(", "));
    let _ = writeln!(out, "knowledgeFiles: {}", record.knowledge_files.len());
    for file in &record.knowledge_files {
        let _ = writeln!(out, "  - {} ({})", file.name, file.media_type);
    }
    out.push_str("instructions:\n");
    for line in record.instructions.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_store_domain::{Capabilities, ConfigId, ConfigName, KnowledgeFile};

    #[test]
    fn text_lists_enabled_capabilities_and_files() -> Result<(), Box<dyn std::error::Error>> {
        let record = AssistantConfig {
            id: ConfigId::parse("cfg-1")?,
            name: ConfigName::parse("Helper")?,
            description: String::new(),
            instructions: "Be brief.\nCite sources.".to_string(),
            capabilities: Capabilities {
                web_search: true,
                image_generation: false,
            },
            knowledge_files: vec![KnowledgeFile {
                name: "notes.md".to_string(),
                media_type: "text/markdown".to_string(),
                content: "# Notes".to_string(),
            }],
        };
        let text = format_record_text(&record);
        assert!(text.contains("capabilities: webSearch\n"));
        assert!(text.contains("  - notes.md (text/markdown)\n"));
        assert!(text.ends_with("  Be brief.\n  Cite sources.\n"));
        Ok(())
    }
}
