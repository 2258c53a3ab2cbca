use cf_core::{Block, BlockKind, FlowError, ScriptBlock};
use serde::{Deserialize, Serialize};

use crate::{from_json, to_json, JsonNode};

/// What the persistence collaborator receives for one script file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPayload {
    pub name: String,
    pub file_name: String,
    pub blocks: Vec<JsonNode>,
}

impl ScriptPayload {
    pub fn from_json_str(raw: &str) -> Result<Self, FlowError> {
        serde_json::from_str(raw)
            .map_err(|error| FlowError::new("CODEC_PAYLOAD_INVALID", error.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, FlowError> {
        serde_json::to_string_pretty(self)
            .map_err(|error| FlowError::new("CODEC_JSON_WRITE", error.to_string()))
    }

    /// Decodes the blocks and wraps them in a named SCRIPT. The wrapper itself has no id yet.
    pub fn into_script_block(self) -> Result<Block, FlowError> {
        let children = from_json(&self.blocks)?;
        Ok(Block::new(BlockKind::Script(ScriptBlock {
            script_name: Some(self.name),
            file_name: Some(self.file_name),
            children,
        })))
    }
}

/// Builds the payload from a named SCRIPT block: its name, file and encoded children.
pub fn script_payload(block: &Block) -> Result<ScriptPayload, FlowError> {
    let BlockKind::Script(script) = &block.kind else {
        return Err(FlowError::with_block(
            "CODEC_SCRIPT_INVALID",
            format!("Only SCRIPT blocks can be saved, found {}.", block.type_name()),
            block.id.clone(),
        ));
    };
    let name = script
        .script_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            FlowError::with_block(
                "CODEC_SCRIPT_INVALID",
                "SCRIPT has no name to save under.",
                block.id.clone(),
            )
        })?;
    let file_name = script
        .file_name
        .clone()
        .unwrap_or_else(|| format!("{}.txt", name));

    Ok(ScriptPayload {
        name: name.to_string(),
        file_name,
        blocks: to_json(&script.children),
    })
}
