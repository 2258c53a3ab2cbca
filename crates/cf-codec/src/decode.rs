use std::collections::BTreeMap;

use cf_core::{
    Block, BlockKind, BuildBlock, CollectionKind, CommandBlock, CommandTag, FlightBlock,
    FlowError, IfBlock, LocalizedText, MenuBlock, MissionBlock, OptBlock, ParamValue,
    Parameters, ScriptBlock, UnknownCommand, DEFAULT_IF_TYPE, DEFAULT_OPT_TYPE,
    PRIMARY_LANGUAGE, UNKNOWN_COMMAND_TYPE,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::JsonNode;

type Node = Map<String, Value>;

pub fn from_json_str(raw: &str) -> Result<Vec<Block>, FlowError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|error| FlowError::new("CODEC_JSON_INVALID", error.to_string()))?;
    match value {
        Value::Array(nodes) => from_json(&nodes),
        other => Err(FlowError::new(
            "CODEC_JSON_INVALID",
            format!("Expected an array of blocks, found {}.", json_kind(&other)),
        )),
    }
}

pub fn from_json(nodes: &[JsonNode]) -> Result<Vec<Block>, FlowError> {
    nodes.iter().map(block_from_json).collect()
}

pub fn block_from_json(value: &JsonNode) -> Result<Block, FlowError> {
    let Value::Object(node) = value else {
        return Err(FlowError::new(
            "CODEC_NODE_NOT_OBJECT",
            format!("Block node must be an object, found {}.", json_kind(value)),
        ));
    };
    let id = read_id(node)?;
    let type_name = match node.get("type") {
        Some(Value::String(type_name)) if !type_name.is_empty() => type_name.as_str(),
        _ => {
            return Err(with_id(
                FlowError::new("CODEC_TYPE_MISSING", "Block node has no \"type\"."),
                &id,
            ))
        }
    };
    reject_foreign_collections(node, type_name, &id)?;

    let kind = match type_name {
        "SCRIPT" => BlockKind::Script(ScriptBlock {
            script_name: read_optional_string(node, "scriptName", &id)?,
            file_name: read_optional_string(node, "fileName", &id)?,
            children: read_collection(node, CollectionKind::Children, &id)?,
        }),
        "MISSION" => BlockKind::Mission(MissionBlock {
            mission_name: read_optional_string(node, "missionName", &id)?,
            file_name: read_optional_string(node, "fileName", &id)?,
            blocks_mission: read_collection(node, CollectionKind::BlocksMission, &id)?,
            blocks_finish: read_collection(node, CollectionKind::BlocksFinish, &id)?,
        }),
        "IF" => BlockKind::If(IfBlock {
            if_type: read_optional_string(node, "ifType", &id)?
                .unwrap_or_else(|| DEFAULT_IF_TYPE.to_string()),
            variable: read_scalar_text(node, "variabile", &id)?,
            value: read_scalar_text(node, "valore", &id)?,
            num_then: read_count(node, "numThen", &id)?,
            num_else: read_count(node, "numElse", &id)?,
            then_blocks: read_collection(node, CollectionKind::ThenBlocks, &id)?,
            else_blocks: read_optional_collection(node, CollectionKind::ElseBlocks, &id)?,
        }),
        "MENU" => BlockKind::Menu(MenuBlock {
            children: read_collection(node, CollectionKind::Children, &id)?,
        }),
        "OPT" => BlockKind::Opt(OptBlock {
            opt_type: read_optional_string(node, "optType", &id)?
                .unwrap_or_else(|| DEFAULT_OPT_TYPE.to_string()),
            condition: read_optional_string(node, "condition", &id)?,
            text: read_text(node, &id)?,
            children: read_collection(node, CollectionKind::Children, &id)?,
        }),
        "BUILD" => BlockKind::Build(BuildBlock {
            block_init: read_collection(node, CollectionKind::BlockInit, &id)?,
            block_start: read_collection(node, CollectionKind::BlockStart, &id)?,
        }),
        "FLIGHT" => BlockKind::Flight(FlightBlock {
            block_init: read_collection(node, CollectionKind::BlockInit, &id)?,
            block_start: read_collection(node, CollectionKind::BlockStart, &id)?,
            block_evaluate: read_collection(node, CollectionKind::BlockEvaluate, &id)?,
        }),
        UNKNOWN_COMMAND_TYPE => BlockKind::Unknown(read_unknown(node, &id)?),
        other => {
            let tag = CommandTag::parse(other).ok_or_else(|| {
                with_id(
                    FlowError::new(
                        "CODEC_TYPE_UNKNOWN",
                        format!("Unknown block type \"{}\".", other),
                    ),
                    &id,
                )
            })?;
            BlockKind::Command(CommandBlock {
                tag,
                parameters: read_parameters(node, tag, &id)?,
            })
        }
    };

    Ok(Block { id, kind })
}

pub fn param_from_json(value: &JsonNode) -> ParamValue {
    match value {
        Value::Null => ParamValue::Null,
        Value::Bool(flag) => ParamValue::Bool(*flag),
        Value::Number(number) => number
            .as_f64()
            .map_or(ParamValue::Null, ParamValue::Number),
        Value::String(text) => ParamValue::String(text.clone()),
        Value::Array(values) => ParamValue::Array(values.iter().map(param_from_json).collect()),
        Value::Object(entries) => ParamValue::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), param_from_json(value)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

fn read_id(node: &Node) -> Result<String, FlowError> {
    match node.get("id") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(other) => Err(FlowError::new(
            "CODEC_FIELD_INVALID",
            format!("Block \"id\" must be a string, found {}.", json_kind(other)),
        )),
    }
}

fn reject_foreign_collections(node: &Node, type_name: &str, id: &str) -> Result<(), FlowError> {
    let owned = CollectionKind::owned_by(type_name);
    for kind in CollectionKind::ALL {
        let present = node
            .get(kind.field_name())
            .is_some_and(|value| !value.is_null());
        if present && !owned.contains(&kind) {
            return Err(with_id(
                FlowError::new(
                    "CODEC_COLLECTION_FOREIGN",
                    format!("{} blocks have no \"{}\" collection.", type_name, kind),
                ),
                id,
            ));
        }
    }
    Ok(())
}

/// A mandated collection; absent or null reads as empty.
fn read_collection(node: &Node, kind: CollectionKind, id: &str) -> Result<Vec<Block>, FlowError> {
    Ok(read_optional_collection(node, kind, id)?.unwrap_or_default())
}

fn read_optional_collection(
    node: &Node,
    kind: CollectionKind,
    id: &str,
) -> Result<Option<Vec<Block>>, FlowError> {
    match node.get(kind.field_name()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(children)) => from_json(children).map(Some),
        Some(other) => Err(with_id(
            FlowError::new(
                "CODEC_COLLECTION_INVALID",
                format!(
                    "\"{}\" must be an array, found {}.",
                    kind,
                    json_kind(other)
                ),
            ),
            id,
        )),
    }
}

fn read_optional_string(node: &Node, key: &str, id: &str) -> Result<Option<String>, FlowError> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(invalid_field(key, "a string", other, id)),
    }
}

/// IF operands are authored as strings but older files store numbers.
fn read_scalar_text(node: &Node, key: &str, id: &str) -> Result<String, FlowError> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(other) => Err(invalid_field(key, "a string", other, id)),
    }
}

fn read_count(node: &Node, key: &str, id: &str) -> Result<u32, FlowError> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(found @ Value::Number(number)) => number
            .as_u64()
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| invalid_field(key, "a non-negative integer", found, id)),
        Some(other) => Err(invalid_field(key, "a non-negative integer", other, id)),
    }
}

fn read_text(node: &Node, id: &str) -> Result<LocalizedText, FlowError> {
    match node.get("text") {
        None | Some(Value::Null) => Ok(LocalizedText::new()),
        Some(Value::String(text)) => Ok(LocalizedText::from([(
            PRIMARY_LANGUAGE.to_string(),
            text.clone(),
        )])),
        Some(Value::Object(entries)) => {
            let mut text = LocalizedText::new();
            for (language, value) in entries {
                match value {
                    Value::String(value) => {
                        text.insert(language.clone(), value.clone());
                    }
                    Value::Null => {}
                    other => return Err(invalid_field("text", "a string map", other, id)),
                }
            }
            Ok(text)
        }
        Some(other) => Err(invalid_field("text", "a string map", other, id)),
    }
}

fn read_parameters(node: &Node, tag: CommandTag, id: &str) -> Result<Parameters, FlowError> {
    let entries = match node.get("parameters") {
        None | Some(Value::Null) => return Ok(Parameters::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => return Err(invalid_field("parameters", "an object", other, id)),
    };
    let mut parameters = Parameters::new();
    for (key, value) in entries {
        if tag.accepts_parameter(key) {
            parameters.insert(key.clone(), param_from_json(value));
        } else {
            warn!(block_id = id, tag = %tag, key = %key, "dropping foreign parameter key");
        }
    }
    if tag == CommandTag::UnlockShipPlan {
        for (from, to) in [("plan", "shipPlan"), ("shipPlan", "plan")] {
            if !parameters.contains_key(to) {
                if let Some(plan) = parameters.get(from).cloned() {
                    parameters.insert(to.to_string(), plan);
                }
            }
        }
    }
    Ok(parameters)
}

/// `name` plus `parameters.raw`. Older files only kept the whole line in `content`.
fn read_unknown(node: &Node, id: &str) -> Result<UnknownCommand, FlowError> {
    let name = read_optional_string(node, "name", id)?;
    let raw = match node.get("parameters") {
        None | Some(Value::Null) => None,
        Some(Value::Object(entries)) => match entries.get("raw") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw.clone()),
            Some(other) => return Err(invalid_field("parameters.raw", "a string", other, id)),
        },
        Some(other) => return Err(invalid_field("parameters", "an object", other, id)),
    };
    if let Some(name) = name {
        return Ok(UnknownCommand {
            name,
            raw: raw.unwrap_or_default(),
        });
    }
    let line = read_optional_string(node, "content", id)?
        .or(read_optional_string(node, "originalLine", id)?)
        .unwrap_or_default();
    let line = line.trim();
    let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
    Ok(UnknownCommand {
        name: name.to_string(),
        raw: raw.unwrap_or_else(|| rest.trim_start().to_string()),
    })
}

fn invalid_field(key: &str, expected: &str, found: &Value, id: &str) -> FlowError {
    with_id(
        FlowError::new(
            "CODEC_FIELD_INVALID",
            format!("\"{}\" must be {}, found {}.", key, expected, json_kind(found)),
        ),
        id,
    )
}

fn with_id(mut error: FlowError, id: &str) -> FlowError {
    if !id.is_empty() {
        error.block_id = Some(id.to_string());
    }
    error
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
