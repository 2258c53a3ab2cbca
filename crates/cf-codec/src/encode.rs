use cf_core::{Block, BlockKind, FlowError, ParamValue};
use serde_json::{Map, Number, Value};

use crate::JsonNode;

pub fn to_json(blocks: &[Block]) -> Vec<JsonNode> {
    blocks.iter().map(block_to_json).collect()
}

pub fn to_json_string(blocks: &[Block]) -> Result<String, FlowError> {
    serde_json::to_string_pretty(&to_json(blocks))
        .map_err(|error| FlowError::new("CODEC_JSON_WRITE", error.to_string()))
}

/// Each type writes its own fixed field set. Command parameters are projected onto the
/// tag's schema, so a key that belongs to another tag can never be emitted.
pub fn block_to_json(block: &Block) -> JsonNode {
    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(block.type_name()));
    node.insert("id".to_string(), Value::from(block.id.as_str()));

    match &block.kind {
        BlockKind::Script(script) => {
            insert_optional(&mut node, "scriptName", script.script_name.as_deref());
            insert_optional(&mut node, "fileName", script.file_name.as_deref());
        }
        BlockKind::Mission(mission) => {
            insert_optional(&mut node, "missionName", mission.mission_name.as_deref());
            insert_optional(&mut node, "fileName", mission.file_name.as_deref());
        }
        BlockKind::If(branch) => {
            node.insert("ifType".to_string(), Value::from(branch.if_type.as_str()));
            node.insert("variabile".to_string(), Value::from(branch.variable.as_str()));
            node.insert("valore".to_string(), Value::from(branch.value.as_str()));
            node.insert("numThen".to_string(), Value::from(branch.num_then));
            node.insert("numElse".to_string(), Value::from(branch.num_else));
        }
        BlockKind::Opt(opt) => {
            node.insert("optType".to_string(), Value::from(opt.opt_type.as_str()));
            node.insert(
                "condition".to_string(),
                opt.condition.as_deref().map_or(Value::Null, Value::from),
            );
            let text = opt
                .text
                .iter()
                .map(|(language, value)| (language.clone(), Value::from(value.as_str())))
                .collect::<Map<_, _>>();
            node.insert("text".to_string(), Value::Object(text));
        }
        BlockKind::Menu(_) | BlockKind::Build(_) | BlockKind::Flight(_) => {}
        BlockKind::Command(command) => {
            let parameters = command
                .tag
                .parameter_keys()
                .iter()
                .filter_map(|key| {
                    command
                        .parameters
                        .get(*key)
                        .map(|value| ((*key).to_string(), param_to_json(value)))
                })
                .collect::<Map<_, _>>();
            node.insert("parameters".to_string(), Value::Object(parameters));
        }
        BlockKind::Unknown(unknown) => {
            node.insert("name".to_string(), Value::from(unknown.name.as_str()));
            let mut parameters = Map::new();
            parameters.insert("raw".to_string(), Value::from(unknown.raw.as_str()));
            node.insert("parameters".to_string(), Value::Object(parameters));
        }
    }

    for (kind, children) in block.collections() {
        node.insert(kind.field_name().to_string(), Value::Array(to_json(children)));
    }

    Value::Object(node)
}

fn insert_optional(node: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        node.insert(key.to_string(), Value::from(value));
    }
}

pub fn param_to_json(value: &ParamValue) -> JsonNode {
    match value {
        ParamValue::Null => Value::Null,
        ParamValue::Bool(flag) => Value::Bool(*flag),
        ParamValue::Number(number) => number_to_json(*number),
        ParamValue::String(text) => Value::from(text.as_str()),
        ParamValue::Array(values) => Value::Array(values.iter().map(param_to_json).collect()),
        ParamValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), param_to_json(value)))
                .collect(),
        ),
    }
}

fn number_to_json(number: f64) -> JsonNode {
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        return Value::from(number as i64);
    }
    Number::from_f64(number).map_or(Value::Null, Value::Number)
}
