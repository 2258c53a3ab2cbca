mod decode;
mod encode;
mod payload;

pub use decode::{block_from_json, from_json, from_json_str, param_from_json};
pub use encode::{block_to_json, param_to_json, to_json, to_json_string};
pub use payload::{script_payload, ScriptPayload};

/// Persisted and transmitted form of one block.
pub type JsonNode = serde_json::Value;
