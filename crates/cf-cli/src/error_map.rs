use cf_core::FlowError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> FlowError {
    FlowError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: FlowError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    if let Some(block_id) = &error.block_id {
        println!("ERROR_BLOCK:{}", block_id);
    }
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::Value::String(error.message)
    );
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> FlowError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> FlowError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_roster_read(error: std::io::Error) -> FlowError {
    map_error("CLI_ROSTER_READ", error)
}

pub(crate) fn map_cli_roster_invalid(error: serde_json::Error) -> FlowError {
    map_error("CLI_ROSTER_INVALID", error)
}

pub(crate) fn map_cli_out_write(error: std::io::Error) -> FlowError {
    map_error("CLI_OUT_WRITE", error)
}

pub(crate) fn map_cli_json_write(error: serde_json::Error) -> FlowError {
    map_error("CLI_JSON_WRITE", error)
}
