use std::fs;
use std::path::Path;

use cf_codec::ScriptPayload;
use cf_core::FlowError;

use crate::map_cli_out_write;

pub(crate) fn write_payload(path: &Path, payload: &ScriptPayload) -> Result<(), FlowError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_out_write)?;

    let raw = payload.to_json_string()?;
    fs::write(path, raw).map_err(map_cli_out_write)
}
