use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cf_codec::{from_json, ScriptPayload};
use cf_core::FlowError;
use cf_nav::{FetchedScript, ScriptFetcher};
use cf_runtime::RosterEntry;
use tracing::debug;
use walkdir::WalkDir;

use crate::{map_cli_roster_invalid, map_cli_roster_read, map_cli_source_path, map_cli_source_read};

fn absolute(raw: &str) -> Result<PathBuf, FlowError> {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()
        .map_err(map_cli_source_path)?
        .join(path))
}

pub(crate) fn resolve_scripts_dir(scripts_dir: &str) -> Result<PathBuf, FlowError> {
    let absolute = absolute(scripts_dir)?;

    if !absolute.exists() {
        return Err(FlowError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("scripts-dir does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(FlowError::new(
            "CLI_SOURCE_NOT_DIR",
            format!("scripts-dir is not a directory: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn resolve_source_file(file: &str) -> Result<PathBuf, FlowError> {
    let absolute = absolute(file)?;

    if !absolute.is_file() {
        return Err(FlowError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("script file does not exist: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn read_payload_file(path: &Path) -> Result<ScriptPayload, FlowError> {
    let raw = fs::read_to_string(path).map_err(map_cli_source_read)?;
    ScriptPayload::from_json_str(&raw)
}

/// Every `*.json` payload under the directory, keyed by its path relative to it.
pub(crate) fn read_payloads_from_dir(
    scripts_dir: &Path,
) -> Result<BTreeMap<String, ScriptPayload>, FlowError> {
    let mut payloads = BTreeMap::new();

    for entry in WalkDir::new(scripts_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json")
        {
            continue;
        }

        let relative = path
            .strip_prefix(scripts_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        payloads.insert(relative, read_payload_file(path)?);
    }

    if payloads.is_empty() {
        return Err(FlowError::new(
            "CLI_SOURCE_EMPTY",
            format!("No .json script files under {}", scripts_dir.display()),
        ));
    }

    Ok(payloads)
}

pub(crate) fn load_roster(path: Option<&str>) -> Result<Vec<RosterEntry>, FlowError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = fs::read_to_string(absolute(path)?).map_err(map_cli_roster_read)?;
    serde_json::from_str(&raw).map_err(map_cli_roster_invalid)
}

/// Serves sub-scripts from `<scripts-dir>/<name>.json`.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryScriptFetcher {
    root: PathBuf,
}

impl DirectoryScriptFetcher {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub(crate) fn script_path(&self, name: &str) -> Result<PathBuf, FlowError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(FlowError::new(
                "NAV_SCRIPT_NAME_INVALID",
                format!("\"{}\" cannot name a script file.", name),
            ));
        }
        Ok(self.root.join(format!("{}.json", name)))
    }
}

impl ScriptFetcher for DirectoryScriptFetcher {
    fn fetch_script(&self, name: &str) -> Result<FetchedScript, FlowError> {
        let path = self.script_path(name)?;
        if !path.is_file() {
            return Err(FlowError::new(
                "NAV_SCRIPT_NOT_FOUND",
                format!("Script \"{}\" not found at {}.", name, path.display()),
            ));
        }
        debug!(script = name, path = %path.display(), "reading script file");
        let payload = read_payload_file(&path)?;
        Ok(FetchedScript {
            file_name: payload.file_name,
            blocks: from_json(&payload.blocks)?,
        })
    }
}
