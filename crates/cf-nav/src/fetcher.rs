use std::collections::BTreeMap;

use cf_core::{Block, FlowError};

/// A referenced script as delivered by the fetch collaborator, already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedScript {
    pub file_name: String,
    pub blocks: Vec<Block>,
}

pub trait ScriptFetcher: Send + Sync {
    fn fetch_script(&self, name: &str) -> Result<FetchedScript, FlowError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyScriptFetcher;

impl ScriptFetcher for EmptyScriptFetcher {
    fn fetch_script(&self, name: &str) -> Result<FetchedScript, FlowError> {
        Err(FlowError::new(
            "NAV_FETCH_UNAVAILABLE",
            format!("No script source configured to fetch \"{}\".", name),
        ))
    }
}

/// Serves scripts from memory. Useful for hosts that preload every script of a campaign.
#[derive(Debug, Default, Clone)]
pub struct MemoryScriptFetcher {
    scripts: BTreeMap<String, FetchedScript>,
}

impl MemoryScriptFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, script: FetchedScript) {
        self.scripts.insert(name.into(), script);
    }

    pub fn with_script(mut self, name: impl Into<String>, script: FetchedScript) -> Self {
        self.insert(name, script);
        self
    }
}

impl ScriptFetcher for MemoryScriptFetcher {
    fn fetch_script(&self, name: &str) -> Result<FetchedScript, FlowError> {
        self.scripts.get(name).cloned().ok_or_else(|| {
            FlowError::new(
                "NAV_SCRIPT_NOT_FOUND",
                format!("Script \"{}\" not found.", name),
            )
        })
    }
}
