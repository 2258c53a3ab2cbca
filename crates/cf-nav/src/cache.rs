use std::collections::BTreeMap;

use cf_core::Block;

/// One fetched script held in memory for the whole editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDocument {
    pub name: String,
    pub file_name: String,
    /// Always a single named SCRIPT wrapping the script's blocks.
    pub blocks: Vec<Block>,
    /// Edited since it was fetched or last saved.
    pub dirty: bool,
}

impl CachedDocument {
    pub fn wrapper(&self) -> Option<&Block> {
        self.blocks.first()
    }
}

/// Fetched scripts keyed by name, owned by one navigation stack.
#[derive(Debug, Default, Clone)]
pub struct ScriptCache {
    documents: BTreeMap<String, CachedDocument>,
}

impl ScriptCache {
    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&CachedDocument> {
        self.documents.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut CachedDocument> {
        self.documents.get_mut(name)
    }

    pub(crate) fn insert(&mut self, document: CachedDocument) {
        self.documents.insert(document.name.clone(), document);
    }

    /// Drops the cached copy so the next zoom into it fetches again.
    pub fn invalidate(&mut self, name: &str) -> Option<CachedDocument> {
        self.documents.remove(name)
    }

    pub fn mark_clean(&mut self, name: &str) -> bool {
        match self.documents.get_mut(name) {
            Some(document) => {
                document.dirty = false;
                true
            }
            None => false,
        }
    }

    pub fn dirty_names(&self) -> Vec<&str> {
        self.documents
            .values()
            .filter(|document| document.dirty)
            .map(|document| document.name.as_str())
            .collect()
    }
}
