use std::slice;
use std::sync::Arc;

use cf_core::{
    add_unique_ids, check_insertable, check_structure, find_block_by_id, find_block_by_id_mut,
    normalize_tree, path_to, remove_block_by_id, resolve_path, resolve_path_mut, Block,
    CollectionKind, CommandTag, FlowError, IdGenerator,
};
use tracing::{debug, info};

use crate::cache::{CachedDocument, ScriptCache};
use crate::entry::{display_name, DocumentKey, EntryKind, NavigationEntry};
use crate::fetcher::{FetchedScript, ScriptFetcher};

/// Zoom state over a script tree and the sub-scripts it references.
///
/// The visible root is never stored. It is resolved from the current breadcrumb's document
/// and id path on every access, so edits made at any depth land in the one real tree.
pub struct NavigationStack {
    root: Vec<Block>,
    breadcrumbs: Vec<NavigationEntry>,
    cache: ScriptCache,
    fetcher: Arc<dyn ScriptFetcher>,
    ids: IdGenerator,
}

enum ZoomTarget {
    Local(NavigationEntry),
    Reference(EntryKind, String),
    Current,
}

impl NavigationStack {
    pub fn new(root: Vec<Block>, fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self {
            root,
            breadcrumbs: Vec::new(),
            cache: ScriptCache::default(),
            fetcher,
            ids: IdGenerator::default(),
        }
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn root(&self) -> &[Block] {
        &self.root
    }

    pub fn into_root(self) -> Vec<Block> {
        self.root
    }

    pub fn breadcrumbs(&self) -> &[NavigationEntry] {
        &self.breadcrumbs
    }

    pub fn is_at_root(&self) -> bool {
        self.breadcrumbs.is_empty()
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    pub fn document(&self, key: &DocumentKey) -> Option<&[Block]> {
        match key {
            DocumentKey::Root => Some(&self.root),
            DocumentKey::Script(name) => self
                .cache
                .get(name)
                .map(|document| document.blocks.as_slice()),
        }
    }

    /// The block shown by breadcrumb `index`, resolved against the live tree.
    pub fn entry_block(&self, index: usize) -> Option<&Block> {
        let entry = self.breadcrumbs.get(index)?;
        resolve_path(self.document(&entry.document)?, &entry.path)
    }

    /// The whole root at depth zero, else the zoomed block alone. Empty when an edit
    /// removed the zoomed block from under the breadcrumb.
    pub fn visible_blocks(&self) -> &[Block] {
        match self.breadcrumbs.len().checked_sub(1) {
            None => &self.root,
            Some(last) => self
                .entry_block(last)
                .map(slice::from_ref)
                .unwrap_or_default(),
        }
    }

    pub fn current_document(&self) -> &DocumentKey {
        self.breadcrumbs
            .last()
            .map_or(&DocumentKey::Root, |entry| &entry.document)
    }

    /// Name of the sub-script being edited, `None` while in the root document.
    pub fn current_document_name(&self) -> Option<&str> {
        match self.current_document() {
            DocumentKey::Root => None,
            DocumentKey::Script(name) => Some(name.as_str()),
        }
    }

    /// Zooms into a container of the visible subtree, or opens the script a
    /// SUB_SCRIPT / ACT_MISSION block refers to. A failed fetch leaves the stack untouched.
    pub fn zoom_in(&mut self, block_id: &str) -> Result<(), FlowError> {
        match self.zoom_target(block_id)? {
            ZoomTarget::Current => {
                debug!(block_id, "already zoomed into block");
                Ok(())
            }
            ZoomTarget::Local(entry) => {
                debug!(block_id, depth = self.breadcrumbs.len() + 1, "zoomed in");
                self.breadcrumbs.push(entry);
                Ok(())
            }
            ZoomTarget::Reference(kind, name) => self.open_script(kind, name),
        }
    }

    fn zoom_target(&self, block_id: &str) -> Result<ZoomTarget, FlowError> {
        let visible = self.visible_blocks();
        let block = find_block_by_id(visible, block_id).ok_or_else(|| {
            FlowError::with_block(
                "NAV_BLOCK_NOT_FOUND",
                format!("Block \"{}\" is not in the visible tree.", block_id),
                block_id,
            )
        })?;

        if block.is_container() {
            let Some(current) = self.breadcrumbs.last() else {
                let path = path_to(&self.root, block_id).unwrap_or_default();
                return Ok(ZoomTarget::Local(zoom_entry(block, DocumentKey::Root, path)));
            };
            if visible.first().is_some_and(|shown| shown.id == block_id) {
                return Ok(ZoomTarget::Current);
            }
            let mut path = current.path.clone();
            path.extend(path_to(visible, block_id).unwrap_or_default().into_iter().skip(1));
            return Ok(ZoomTarget::Local(zoom_entry(
                block,
                current.document.clone(),
                path,
            )));
        }

        let (kind, key) = match block.tag() {
            Some(CommandTag::SubScript) => (EntryKind::Subscript, "script"),
            Some(CommandTag::ActMission) => (EntryKind::Mission, "mission"),
            _ => {
                return Err(FlowError::with_block(
                    "NAV_NOT_ZOOMABLE",
                    format!("{} blocks cannot be zoomed into.", block.type_name()),
                    block_id,
                ))
            }
        };
        let name = block.string_param(key).ok_or_else(|| {
            FlowError::with_block(
                "NAV_REFERENCE_MISSING",
                format!("{} has no \"{}\" to open.", block.type_name(), key),
                block_id,
            )
        })?;
        Ok(ZoomTarget::Reference(kind, name.to_string()))
    }

    fn open_script(&mut self, kind: EntryKind, name: String) -> Result<(), FlowError> {
        if self.cache.contains(&name) {
            debug!(script = %name, "reusing cached script");
        } else {
            info!(script = %name, kind = kind.as_str(), "fetching referenced script");
            let fetched = self.fetcher.fetch_script(&name)?;
            let document = self.prepare_document(&name, fetched)?;
            self.cache.insert(document);
        }

        let wrapper_id = self
            .cache
            .get(&name)
            .and_then(CachedDocument::wrapper)
            .map(|wrapper| wrapper.id.clone())
            .ok_or_else(|| {
                FlowError::new(
                    "NAV_DOCUMENT_MISSING",
                    format!("Script \"{}\" has no blocks to show.", name),
                )
            })?;
        self.breadcrumbs.push(NavigationEntry {
            id: format!("{}-{}", kind.as_str(), name),
            name: name.clone(),
            kind,
            document: DocumentKey::Script(name),
            path: vec![wrapper_id],
        });
        debug!(depth = self.breadcrumbs.len(), "opened referenced script");
        Ok(())
    }

    fn prepare_document(
        &mut self,
        name: &str,
        fetched: FetchedScript,
    ) -> Result<CachedDocument, FlowError> {
        let FetchedScript {
            file_name,
            mut blocks,
        } = fetched;
        normalize_tree(&mut blocks, &mut self.ids);
        let wrapped = matches!(blocks.as_slice(), [only] if only.type_name() == "SCRIPT");
        if !wrapped {
            let mut wrapper =
                Block::script(Some(name.to_string()), Some(file_name.clone()), blocks);
            wrapper.id = self.ids.generate("SCRIPT");
            blocks = vec![wrapper];
        }
        check_structure(&blocks)?;
        Ok(CachedDocument {
            name: name.to_string(),
            file_name,
            blocks,
            dirty: false,
        })
    }

    /// Keeps breadcrumbs `0..=index`. `None` returns to the root.
    pub fn zoom_out(&mut self, to: Option<usize>) {
        match to {
            None => self.breadcrumbs.clear(),
            Some(index) => self.breadcrumbs.truncate(index + 1),
        }
        debug!(depth = self.breadcrumbs.len(), "zoomed out");
    }

    pub fn zoom_out_one(&mut self) -> Option<NavigationEntry> {
        let popped = self.breadcrumbs.pop();
        debug!(depth = self.breadcrumbs.len(), "zoomed out one level");
        popped
    }

    pub fn update_block<F>(&mut self, block_id: &str, edit: F) -> Result<(), FlowError>
    where
        F: FnOnce(&mut Block),
    {
        let scope = self.visible_mut()?;
        let block = find_block_by_id_mut(scope, block_id).ok_or_else(|| not_visible(block_id))?;
        edit(block);
        self.mark_current_dirty();
        Ok(())
    }

    /// Inserts into a container of the visible subtree and returns the block's id.
    /// Without a parent the block goes into the top level, or into the zoomed block when zoomed.
    pub fn insert_block(
        &mut self,
        parent_id: Option<&str>,
        collection: CollectionKind,
        index: Option<usize>,
        mut block: Block,
    ) -> Result<String, FlowError> {
        add_unique_ids(slice::from_mut(&mut block), &mut self.ids);
        check_insertable(
            &block,
            self.document(self.current_document()).unwrap_or_default(),
        )?;
        let id = block.id.clone();

        let parent_id = match (parent_id, self.breadcrumbs.last()) {
            (Some(parent_id), _) => parent_id.to_string(),
            (None, Some(entry)) => entry.path.last().cloned().unwrap_or_default(),
            (None, None) => {
                let position = index.unwrap_or(self.root.len()).min(self.root.len());
                self.root.insert(position, block);
                return Ok(id);
            }
        };

        let scope = self.visible_mut()?;
        let parent =
            find_block_by_id_mut(scope, &parent_id).ok_or_else(|| not_visible(&parent_id))?;
        let parent_type = parent.type_name();
        let target = parent.collection_mut(collection).ok_or_else(|| {
            FlowError::with_block(
                "NAV_COLLECTION_INVALID",
                format!("{} has no \"{}\" collection.", parent_type, collection),
                parent_id.as_str(),
            )
        })?;
        let position = index.unwrap_or(target.len()).min(target.len());
        target.insert(position, block);
        self.mark_current_dirty();
        Ok(id)
    }

    /// Removes a block of the visible subtree. The zoomed block itself cannot be removed
    /// from inside its own zoom.
    pub fn remove_block(&mut self, block_id: &str) -> Result<Block, FlowError> {
        if self.breadcrumbs.is_empty() {
            return remove_block_by_id(&mut self.root, block_id)
                .ok_or_else(|| not_visible(block_id));
        }
        let scope = self.visible_mut()?;
        let Some(zoomed) = scope.first_mut() else {
            return Err(not_visible(block_id));
        };
        if zoomed.id == block_id {
            return Err(FlowError::with_block(
                "NAV_REMOVE_VISIBLE_ROOT",
                "Zoom out before removing the block being shown.",
                block_id,
            ));
        }
        let removed = zoomed
            .collections_mut()
            .into_iter()
            .find_map(|(_, children)| remove_block_by_id(children, block_id))
            .ok_or_else(|| not_visible(block_id))?;
        self.mark_current_dirty();
        Ok(removed)
    }

    /// Drops a cached sub-script so the next zoom fetches it again.
    pub fn invalidate_script(&mut self, name: &str) -> Result<Option<CachedDocument>, FlowError> {
        let in_use = self
            .breadcrumbs
            .iter()
            .any(|entry| matches!(&entry.document, DocumentKey::Script(open) if open == name));
        if in_use {
            return Err(FlowError::new(
                "NAV_CACHE_IN_USE",
                format!("Script \"{}\" is open in the breadcrumbs.", name),
            ));
        }
        Ok(self.cache.invalidate(name))
    }

    pub fn mark_saved(&mut self, name: &str) -> bool {
        self.cache.mark_clean(name)
    }

    fn visible_mut(&mut self) -> Result<&mut [Block], FlowError> {
        let Some(entry) = self.breadcrumbs.last() else {
            return Ok(self.root.as_mut_slice());
        };
        let blocks = match &entry.document {
            DocumentKey::Root => &mut self.root,
            DocumentKey::Script(name) => {
                &mut self
                    .cache
                    .get_mut(name)
                    .ok_or_else(|| {
                        FlowError::new(
                            "NAV_DOCUMENT_MISSING",
                            format!("Script \"{}\" is no longer cached.", name),
                        )
                    })?
                    .blocks
            }
        };
        resolve_path_mut(blocks, &entry.path)
            .map(slice::from_mut)
            .ok_or_else(|| {
                FlowError::new(
                    "NAV_BLOCK_NOT_VISIBLE",
                    format!("Breadcrumb \"{}\" no longer resolves.", entry.name),
                )
            })
    }

    fn mark_current_dirty(&mut self) {
        let current = self.breadcrumbs.last().map(|entry| &entry.document);
        if let Some(DocumentKey::Script(name)) = current {
            if let Some(document) = self.cache.get_mut(name) {
                document.dirty = true;
            }
        }
    }
}

fn zoom_entry(block: &Block, document: DocumentKey, path: Vec<String>) -> NavigationEntry {
    NavigationEntry {
        id: block.id.clone(),
        name: display_name(block),
        kind: EntryKind::Zoom,
        document,
        path,
    }
}

fn not_visible(block_id: &str) -> FlowError {
    FlowError::with_block(
        "NAV_BLOCK_NOT_VISIBLE",
        format!("Block \"{}\" is outside the visible tree.", block_id),
        block_id,
    )
}
