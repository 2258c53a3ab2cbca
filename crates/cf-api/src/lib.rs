use std::sync::Arc;

use cf_codec::{from_json, from_json_str, script_payload, JsonNode, ScriptPayload};
use cf_core::{
    check_structure, count_blocks, find_block_by_id, normalize_tree, Block, CollectionKind,
    FlowError, IdGenerator,
};
use cf_lint::{can_insert, validate_all, Diagnostic, InsertionPoint, ValidationReport, Validator};
use cf_nav::{CachedDocument, EmptyScriptFetcher, NavigationStack, ScriptFetcher};
use cf_runtime::{simulate_with, FlowState, RosterEntry, SimulationOptions};
use tracing::info;

#[derive(Clone, Default)]
pub struct OpenSessionOptions {
    pub fetcher: Option<Arc<dyn ScriptFetcher>>,
    pub id_seed: Option<u32>,
}

pub fn normalize_json(nodes: &[JsonNode], id_seed: Option<u32>) -> Result<Vec<Block>, FlowError> {
    let mut blocks = from_json(nodes)?;
    normalize_checked(&mut blocks, &mut id_generator(id_seed))?;
    Ok(blocks)
}

pub fn normalize_json_str(raw: &str, id_seed: Option<u32>) -> Result<Vec<Block>, FlowError> {
    let mut blocks = from_json_str(raw)?;
    normalize_checked(&mut blocks, &mut id_generator(id_seed))?;
    Ok(blocks)
}

pub fn validate_tree(blocks: &[Block]) -> ValidationReport {
    validate_all(blocks)
}

pub fn simulate_tree(
    blocks: &[Block],
    target_block_id: &str,
    roster: &[RosterEntry],
    options: &SimulationOptions,
) -> FlowState {
    simulate_with(blocks, target_block_id, roster, options)
}

pub fn open_script_payload(
    raw: &str,
    options: OpenSessionOptions,
) -> Result<EditorSession, FlowError> {
    let payload = ScriptPayload::from_json_str(raw)?;
    EditorSession::open(payload, options)
}

/// One script opened for editing: its tree, the zoom stack over it and the
/// sub-scripts fetched while navigating.
pub struct EditorSession {
    name: String,
    file_name: String,
    stack: NavigationStack,
}

impl EditorSession {
    pub fn open(payload: ScriptPayload, options: OpenSessionOptions) -> Result<Self, FlowError> {
        if payload.name.trim().is_empty() {
            return Err(FlowError::new(
                "API_SCRIPT_NAME_MISSING",
                "Script payload has no name.",
            ));
        }
        let name = payload.name.clone();
        let file_name = payload.file_name.clone();
        let mut root = vec![payload.into_script_block()?];
        let mut ids = id_generator(options.id_seed);
        normalize_checked(&mut root, &mut ids)?;
        info!(script = %name, blocks = count_blocks(&root), "opened script");

        let fetcher = options.fetcher.unwrap_or_else(default_fetcher);
        Ok(Self {
            name,
            file_name,
            stack: NavigationStack::new(root, fetcher).with_id_generator(ids),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn navigation(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationStack {
        &mut self.stack
    }

    pub fn zoom_in(&mut self, block_id: &str) -> Result<(), FlowError> {
        self.stack.zoom_in(block_id)
    }

    pub fn zoom_out(&mut self, to: Option<usize>) {
        self.stack.zoom_out(to);
    }

    /// The whole document the current breadcrumb belongs to, not just the zoomed block.
    /// Validation and simulation need the surrounding context.
    pub fn current_document(&self) -> &[Block] {
        self.stack
            .document(self.stack.current_document())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> ValidationReport {
        validate_all(self.current_document())
    }

    pub fn validate_with(&self, validator: &Validator) -> ValidationReport {
        validator.validate(self.current_document())
    }

    pub fn simulate(
        &self,
        target_block_id: &str,
        roster: &[RosterEntry],
        options: &SimulationOptions,
    ) -> FlowState {
        simulate_with(self.current_document(), target_block_id, roster, options)
    }

    pub fn check_structure(&self) -> Result<(), FlowError> {
        check_structure(self.current_document())
    }

    /// `Ok(None)` when the insert is allowed, `Ok(Some(_))` with the reason when it is refused.
    pub fn check_insert(
        &self,
        candidate: &Block,
        parent_id: Option<&str>,
        collection: CollectionKind,
        index: Option<usize>,
    ) -> Result<Option<Diagnostic>, FlowError> {
        let container = match parent_id {
            Some(id) => Some(
                find_block_by_id(self.stack.visible_blocks(), id).ok_or_else(|| {
                    FlowError::with_block(
                        "NAV_BLOCK_NOT_VISIBLE",
                        format!("Block \"{}\" is not in the visible subtree.", id),
                        id,
                    )
                })?,
            ),
            None if self.stack.is_at_root() => None,
            None => Some(self.stack.visible_blocks().first().ok_or_else(|| {
                FlowError::new("NAV_BLOCK_NOT_VISIBLE", "The zoomed block no longer exists.")
            })?),
        };
        let point = match container {
            Some(container) => InsertionPoint::inside(container, collection, index),
            None => InsertionPoint::top_level(index),
        };
        Ok(can_insert(candidate, &point, self.current_document()).err())
    }

    /// Inserts after the insertion guard agreed. A refusal comes back as an error
    /// carrying the diagnostic's type as its code.
    pub fn insert_block(
        &mut self,
        parent_id: Option<&str>,
        collection: CollectionKind,
        index: Option<usize>,
        block: Block,
    ) -> Result<String, FlowError> {
        if let Some(refusal) = self.check_insert(&block, parent_id, collection, index)? {
            return Err(FlowError::with_block(
                refusal.error_type,
                refusal.message,
                refusal.block_id,
            ));
        }
        self.stack.insert_block(parent_id, collection, index, block)
    }

    pub fn update_block<F>(&mut self, block_id: &str, edit: F) -> Result<(), FlowError>
    where
        F: FnOnce(&mut Block),
    {
        self.stack.update_block(block_id, edit)
    }

    pub fn remove_block(&mut self, block_id: &str) -> Result<Block, FlowError> {
        self.stack.remove_block(block_id)
    }

    pub fn dirty_scripts(&self) -> Vec<String> {
        self.stack
            .cache()
            .dirty_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Payload for the opened script (`None`) or for a fetched sub-script. Saving a
    /// sub-script marks its cached copy clean.
    pub fn save_payload(&mut self, script: Option<&str>) -> Result<ScriptPayload, FlowError> {
        let Some(name) = script else {
            let [wrapper] = self.stack.root() else {
                return Err(FlowError::new(
                    "API_ROOT_NOT_SCRIPT",
                    format!(
                        "Root must be a single SCRIPT to save \"{}\", found {} top-level blocks.",
                        self.name,
                        self.stack.root().len()
                    ),
                ));
            };
            return script_payload(wrapper);
        };

        let wrapper = self
            .stack
            .cache()
            .get(name)
            .and_then(CachedDocument::wrapper)
            .ok_or_else(|| {
                FlowError::new(
                    "API_SCRIPT_NOT_OPEN",
                    format!("Script \"{}\" was never opened in this session.", name),
                )
            })?;
        let payload = script_payload(wrapper)?;
        self.stack.mark_saved(name);
        info!(script = name, "saved sub-script");
        Ok(payload)
    }

    /// The opened script first, then every edited sub-script.
    pub fn save_all(&mut self) -> Result<Vec<ScriptPayload>, FlowError> {
        let mut payloads = vec![self.save_payload(None)?];
        for name in self.dirty_scripts() {
            payloads.push(self.save_payload(Some(&name))?);
        }
        Ok(payloads)
    }

    pub fn into_root(self) -> Vec<Block> {
        self.stack.into_root()
    }
}

fn id_generator(seed: Option<u32>) -> IdGenerator {
    seed.map_or_else(IdGenerator::default, IdGenerator::seeded)
}

fn default_fetcher() -> Arc<dyn ScriptFetcher> {
    Arc::new(EmptyScriptFetcher)
}

fn normalize_checked(blocks: &mut Vec<Block>, ids: &mut IdGenerator) -> Result<(), FlowError> {
    normalize_tree(blocks, ids);
    check_structure(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{BlockKind, CommandTag, ParamValue, Parameters};
    use cf_nav::{FetchedScript, MemoryScriptFetcher};
    use cf_runtime::WalkMode;
    use serde_json::json;

    fn payload(blocks: serde_json::Value) -> ScriptPayload {
        ScriptPayload {
            name: "main".to_string(),
            file_name: "main.txt".to_string(),
            blocks: blocks.as_array().cloned().unwrap_or_default(),
        }
    }

    fn say(text: &str) -> Block {
        Block::command(
            CommandTag::Say,
            Parameters::from([("text".to_string(), ParamValue::from(text))]),
        )
    }

    fn sub_fetcher() -> Arc<dyn ScriptFetcher> {
        Arc::new(MemoryScriptFetcher::new().with_script(
            "sub",
            FetchedScript {
                file_name: "sub.txt".to_string(),
                blocks: vec![say("from sub")],
            },
        ))
    }

    fn options() -> OpenSessionOptions {
        OpenSessionOptions {
            fetcher: Some(sub_fetcher()),
            id_seed: Some(7),
        }
    }

    #[test]
    fn normalize_json_assigns_ids_and_flattens_anonymous_scripts() {
        let blocks = normalize_json(
            &[json!({"type": "SCRIPT", "children": [{"type": "SAY", "parameters": {"text": "Hi"}}]})],
            Some(1),
        )
        .expect("normalize should pass");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].type_name(), "SAY");
        assert!(blocks[0].id.starts_with("SAY-"));
    }

    #[test]
    fn normalize_json_str_rejects_duplicate_ids() {
        let error = normalize_json_str(
            r#"[{"type":"SAY","id":"a"},{"type":"ASK","id":"a"}]"#,
            None,
        )
        .expect_err("duplicate ids should fail");
        assert_eq!(error.code, "TREE_DUPLICATE_ID");
        assert_eq!(error.block_id.as_deref(), Some("a"));
    }

    #[test]
    fn validate_tree_reports_menu_without_options() {
        let blocks = normalize_json(
            &[json!({"type": "SCRIPT", "id": "s", "scriptName": "main", "children": [{"type": "MENU", "id": "m"}]})],
            Some(1),
        )
        .expect("normalize should pass");
        let report = validate_tree(&blocks);
        assert!(report.has("MENU_WITHOUT_OPT"));
        assert_eq!(report.for_block("m").count(), 1);
    }

    #[test]
    fn simulate_tree_follows_walk_option() {
        let blocks = normalize_json(
            &[json!({"type": "SHOW_CHARACTER", "id": "s", "parameters": {"character": "A"}}),
              json!({"type": "SAY", "id": "t"})],
            Some(1),
        )
        .expect("normalize should pass");
        let roster = vec![RosterEntry::new("A", vec!["a.png".to_string()])];
        let state = simulate_tree(
            &blocks,
            "t",
            &roster,
            &SimulationOptions {
                walk: Some(WalkMode::TopLevel),
            },
        );
        assert!(state.target_reached);
        assert!(state.character("A").expect("A").is_visible);
    }

    #[test]
    fn open_script_payload_wraps_blocks_in_named_script() {
        let raw = r#"{"name":"main","fileName":"main.txt","blocks":[{"type":"SAY","parameters":{"text":"Hi"}}]}"#;
        let session = open_script_payload(raw, OpenSessionOptions::default())
            .expect("open should pass");
        assert_eq!(session.name(), "main");
        assert_eq!(session.file_name(), "main.txt");
        let root = session.navigation().root();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].type_name(), "SCRIPT");
        assert_eq!(root[0].children().count(), 1);
        session.check_structure().expect("structure should pass");
    }

    #[test]
    fn open_rejects_anonymous_payload() {
        let mut anonymous = payload(json!([]));
        anonymous.name = " ".to_string();
        let error = EditorSession::open(anonymous, options()).err().expect("blank name");
        assert_eq!(error.code, "API_SCRIPT_NAME_MISSING");
    }

    #[test]
    fn session_validates_the_document_of_the_current_breadcrumb() {
        let mut session = EditorSession::open(
            payload(json!([
                {"type": "MENU", "id": "m"},
                {"type": "SUB_SCRIPT", "id": "call", "parameters": {"script": "sub"}}
            ])),
            options(),
        )
        .expect("open should pass");
        assert!(session.validate().has("MENU_WITHOUT_OPT"));

        session.zoom_in("call").expect("zoom into sub");
        let report = session.validate();
        assert!(!report.has("MENU_WITHOUT_OPT"));
        assert_eq!(session.current_document()[0].type_name(), "SCRIPT");
        session.zoom_out(None);
        assert!(session.validate().has("MENU_WITHOUT_OPT"));
    }

    #[test]
    fn insert_block_refuses_what_the_guard_rejects() {
        let mut session = EditorSession::open(
            payload(json!([{"type": "MENU", "id": "m", "children": [
                {"type": "OPT", "id": "o", "text": {"EN": "Go"}}
            ]}])),
            options(),
        )
        .expect("open should pass");

        let error = session
            .insert_block(Some("m"), CollectionKind::Children, None, say("nope"))
            .expect_err("SAY cannot go into a MENU");
        assert_eq!(error.code, "NON_OPT_IN_MENU");

        let id = session
            .insert_block(Some("o"), CollectionKind::Children, None, say("inside"))
            .expect("SAY fits into an OPT");
        let inserted = find_block_by_id(session.navigation().root(), &id).expect("inserted");
        assert_eq!(inserted.string_param("text"), Some("inside"));

        let error = session
            .check_insert(&say("x"), Some("missing"), CollectionKind::Children, None)
            .expect_err("unknown parent");
        assert_eq!(error.code, "NAV_BLOCK_NOT_VISIBLE");
    }

    #[test]
    fn insert_block_rejects_ids_already_in_the_document() {
        let mut session = EditorSession::open(
            payload(json!([{"type": "SAY", "id": "dup", "parameters": {"text": "Hi"}}])),
            options(),
        )
        .expect("open should pass");
        let script_id = session.navigation().root()[0].id.clone();

        let mut clash = say("again");
        clash.id = "dup".to_string();
        let error = session
            .insert_block(Some(&script_id), CollectionKind::Children, None, clash)
            .expect_err("dup is taken");
        assert_eq!(error.code, "TREE_DUPLICATE_ID");
        assert_eq!(error.block_id.as_deref(), Some("dup"));
        assert_eq!(session.navigation().root()[0].children().count(), 1);
        session.check_structure().expect("tree should stay unique");
    }

    #[test]
    fn save_payload_marks_sub_script_clean() {
        let mut session = EditorSession::open(
            payload(json!([{"type": "SUB_SCRIPT", "id": "call", "parameters": {"script": "sub"}}])),
            options(),
        )
        .expect("open should pass");

        let error = session.save_payload(Some("sub")).expect_err("not fetched yet");
        assert_eq!(error.code, "API_SCRIPT_NOT_OPEN");

        session.zoom_in("call").expect("zoom into sub");
        let child_id = session.current_document()[0]
            .children()
            .next()
            .expect("sub child")
            .id
            .clone();
        session
            .update_block(&child_id, |block| {
                if let Some(parameters) = block.parameters_mut() {
                    parameters.insert("text".to_string(), ParamValue::from("edited"));
                }
            })
            .expect("edit should pass");
        assert_eq!(session.dirty_scripts(), vec!["sub".to_string()]);

        let payloads = session.save_all().expect("save should pass");
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].name, "main");
        assert_eq!(payloads[1].name, "sub");
        assert_eq!(payloads[1].file_name, "sub.txt");
        assert_eq!(payloads[1].blocks[0]["parameters"]["text"], "edited");
        assert!(session.dirty_scripts().is_empty());
    }

    #[test]
    fn save_payload_requires_a_single_root_script() {
        let mut session =
            EditorSession::open(payload(json!([])), options()).expect("open should pass");
        session
            .insert_block(None, CollectionKind::Children, None, say("stray"))
            .expect("top-level insert");
        let error = session.save_payload(None).expect_err("two top-level blocks");
        assert_eq!(error.code, "API_ROOT_NOT_SCRIPT");

        let root = session.into_root();
        assert!(matches!(root[0].kind, BlockKind::Script(_)));
    }
}
