use crate::block::{Block, BlockKind, DEFAULT_IF_TYPE, DEFAULT_OPT_TYPE};
use crate::ids::{add_unique_ids, IdGenerator};
use crate::traverse::visit_mut;

/// Splices the children of every anonymous SCRIPT into its parent's sequence, recursively.
pub fn flatten_anonymous_scripts(blocks: &mut Vec<Block>) {
    let original = std::mem::take(blocks);
    for mut block in original {
        if block.is_anonymous_script() {
            if let BlockKind::Script(script) = block.kind {
                let mut children = script.children;
                flatten_anonymous_scripts(&mut children);
                blocks.extend(children);
            }
            continue;
        }
        for (_, children) in block.collections_mut() {
            flatten_anonymous_scripts(children);
        }
        blocks.push(block);
    }
}

/// Fills container defaults, keeps IF branch counters in step with the branches and
/// drops parameter keys outside each tag's schema. An absent `elseBlocks` stays absent.
pub fn normalize_structure(blocks: &mut [Block]) {
    visit_mut(blocks, &mut |block| match &mut block.kind {
        BlockKind::If(branch) => {
            if branch.if_type.trim().is_empty() {
                branch.if_type = DEFAULT_IF_TYPE.to_string();
            }
            branch.num_then = branch.then_blocks.len() as u32;
            branch.num_else = branch.else_blocks.as_ref().map_or(0, |e| e.len() as u32);
        }
        BlockKind::Opt(opt) => {
            if opt.opt_type.trim().is_empty() {
                opt.opt_type = DEFAULT_OPT_TYPE.to_string();
            }
        }
        BlockKind::Command(command) => {
            let tag = command.tag;
            command
                .parameters
                .retain(|key, _| tag.accepts_parameter(key));
        }
        _ => {}
    });
}

/// The one normalization entry point: flatten, then structure, then ids.
pub fn normalize_tree(blocks: &mut Vec<Block>, ids: &mut IdGenerator) {
    flatten_anonymous_scripts(blocks);
    normalize_structure(blocks);
    add_unique_ids(blocks, ids);
}

/// A SCRIPT fit for persistence: named, with a file and an id.
pub fn is_valid_script_block(block: &Block) -> bool {
    match &block.kind {
        BlockKind::Script(script) => {
            block.has_id()
                && script
                    .script_name
                    .as_deref()
                    .is_some_and(|name| !name.trim().is_empty())
                && script
                    .file_name
                    .as_deref()
                    .is_some_and(|name| !name.trim().is_empty())
        }
        _ => false,
    }
}
