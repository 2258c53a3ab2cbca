use std::collections::BTreeSet;
use std::slice;

use crate::block::Block;
use crate::error::FlowError;
use crate::traverse::{collect_all_blocks, walk};

/// Hard structural check: every block has an id, ids are unique across every collection,
/// and no anonymous SCRIPT wrapper survives below the top level.
pub fn check_structure(blocks: &[Block]) -> Result<(), FlowError> {
    let mut seen = BTreeSet::new();
    let mut failure = None;
    walk(blocks, &mut |visit| {
        if failure.is_some() {
            return;
        }
        let block = visit.block;
        if !block.has_id() {
            let parent = visit
                .parent()
                .map(|parent| parent.id.as_str())
                .unwrap_or("<root>");
            failure = Some(FlowError::new(
                "TREE_MISSING_ID",
                format!("{} block under \"{}\" has no id.", block.type_name(), parent),
            ));
        } else if !seen.insert(block.id.clone()) {
            failure = Some(FlowError::with_block(
                "TREE_DUPLICATE_ID",
                format!("Block id \"{}\" is used more than once.", block.id),
                block.id.clone(),
            ));
        } else if !visit.ancestors.is_empty() && block.is_anonymous_script() {
            failure = Some(FlowError::with_block(
                "TREE_ANONYMOUS_SCRIPT",
                "Anonymous SCRIPT wrapper must be flattened before use.",
                block.id.clone(),
            ));
        }
    });
    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Checks a block about to be added to `document`: the candidate subtree must pass
/// [`check_structure`] on its own and none of its ids may already be in the document.
pub fn check_insertable(candidate: &Block, document: &[Block]) -> Result<(), FlowError> {
    check_structure(slice::from_ref(candidate))?;
    let taken = collect_all_blocks(document)
        .into_iter()
        .map(|block| block.id.as_str())
        .collect::<BTreeSet<_>>();
    match collect_all_blocks(slice::from_ref(candidate))
        .into_iter()
        .find(|block| taken.contains(block.id.as_str()))
    {
        Some(clash) => Err(FlowError::with_block(
            "TREE_DUPLICATE_ID",
            format!("Block id \"{}\" is already used in the document.", clash.id),
            clash.id.clone(),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod structure_tests {
    use super::*;
    use crate::block::{BlockKind, BuildBlock};
    use crate::tag::CommandTag;
    use crate::value::Parameters;

    fn say(id: &str) -> Block {
        let mut block = Block::command(CommandTag::Say, Parameters::new());
        block.id = id.to_string();
        block
    }

    #[test]
    fn check_structure_accepts_well_formed_tree() {
        let blocks = vec![Block::with_id(
            "build",
            BlockKind::Build(BuildBlock {
                block_init: vec![say("a")],
                block_start: vec![say("b")],
            }),
        )];
        check_structure(&blocks).expect("tree should pass");
    }

    #[test]
    fn check_structure_reports_duplicates_in_hidden_collections() {
        let blocks = vec![Block::with_id(
            "build",
            BlockKind::Build(BuildBlock {
                block_init: vec![say("a")],
                block_start: vec![say("a")],
            }),
        )];
        let error = check_structure(&blocks).expect_err("duplicate should fail");
        assert_eq!(error.code, "TREE_DUPLICATE_ID");
        assert_eq!(error.block_id.as_deref(), Some("a"));
    }

    #[test]
    fn check_insertable_rejects_ids_already_in_the_document() {
        let document = vec![Block::with_id(
            "build",
            BlockKind::Build(BuildBlock {
                block_init: vec![say("a")],
                block_start: Vec::new(),
            }),
        )];
        check_insertable(&say("b"), &document).expect("fresh id should pass");

        let error = check_insertable(&say("a"), &document).expect_err("a is taken");
        assert_eq!(error.code, "TREE_DUPLICATE_ID");
        assert_eq!(error.block_id.as_deref(), Some("a"));

        let nested = Block::with_id(
            "flight",
            BlockKind::Flight(crate::block::FlightBlock {
                block_init: vec![say("c")],
                block_start: vec![say("c")],
                block_evaluate: Vec::new(),
            }),
        );
        let error = check_insertable(&nested, &document).expect_err("c repeats inside");
        assert_eq!(error.block_id.as_deref(), Some("c"));
    }

    #[test]
    fn check_structure_reports_missing_ids() {
        let blocks = vec![Block::command(CommandTag::Say, Parameters::new())];
        let error = check_structure(&blocks).expect_err("missing id should fail");
        assert_eq!(error.code, "TREE_MISSING_ID");
    }

    #[test]
    fn check_structure_reports_nested_anonymous_scripts() {
        let blocks = vec![Block::with_id(
            "main",
            BlockKind::Script(crate::block::ScriptBlock {
                script_name: Some("main".to_string()),
                file_name: Some("main.txt".to_string()),
                children: vec![Block::with_id(
                    "wrapper",
                    BlockKind::Script(Default::default()),
                )],
            }),
        )];
        let error = check_structure(&blocks).expect_err("wrapper should fail");
        assert_eq!(error.code, "TREE_ANONYMOUS_SCRIPT");
    }
}
