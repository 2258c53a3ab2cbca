use std::collections::BTreeMap;

use crate::block::{Block, CollectionKind};
use crate::error::FlowError;

/// Position of a block during a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub block: &'a Block,
    /// Outermost first. Empty for top-level blocks.
    pub ancestors: &'a [&'a Block],
    /// `None` for the top-level sequence.
    pub collection: Option<CollectionKind>,
    pub siblings: &'a [Block],
    pub index: usize,
}

impl<'a> Visit<'a> {
    pub fn parent(&self) -> Option<&'a Block> {
        self.ancestors.last().copied()
    }

    pub fn previous(&self) -> Option<&'a Block> {
        self.index
            .checked_sub(1)
            .and_then(|index| self.siblings.get(index))
    }

    pub fn next(&self) -> Option<&'a Block> {
        self.siblings.get(self.index + 1)
    }

    pub fn has_ancestor(&self, type_names: &[&str]) -> bool {
        self.ancestors
            .iter()
            .any(|ancestor| type_names.contains(&ancestor.type_name()))
    }
}

/// Pre-order walk over every collection of every block, in document order.
pub fn walk<'a, F>(blocks: &'a [Block], visitor: &mut F)
where
    F: FnMut(&Visit<'_>),
{
    let mut ancestors: Vec<&'a Block> = Vec::new();
    walk_sequence(blocks, None, &mut ancestors, visitor);
}

fn walk_sequence<'a, F>(
    blocks: &'a [Block],
    collection: Option<CollectionKind>,
    ancestors: &mut Vec<&'a Block>,
    visitor: &mut F,
) where
    F: FnMut(&Visit<'_>),
{
    for (index, block) in blocks.iter().enumerate() {
        visitor(&Visit {
            block,
            ancestors: ancestors.as_slice(),
            collection,
            siblings: blocks,
            index,
        });
        ancestors.push(block);
        for (kind, children) in block.collections() {
            walk_sequence(children, Some(kind), ancestors, visitor);
        }
        ancestors.pop();
    }
}

pub fn visit_mut<F>(blocks: &mut [Block], visitor: &mut F)
where
    F: FnMut(&mut Block),
{
    for block in blocks.iter_mut() {
        visitor(block);
        for (_, children) in block.collections_mut() {
            visit_mut(children, visitor);
        }
    }
}

pub fn collect_all_blocks(blocks: &[Block]) -> Vec<&Block> {
    let mut collected = Vec::new();
    collect_into(blocks, &mut collected);
    collected
}

fn collect_into<'a>(blocks: &'a [Block], collected: &mut Vec<&'a Block>) {
    for block in blocks {
        collected.push(block);
        for (_, children) in block.collections() {
            collect_into(children, collected);
        }
    }
}

pub fn count_blocks(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|block| {
            1 + block
                .collections()
                .into_iter()
                .map(|(_, children)| count_blocks(children))
                .sum::<usize>()
        })
        .sum()
}

pub fn count_blocks_by_type(blocks: &[Block]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for block in collect_all_blocks(blocks) {
        *counts.entry(block.type_name().to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn find_block_by_id<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        for (_, children) in block.collections() {
            if let Some(found) = find_block_by_id(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_block_by_id_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if block.id == id {
            return Some(block);
        }
        for (_, children) in block.collections_mut() {
            if let Some(found) = find_block_by_id_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Whether `id` names a strict descendant of `block`.
pub fn contains_block(block: &Block, id: &str) -> bool {
    block
        .collections()
        .into_iter()
        .any(|(_, children)| find_block_by_id(children, id).is_some())
}

/// Ids from the top-level block down to (and including) the block named `id`.
pub fn path_to(blocks: &[Block], id: &str) -> Option<Vec<String>> {
    for block in blocks {
        if block.id == id {
            return Some(vec![block.id.clone()]);
        }
        for (_, children) in block.collections() {
            if let Some(mut rest) = path_to(children, id) {
                rest.insert(0, block.id.clone());
                return Some(rest);
            }
        }
    }
    None
}

/// Ancestors of the block named `id`, outermost first.
pub fn ancestors_of<'a>(blocks: &'a [Block], id: &str) -> Option<Vec<&'a Block>> {
    for block in blocks {
        if block.id == id {
            return Some(Vec::new());
        }
        for (_, children) in block.collections() {
            if let Some(mut rest) = ancestors_of(children, id) {
                rest.insert(0, block);
                return Some(rest);
            }
        }
    }
    None
}

/// Follows a path of ids where each id is a direct child of the previous one.
pub fn resolve_path<'a>(blocks: &'a [Block], path: &[String]) -> Option<&'a Block> {
    let (first, rest) = path.split_first()?;
    let mut current = blocks.iter().find(|block| &block.id == first)?;
    for id in rest {
        current = current.children().find(|child| &child.id == id)?;
    }
    Some(current)
}

pub fn resolve_path_mut<'a>(blocks: &'a mut [Block], path: &[String]) -> Option<&'a mut Block> {
    let (first, rest) = path.split_first()?;
    let mut current = blocks.iter_mut().find(|block| &block.id == first)?;
    for id in rest {
        current = current
            .collections_mut()
            .into_iter()
            .flat_map(|(_, children)| children.iter_mut())
            .find(|child| &child.id == id)?;
    }
    Some(current)
}

pub fn remove_block_by_id(blocks: &mut Vec<Block>, id: &str) -> Option<Block> {
    if let Some(index) = blocks.iter().position(|block| block.id == id) {
        return Some(blocks.remove(index));
    }
    for block in blocks.iter_mut() {
        if !contains_block(block, id) {
            continue;
        }
        for (_, children) in block.collections_mut() {
            if let Some(removed) = remove_block_by_id(children, id) {
                return Some(removed);
            }
        }
    }
    None
}

/// Inserts into `collection` of the container named `parent_id`, or into `blocks` itself
/// when no parent is given. `index` past the end appends.
pub fn insert_block(
    blocks: &mut Vec<Block>,
    parent_id: Option<&str>,
    collection: CollectionKind,
    index: Option<usize>,
    block: Block,
) -> Result<(), FlowError> {
    let target = match parent_id {
        None => blocks,
        Some(parent_id) => {
            let parent = find_block_by_id_mut(blocks, parent_id).ok_or_else(|| {
                FlowError::new(
                    "TREE_BLOCK_NOT_FOUND",
                    format!("Container \"{}\" not found.", parent_id),
                )
            })?;
            let parent_type = parent.type_name();
            parent.collection_mut(collection).ok_or_else(|| {
                FlowError::with_block(
                    "TREE_COLLECTION_INVALID",
                    format!("{} has no \"{}\" collection.", parent_type, collection),
                    parent_id,
                )
            })?
        }
    };
    let position = index.unwrap_or(target.len()).min(target.len());
    target.insert(position, block);
    Ok(())
}

#[cfg(test)]
mod traverse_tests {
    use super::*;
    use crate::block::{BlockKind, BuildBlock, FlightBlock, IfBlock, MissionBlock};
    use crate::tag::CommandTag;
    use crate::value::Parameters;

    fn say(id: &str) -> Block {
        let mut block = Block::command(CommandTag::Say, Parameters::new());
        block.id = id.to_string();
        block
    }

    fn tree() -> Vec<Block> {
        vec![Block::with_id(
            "mission",
            BlockKind::Mission(MissionBlock {
                mission_name: Some("m".to_string()),
                file_name: Some("m.txt".to_string()),
                blocks_mission: vec![Block::with_id(
                    "build",
                    BlockKind::Build(BuildBlock {
                        block_init: vec![say("init-say")],
                        block_start: vec![],
                    }),
                )],
                blocks_finish: vec![Block::with_id(
                    "flight",
                    BlockKind::Flight(FlightBlock {
                        block_init: vec![],
                        block_start: vec![],
                        block_evaluate: vec![Block::with_id(
                            "if",
                            BlockKind::If(IfBlock {
                                then_blocks: vec![say("then-say")],
                                else_blocks: Some(vec![say("else-say")]),
                                ..IfBlock::default()
                            }),
                        )],
                    }),
                )],
            }),
        )]
    }

    #[test]
    fn walk_reaches_hidden_collections_in_document_order() {
        let blocks = tree();
        let mut seen = Vec::new();
        walk(&blocks, &mut |visit| {
            seen.push((visit.block.id.clone(), visit.ancestors.len(), visit.collection));
        });
        let ids = seen.iter().map(|(id, _, _)| id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec!["mission", "build", "init-say", "flight", "if", "then-say", "else-say"]
        );
        assert_eq!(seen[6].1, 3);
        assert_eq!(seen[6].2, Some(CollectionKind::ElseBlocks));
    }

    #[test]
    fn counting_and_lookup_cover_every_collection() {
        let blocks = tree();
        assert_eq!(count_blocks(&blocks), 7);
        assert_eq!(count_blocks_by_type(&blocks).get("SAY"), Some(&3));
        assert!(find_block_by_id(&blocks, "else-say").is_some());
        assert!(find_block_by_id(&blocks, "missing").is_none());
        assert_eq!(collect_all_blocks(&blocks).len(), 7);
    }

    #[test]
    fn path_and_ancestors_agree() {
        let blocks = tree();
        let path = path_to(&blocks, "then-say").expect("path should exist");
        assert_eq!(path, vec!["mission", "flight", "if", "then-say"]);
        let ancestors = ancestors_of(&blocks, "then-say").expect("ancestors should exist");
        assert_eq!(
            ancestors.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            vec!["mission", "flight", "if"]
        );
        let resolved = resolve_path(&blocks, &path).expect("path should resolve");
        assert_eq!(resolved.id, "then-say");
        assert!(resolve_path(&blocks, &["flight".to_string()]).is_none());
    }

    #[test]
    fn mutation_helpers_edit_nested_collections() {
        let mut blocks = tree();
        insert_block(
            &mut blocks,
            Some("build"),
            CollectionKind::BlockStart,
            None,
            say("start-say"),
        )
        .expect("insert should pass");
        assert!(find_block_by_id(&blocks, "start-say").is_some());

        let removed = remove_block_by_id(&mut blocks, "else-say").expect("remove should pass");
        assert_eq!(removed.id, "else-say");
        assert_eq!(count_blocks(&blocks), 7);

        let found = find_block_by_id_mut(&mut blocks, "then-say").expect("block");
        found.id = "renamed".to_string();
        assert!(find_block_by_id(&blocks, "renamed").is_some());
    }

    #[test]
    fn insert_block_rejects_collection_the_parent_does_not_own() {
        let mut blocks = tree();
        let error = insert_block(
            &mut blocks,
            Some("build"),
            CollectionKind::BlockEvaluate,
            Some(0),
            say("x"),
        )
        .expect_err("BUILD has no blockEvaluate");
        assert_eq!(error.code, "TREE_COLLECTION_INVALID");

        let error = insert_block(&mut blocks, Some("nope"), CollectionKind::Children, None, say("y"))
            .expect_err("missing parent");
        assert_eq!(error.code, "TREE_BLOCK_NOT_FOUND");
    }
}
