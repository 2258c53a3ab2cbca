use cf_core::{ancestors_of, Block, CollectionKind, CommandTag};

use crate::context::TreeFacts;
use crate::diagnostic::Diagnostic;
use crate::rules::is_phase;

/// Where a new block would land. No container means the top-level sequence of the tree.
#[derive(Debug, Clone, Copy)]
pub struct InsertionPoint<'a> {
    pub container: Option<&'a Block>,
    pub collection: CollectionKind,
    /// `None` appends.
    pub index: Option<usize>,
}

impl<'a> InsertionPoint<'a> {
    pub fn top_level(index: Option<usize>) -> Self {
        Self {
            container: None,
            collection: CollectionKind::Children,
            index,
        }
    }

    pub fn inside(container: &'a Block, collection: CollectionKind, index: Option<usize>) -> Self {
        Self {
            container: Some(container),
            collection,
            index,
        }
    }
}

/// Refuses an insert the structure rules would reject afterwards.
pub fn can_insert(
    candidate: &Block,
    point: &InsertionPoint<'_>,
    tree: &[Block],
) -> Result<(), Diagnostic> {
    let sequence: &[Block] = match point.container {
        None => tree,
        Some(container) => container
            .collection(point.collection)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                Diagnostic::error(
                    container,
                    "INVALID_COLLECTION",
                    format!(
                        "{} has no \"{}\" collection.",
                        container.type_name(),
                        point.collection
                    ),
                )
            })?,
    };
    let container_type = point.container.map(Block::type_name);
    let candidate_type = candidate.type_name();

    if container_type == Some("MENU") && candidate_type != "OPT" {
        return Err(Diagnostic::error(
            candidate,
            "NON_OPT_IN_MENU",
            format!(
                "The {} block cannot be inserted in a MENU. Only OPT blocks are allowed.",
                candidate_type
            ),
        ));
    }
    if candidate_type == "OPT" && container_type != Some("MENU") {
        return Err(Diagnostic::error(
            candidate,
            "OPT_OUTSIDE_MENU",
            "The OPT block can only be inserted inside a MENU block.",
        ));
    }
    if candidate.is_tag(CommandTag::ExitMenu) && container_type != Some("OPT") {
        return Err(Diagnostic::error(
            candidate,
            "EXIT_MENU_OUTSIDE_OPT",
            "The EXIT_MENU block can only be inserted inside an OPT block.",
        ));
    }
    if is_phase(candidate_type) {
        if let Some(outer) = point.container.and_then(|container| enclosing_phase(container, tree)) {
            return Err(Diagnostic::error(
                candidate,
                format!("{}_CONTAINS_{}", outer.type_name(), candidate_type),
                format!(
                    "A {} block cannot contain a {} block.",
                    outer.type_name(),
                    candidate_type
                ),
            )
            .related_to(outer));
        }
    }
    if candidate.is_tag(CommandTag::Ask) {
        let index = point.index.unwrap_or(sequence.len()).min(sequence.len());
        let previous = index.checked_sub(1).and_then(|at| sequence.get(at));
        let neighbour = previous
            .into_iter()
            .chain(sequence.get(index))
            .find(|block| block.is_tag(CommandTag::Ask));
        if let Some(neighbour) = neighbour {
            return Err(Diagnostic::error(
                candidate,
                "CONSECUTIVE_ASK",
                "Two ASK blocks cannot follow each other. Add a MENU or another block between them.",
            )
            .related_to(neighbour));
        }
    }
    if candidate.is_tag(CommandTag::Go) && TreeFacts::collect(tree).label_names().next().is_none() {
        return Err(Diagnostic::error(
            candidate,
            "GO_WITHOUT_LABEL",
            "Add a LABEL block before inserting a GO.",
        ));
    }
    Ok(())
}

/// The container itself when it is a phase, else its nearest phase ancestor.
fn enclosing_phase<'a>(container: &'a Block, tree: &'a [Block]) -> Option<&'a Block> {
    if is_phase(container.type_name()) {
        return Some(container);
    }
    ancestors_of(tree, &container.id)?
        .into_iter()
        .rev()
        .find(|ancestor| is_phase(ancestor.type_name()))
}
