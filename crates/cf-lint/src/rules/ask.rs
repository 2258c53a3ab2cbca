use cf_core::{Block, BlockKind, CollectionKind, CommandTag};

use crate::context::{RuleContext, TreeFacts};
use crate::diagnostic::Diagnostic;

pub(super) fn check_consecutive_ask(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if !block.is_tag(CommandTag::Ask) {
        return;
    }
    if let Some(previous) = ctx.visit.previous().filter(|b| b.is_tag(CommandTag::Ask)) {
        out.push(
            Diagnostic::error(
                block,
                "CONSECUTIVE_ASK",
                "Two ASK blocks cannot follow each other. Add a MENU or another block between them.",
            )
            .related_to(previous),
        );
    }
}

pub(super) fn check_ask_followed_by_menu(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if !block.is_tag(CommandTag::Ask) {
        return;
    }
    let next = ctx.visit.next();
    let accepted = match next {
        Some(next) => leads_to_menu(next, ctx.facts),
        // Last in an IF branch: whatever follows the IF answers the question.
        None => ctx
            .visit
            .parent()
            .filter(|parent| parent.type_name() == "IF")
            .and_then(|parent| sibling_after(ctx.tree, &parent.id))
            .is_some_and(opens_menu),
    };
    if accepted {
        return;
    }
    let diagnostic = match next {
        Some(next) => Diagnostic::warning(
            block,
            "ASK_NOT_FOLLOWED_BY_MENU",
            format!(
                "ASK block must be followed by a MENU, LABEL, or GO to a LABEL with MENU. Current next block is {}.",
                next.type_name()
            ),
        )
        .related_to(next),
        None => Diagnostic::warning(
            block,
            "ASK_WITHOUT_MENU",
            "ASK block must be followed by a MENU or LABEL block. This ASK is the last block.",
        ),
    };
    out.push(diagnostic);
}

/// An IF that answers an ASK must open each authored branch with a MENU or a GO.
pub(super) fn check_ask_if_branches(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if !block.is_tag(CommandTag::Ask) {
        return;
    }
    let Some(next) = ctx.visit.next() else {
        return;
    };
    let BlockKind::If(branch) = &next.kind else {
        return;
    };
    let answers = |first: &Block| first.type_name() == "MENU" || first.is_tag(CommandTag::Go);
    let failing = [
        ("ASK_IF_INVALID_THEN", "THEN", branch.then_blocks.first()),
        (
            "ASK_IF_INVALID_ELSE",
            "ELSE",
            branch.else_blocks.as_deref().and_then(<[Block]>::first),
        ),
    ]
    .into_iter()
    .find_map(|(code, label, first)| {
        first
            .filter(|first| !answers(*first))
            .map(|first| (code, label, first))
    });
    if let Some((code, label, first)) = failing {
        out.push(
            Diagnostic::warning(
                block,
                code,
                format!(
                    "The IF after this ASK must start its {} branch with a MENU or GO, not {}.",
                    label,
                    first.type_name()
                ),
            )
            .related_to(first),
        );
    }
}

pub(super) fn check_menu_preceded_by_ask(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if block.type_name() != "MENU" {
        return;
    }
    let previous = ctx.visit.previous().or_else(|| {
        ctx.visit
            .parent()
            .filter(|parent| parent.type_name() == "IF")
            .and_then(|parent| sibling_before(ctx.tree, &parent.id))
    });
    if previous.is_some_and(|previous| ends_with_ask(previous, ctx.facts)) {
        return;
    }
    let message = match previous {
        None => "The MENU is the first block in its sequence. It must be preceded by at least one ASK block.".to_string(),
        Some(previous) if previous.type_name() == "IF" => {
            "The MENU follows an IF block whose branches do not all end with ASK.".to_string()
        }
        Some(previous) if previous.type_name() == "MENU" => {
            "The MENU follows another MENU. Insert an ASK between the two MENUs.".to_string()
        }
        Some(previous) => format!(
            "The MENU follows a {} block that doesn't end with ASK. Insert an ASK before the MENU.",
            previous.type_name()
        ),
    };
    let mut diagnostic = Diagnostic::warning(block, "MENU_WITHOUT_ASK", message);
    if let Some(previous) = previous {
        diagnostic = diagnostic.related_to(previous);
    }
    out.push(diagnostic);
}

fn opens_menu(block: &Block) -> bool {
    matches!(block.type_name(), "MENU" | "LABEL")
}

fn leads_to_menu(next: &Block, facts: &TreeFacts) -> bool {
    if opens_menu(next) {
        return true;
    }
    match &next.kind {
        BlockKind::Command(_) if next.is_tag(CommandTag::Go) => next
            .string_param("label")
            .and_then(|label| facts.label(label))
            .is_some_and(|label| label.followed_by_menu),
        BlockKind::If(branch) => {
            let then_opens = branch.then_blocks.first().is_some_and(opens_menu);
            let else_opens = match branch.else_blocks.as_deref() {
                None | Some([]) => true,
                Some([first, ..]) => opens_menu(first),
            };
            then_opens && else_opens
        }
        _ => false,
    }
}

/// Whether the question last asked before leaving `block` is still waiting for a MENU.
fn ends_with_ask(block: &Block, facts: &TreeFacts) -> bool {
    match &block.kind {
        BlockKind::If(branch) => {
            let then_asks = branch
                .then_blocks
                .last()
                .is_some_and(|last| ends_with_ask(last, facts));
            let else_asks = match branch.else_blocks.as_deref() {
                None | Some([]) => true,
                Some([.., last]) => ends_with_ask(last, facts),
            };
            then_asks && else_asks
        }
        BlockKind::Menu(menu) => {
            let mut options = menu
                .children
                .iter()
                .filter(|child| child.type_name() == "OPT")
                .peekable();
            options.peek().is_some()
                && options.all(|opt| {
                    opt.collection(CollectionKind::Children)
                        .and_then(|children| children.last())
                        .is_some_and(|last| ends_with_ask(last, facts))
                })
        }
        BlockKind::Command(_) => match block.tag() {
            Some(CommandTag::Ask) => true,
            Some(CommandTag::Label) => label_preceded_by_ask(block, "name", facts),
            Some(CommandTag::Go) => label_preceded_by_ask(block, "label", facts),
            _ => false,
        },
        _ => false,
    }
}

fn label_preceded_by_ask(block: &Block, key: &str, facts: &TreeFacts) -> bool {
    block
        .string_param(key)
        .and_then(|name| facts.label(name))
        .is_some_and(|label| label.preceded_by_ask)
}

fn sibling_after<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    sibling_at(blocks, id, |index| index.checked_add(1))
}

fn sibling_before<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    sibling_at(blocks, id, |index| index.checked_sub(1))
}

fn sibling_at<'a>(
    blocks: &'a [Block],
    id: &str,
    step: fn(usize) -> Option<usize>,
) -> Option<&'a Block> {
    if let Some(index) = blocks.iter().position(|block| block.id == id) {
        return step(index).and_then(|at| blocks.get(at));
    }
    blocks
        .iter()
        .flat_map(|block| block.collections())
        .find_map(|(_, children)| sibling_at(children, id, step))
}
