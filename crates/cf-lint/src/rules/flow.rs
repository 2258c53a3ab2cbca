use cf_core::{BlockKind, CommandTag};

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;

pub(super) fn check_go_label(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if !block.is_tag(CommandTag::Go) {
        return;
    }
    // A missing label is a parameter problem, reported elsewhere.
    let Some(label) = block.string_param("label") else {
        return;
    };
    if !ctx.facts.has_label(label) {
        out.push(Diagnostic::error(
            block,
            "GO_WITHOUT_LABEL",
            format!("GO points to label \"{}\" but no LABEL with that name exists.", label),
        ));
    }
}

pub(super) fn check_unknown_command(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if let BlockKind::Unknown(unknown) = &block.kind {
        out.push(Diagnostic::warning(
            block,
            "UNKNOWN_COMMAND",
            format!(
                "\"{}\" is not a known command. It is kept as written but cannot be edited.",
                unknown.name
            ),
        ));
    }
}

pub(super) fn check_if_then(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if let BlockKind::If(branch) = &block.kind {
        if branch.then_blocks.is_empty() {
            out.push(Diagnostic::error(
                block,
                "IF_EMPTY_THEN",
                "IF block cannot have an empty THEN branch. Add at least one block to the THEN branch.",
            ));
        }
    }
}
