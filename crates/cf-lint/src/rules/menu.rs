use cf_core::{BlockKind, CommandTag, DEFAULT_OPT_TYPE};

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;

pub(super) fn check_menu_options(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    let BlockKind::Menu(menu) = &block.kind else {
        return;
    };
    let options = menu
        .children
        .iter()
        .filter_map(|child| match &child.kind {
            BlockKind::Opt(opt) => Some(opt),
            _ => None,
        })
        .collect::<Vec<_>>();
    if options.is_empty() {
        out.push(Diagnostic::error(
            block,
            "MENU_WITHOUT_OPT",
            "MENU block cannot be empty. Add at least one OPT block to the MENU.",
        ));
    } else if !options
        .iter()
        .any(|opt| opt.opt_type.is_empty() || opt.opt_type == DEFAULT_OPT_TYPE)
    {
        out.push(Diagnostic::error(
            block,
            "MENU_NO_SIMPLE_OPT",
            "MENU block must contain at least one simple OPT block (without conditions).",
        ));
    }
}

pub(super) fn check_menu_child(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    let in_menu = ctx
        .visit
        .parent()
        .is_some_and(|parent| parent.type_name() == "MENU");
    if in_menu && block.type_name() != "OPT" {
        out.push(Diagnostic::error(
            block,
            "NON_OPT_IN_MENU",
            format!(
                "The {} block cannot be inserted in a MENU. Only OPT blocks are allowed.",
                block.type_name()
            ),
        ));
    }
}

pub(super) fn check_opt_parent(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if block.type_name() != "OPT" {
        return;
    }
    let in_menu = ctx
        .visit
        .parent()
        .is_some_and(|parent| parent.type_name() == "MENU");
    if !in_menu {
        out.push(Diagnostic::error(
            block,
            "OPT_OUTSIDE_MENU",
            "The OPT block can only be inserted inside a MENU block.",
        ));
    }
}

pub(super) fn check_exit_menu(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if block.is_tag(CommandTag::ExitMenu) && !ctx.visit.has_ancestor(&["OPT"]) {
        out.push(Diagnostic::error(
            block,
            "EXIT_MENU_OUTSIDE_OPT",
            "The EXIT_MENU block can only be inserted inside an OPT block.",
        ));
    }
}
