mod ask;
mod flow;
mod menu;
mod nesting;
mod parameters;
mod placement;
mod scene;

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;
use crate::engine::{RuleCategory, ValidationRule};

pub(crate) use nesting::is_phase;

type CheckFn = fn(&RuleContext<'_>, &mut Vec<Diagnostic>);

struct FnRule {
    name: &'static str,
    category: RuleCategory,
    check: CheckFn,
}

impl ValidationRule for FnRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> RuleCategory {
        self.category
    }

    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
        (self.check)(ctx, out)
    }
}

const RULES: &[(&str, RuleCategory, CheckFn)] = &[
    ("required-parameters", RuleCategory::Parameters, parameters::check_required),
    ("opt-text", RuleCategory::Parameters, parameters::check_opt_text),
    ("build-only", RuleCategory::Context, placement::check_build_only),
    ("phase-only", RuleCategory::Context, placement::check_phase_only),
    ("mission-only", RuleCategory::Context, placement::check_mission_only),
    ("scene-cast", RuleCategory::Context, scene::check_visible_cast),
    ("ask-if-branches", RuleCategory::Context, ask::check_ask_if_branches),
    ("menu-options", RuleCategory::Structure, menu::check_menu_options),
    ("menu-children", RuleCategory::Structure, menu::check_menu_child),
    ("opt-parent", RuleCategory::Structure, menu::check_opt_parent),
    ("exit-menu-parent", RuleCategory::Structure, menu::check_exit_menu),
    ("consecutive-ask", RuleCategory::Structure, ask::check_consecutive_ask),
    ("ask-before-menu", RuleCategory::Structure, ask::check_ask_followed_by_menu),
    ("menu-after-ask", RuleCategory::Structure, ask::check_menu_preceded_by_ask),
    ("go-label", RuleCategory::Structure, flow::check_go_label),
    ("if-then", RuleCategory::Structure, flow::check_if_then),
    ("dialog-scene", RuleCategory::Structure, scene::check_dialog_scene),
    ("hide-scene", RuleCategory::Structure, scene::check_hide_scene),
    ("phase-nesting", RuleCategory::Structure, nesting::check_phase_nesting),
    ("unknown-command", RuleCategory::Structure, flow::check_unknown_command),
];

/// The built-in rule table, in the order rules report.
pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    RULES
        .iter()
        .map(|&(name, category, check)| {
            Box::new(FnRule {
                name,
                category,
                check,
            }) as Box<dyn ValidationRule>
        })
        .collect()
}
