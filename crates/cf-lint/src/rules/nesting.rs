use cf_core::Block;

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;

pub(crate) fn is_phase(type_name: &str) -> bool {
    matches!(type_name, "BUILD" | "FLIGHT")
}

/// A BUILD or FLIGHT may not sit anywhere below another BUILD or FLIGHT.
pub(super) fn check_phase_nesting(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if !is_phase(block.type_name()) {
        return;
    }
    let outer = ctx
        .visit
        .ancestors
        .iter()
        .rev()
        .find(|ancestor| is_phase(ancestor.type_name()));
    if let Some(outer) = outer {
        out.push(nesting_error(block, outer));
    }
}

fn nesting_error(inner: &Block, outer: &Block) -> Diagnostic {
    Diagnostic::error(
        inner,
        format!("{}_CONTAINS_{}", outer.type_name(), inner.type_name()),
        format!(
            "A {} block cannot contain a {} block.",
            outer.type_name(),
            inner.type_name()
        ),
    )
    .related_to(outer)
}
