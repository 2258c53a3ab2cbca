use cf_core::CommandTag;

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;

pub(super) fn check_build_only(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let code = match ctx.block().tag() {
        Some(CommandTag::AddPartToShip) => "addPartToShipNotInBuild",
        Some(CommandTag::AddPartToAsideSlot) => "addPartToAsideSlotNotInBuild",
        Some(CommandTag::AddShipParts) => "addShipPartsNotInBuild",
        Some(CommandTag::SetAdvPile) => "setAdvPileNotInBuild",
        Some(CommandTag::SetSecretAdvPile) => "setSecretAdvPileNotInBuild",
        _ => return,
    };
    if !ctx.visit.has_ancestor(&["BUILD"]) {
        out.push(Diagnostic::warning(
            ctx.block(),
            code,
            format!(
                "{} should be inside a BUILD block. Consider moving this block inside a build phase.",
                ctx.block().type_name()
            ),
        ));
    }
}

pub(super) fn check_phase_only(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let Some(tag) = ctx.block().tag() else {
        return;
    };
    let phase_only = matches!(
        tag,
        CommandTag::SetDeckPreparationScript
            | CommandTag::SetFlightDeckPreparationScript
            | CommandTag::SetSpecCondition
            | CommandTag::SetTurnBased
            | CommandTag::SetMissionAsFailed
            | CommandTag::SetMissionAsCompleted
            | CommandTag::AllShipsGiveUp
            | CommandTag::GiveUpFlight
            | CommandTag::ModifyOpponentsBuildSpeed
    );
    if phase_only && !ctx.visit.has_ancestor(&["MISSION", "BUILD", "FLIGHT"]) {
        out.push(Diagnostic::warning(
            ctx.block(),
            format!("{}_OUTSIDE_CONTEXT", tag),
            format!("{} should be inside a MISSION, BUILD or FLIGHT block.", tag),
        ));
    }
}

pub(super) fn check_mission_only(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let code = match ctx.block().tag() {
        Some(CommandTag::AddOpponent) => "ADDOPPONENT_NOT_IN_MISSION",
        Some(CommandTag::SetShipType) => "SETSHIPTYPE_NOT_IN_MISSION",
        Some(CommandTag::FinishMission) => "finishMissionNotInMission",
        _ => return,
    };
    if !ctx.visit.has_ancestor(&["MISSION"]) {
        out.push(Diagnostic::warning(
            ctx.block(),
            code,
            format!(
                "{} should be inside a MISSION block. Consider moving this block inside a mission.",
                ctx.block().type_name()
            ),
        ));
    }
}
