use cf_core::CommandTag;

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;

pub(super) fn check_dialog_scene(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    let code = match block.tag() {
        Some(CommandTag::Say | CommandTag::Ask) => "DIALOG_OUTSIDE_SCENE",
        Some(
            CommandTag::ShowChar
            | CommandTag::HideChar
            | CommandTag::ChangeChar
            | CommandTag::SayChar
            | CommandTag::AskChar
            | CommandTag::FocusChar,
        ) => "CHARACTER_OUTSIDE_SCENE",
        _ => return,
    };
    if ctx.open_scenes() == 0 {
        out.push(Diagnostic::warning(
            block,
            code,
            format!(
                "{} is used without an open dialog scene. Add a SHOWDLGSCENE before it.",
                block.type_name()
            ),
        ));
    }
}

pub(super) fn check_hide_scene(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if block.is_tag(CommandTag::HideDlgScene) && ctx.open_scenes() == 0 {
        out.push(Diagnostic::warning(
            block,
            "HIDE_SCENE_WITHOUT_SHOW",
            "HIDEDLGSCENE closes a dialog scene that was never opened.",
        ));
    }
}

pub(super) fn check_visible_cast(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    let code = match block.tag() {
        Some(CommandTag::HideChar) => "HIDECHAR_NO_VISIBLE_CHARACTERS",
        Some(CommandTag::ChangeChar) => "CHANGECHAR_NO_VISIBLE_CHARACTERS",
        _ => return,
    };
    if ctx.open_scenes() > 0 && ctx.visible_characters() == 0 {
        out.push(Diagnostic::warning(
            block,
            code,
            format!(
                "{} runs in a dialog scene with no visible character. Show one with SHOWCHAR first.",
                block.type_name()
            ),
        ));
    }
}
