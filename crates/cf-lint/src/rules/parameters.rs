use cf_core::{BlockKind, CommandTag, ParamValue, PRIMARY_LANGUAGE};

use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;

#[derive(Debug, Clone, Copy)]
enum Check {
    /// Any non-blank value.
    Present,
    /// A plain string, or a language map with a non-empty primary entry.
    Text,
    Number,
    Positive,
    NonNegative,
    Range(f64, f64),
    IntegerRange(i64, i64),
}

#[derive(Debug, Clone, Copy)]
struct Requirement {
    key: &'static str,
    check: Check,
    /// Overrides the derived `<TAG>_NO_<KEY>` code.
    code: Option<&'static str>,
}

const fn req(key: &'static str, check: Check) -> Requirement {
    Requirement {
        key,
        check,
        code: None,
    }
}

const fn coded(key: &'static str, check: Check, code: &'static str) -> Requirement {
    Requirement {
        key,
        check,
        code: Some(code),
    }
}

const TEXT: &[Requirement] = &[req("text", Check::Text)];
const CHARACTER: &[Requirement] = &[req("character", Check::Present)];
const CHARACTER_TEXT: &[Requirement] = &[req("character", Check::Present), req("text", Check::Text)];
const CHARACTER_IMAGE: &[Requirement] = &[req("character", Check::Present), req("image", Check::Present)];
const SEMAPHORE: &[Requirement] = &[req("semaphore", Check::Present)];
const VARIABLE: &[Requirement] = &[req("variable", Check::Present)];
const VARIABLE_VALUE: &[Requirement] = &[req("variable", Check::Present), req("value", Check::Number)];
const ROUTE: &[Requirement] = &[req("route", Check::Present)];
const NODE: &[Requirement] = &[req("node", Check::Present)];
const BUTTON: &[Requirement] = &[req("button", Check::Present)];
const IMAGE: &[Requirement] = &[req("image", Check::Present)];
const PARAMS: &[Requirement] = &[req("params", Check::Present)];
const SCRIPT: &[Requirement] = &[req("script", Check::Present)];
const HELP_SCRIPT: &[Requirement] = &[coded("script", Check::Present, "HELPSCRIPT_PARAMS_INVALID")];
const AMOUNT: &[Requirement] = &[req("amount", Check::Number)];
const ACHIEVEMENT: &[Requirement] = &[req("achievement", Check::Present)];
const ACHIEVEMENT_VALUE: &[Requirement] = &[
    req("achievement", Check::Present),
    req("value", Check::Number),
];
const SHOW_CHARACTER: &[Requirement] = &[
    req("character", Check::Present),
    req("position", Check::Present),
];
const LABEL: &[Requirement] = &[req("name", Check::Present)];
const GO: &[Requirement] = &[req("label", Check::Present)];
const SUB_SCRIPT: &[Requirement] = &[coded("script", Check::Present, "SUB_SCRIPT_NO_NAME")];
const DELAY: &[Requirement] = &[req("duration", Check::Positive)];
const NODE_PAIR: &[Requirement] = &[
    coded("node1", Check::Present, "HIDEALLPATHS_NO_NODES"),
    coded("node2", Check::Present, "HIDEALLPATHS_NO_NODES"),
];
const FOCUS_IF_CREDITS: &[Requirement] = &[
    req("button", Check::Present),
    coded("credits", Check::NonNegative, "SETFOCUSIFCREDITS_INVALID_CREDITS"),
];
const BUILDING_HELP_SCRIPT: &[Requirement] = &[
    coded("value", Check::NonNegative, "BUILDINGHELPSCRIPT_PARAMS_INVALID"),
    coded("script", Check::Present, "BUILDINGHELPSCRIPT_PARAMS_INVALID"),
];
const MISSION: &[Requirement] = &[req("mission", Check::Present)];
const SHIP_TYPE: &[Requirement] = &[req("type", Check::Present)];
const CONDITION: &[Requirement] = &[req("condition", Check::Present)];
const BUILD_SPEED: &[Requirement] = &[
    req("percentage", Check::Number),
    coded(
        "percentage",
        Check::Range(1.0, 200.0),
        "MODIFYOPPONENTSBUILDSPEED_OUT_OF_RANGE",
    ),
];
const OPPONENT_CREDITS: &[Requirement] = &[
    coded(
        "index",
        Check::IntegerRange(0, 3),
        "ADDOPPONENTSCREDITS_INVALID_INDEX",
    ),
    req("credits", Check::Number),
];
const SHIP_PLAN: &[Requirement] = &[req("plan", Check::Present)];

fn requirements(tag: CommandTag) -> &'static [Requirement] {
    use CommandTag as T;
    match tag {
        T::Say | T::Ask | T::Announce | T::SetFlightStatusBar => TEXT,
        T::SayChar | T::AskChar => CHARACTER_TEXT,
        T::FocusChar | T::HideChar | T::ShowCharacter | T::HideCharacter | T::AddOpponent => {
            CHARACTER
        }
        T::ShowChar => SHOW_CHARACTER,
        T::ChangeChar | T::ChangeCharacter => CHARACTER_IMAGE,
        T::Set | T::Reset => SEMAPHORE,
        T::SetTo | T::Add => VARIABLE_VALUE,
        T::SetVariable | T::ResetVariable => VARIABLE,
        T::Label => LABEL,
        T::Go => GO,
        T::SubScript => SUB_SCRIPT,
        T::Delay => DELAY,
        T::ShowPath | T::HidePath | T::CenterMapByPath => ROUTE,
        T::HideAllPaths => NODE_PAIR,
        T::ShowNode
        | T::HideNode
        | T::AddNode
        | T::SetNodeKnown
        | T::CenterMapByNode
        | T::MovePlayerToNode => NODE,
        T::ShowButton | T::HideButton | T::SetFocus | T::ResetFocus => BUTTON,
        T::SetFocusIfCredits => FOCUS_IF_CREDITS,
        T::AddInfoWindow | T::ShowInfoWindow => IMAGE,
        T::BuildingHelpScript => BUILDING_HELP_SCRIPT,
        T::FlightHelpScript | T::AlienHelpScript => HELP_SCRIPT,
        T::ActMission => MISSION,
        T::SetShipType => SHIP_TYPE,
        T::ShowHelpImage
        | T::AddPartToShip
        | T::AddPartToAsideSlot
        | T::AddShipParts
        | T::SetAdvPile
        | T::SetSecretAdvPile
        | T::DeckAddCardType
        | T::DeckAddCardRound
        | T::DeckAddRulePosition
        | T::DeckAddRuleRange
        | T::SetSuperCardsCnt => PARAMS,
        T::SetDeckPreparationScript | T::SetFlightDeckPreparationScript => SCRIPT,
        T::SetSpecCondition => CONDITION,
        T::ModifyOpponentsBuildSpeed => BUILD_SPEED,
        T::AddOpponentsCredits => OPPONENT_CREDITS,
        T::AddCredits | T::SetCredits | T::AddMissionCredits => AMOUNT,
        T::SetAchievementProgress | T::SetAchievementAttempt => ACHIEVEMENT_VALUE,
        T::UnlockAchievement => ACHIEVEMENT,
        T::UnlockShipPlan => SHIP_PLAN,
        _ => &[],
    }
}

fn satisfies(value: Option<&ParamValue>, check: Check) -> bool {
    let Some(value) = value else {
        return false;
    };
    let number = || value.to_number();
    match check {
        Check::Present => !value.is_blank(),
        Check::Text => value
            .localized(PRIMARY_LANGUAGE)
            .is_some_and(|text| !text.trim().is_empty()),
        Check::Number => number().is_some(),
        Check::Positive => number().is_some_and(|n| n > 0.0),
        Check::NonNegative => number().is_some_and(|n| n >= 0.0),
        Check::Range(min, max) => number().is_some_and(|n| (min..=max).contains(&n)),
        Check::IntegerRange(min, max) => number().is_some_and(|n| {
            n.fract() == 0.0 && (min as f64..=max as f64).contains(&n)
        }),
    }
}

fn message(tag: CommandTag, requirement: &Requirement) -> String {
    match (tag, requirement.check) {
        (CommandTag::BuildingHelpScript, _) => {
            "BUILDINGHELPSCRIPT requires a numeric value (>= 0) and a script.".to_string()
        }
        (CommandTag::FlightHelpScript | CommandTag::AlienHelpScript, _) => {
            "This command requires the script parameter.".to_string()
        }
        (CommandTag::SetAdvPile | CommandTag::SetSecretAdvPile, _) => format!(
            "{} block must have parameters. Provide the two-int string, unquoted.",
            tag
        ),
        (_, Check::Text) => format!(
            "{} block must have text in {}.",
            tag, PRIMARY_LANGUAGE
        ),
        (_, Check::Positive) => format!(
            "{} block requires \"{}\" greater than 0.",
            tag, requirement.key
        ),
        (_, Check::NonNegative) => format!(
            "{} block requires a numeric \"{}\" (>= 0).",
            tag, requirement.key
        ),
        (_, Check::Range(min, max)) => format!(
            "{} \"{}\" must be between {} and {}.",
            tag, requirement.key, min, max
        ),
        (_, Check::IntegerRange(min, max)) => format!(
            "{} \"{}\" must be an integer between {} and {}.",
            tag, requirement.key, min, max
        ),
        (_, Check::Number) => format!(
            "{} block requires a numeric \"{}\".",
            tag, requirement.key
        ),
        (_, Check::Present) => format!(
            "{} block requires the \"{}\" parameter.",
            tag, requirement.key
        ),
    }
}

/// Reports the first unmet requirement of a command block.
pub(super) fn check_required(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    let (Some(tag), Some(parameters)) = (block.tag(), block.parameters()) else {
        return;
    };
    let failed = requirements(tag)
        .iter()
        .find(|requirement| !satisfies(parameters.get(requirement.key), requirement.check));
    if let Some(requirement) = failed {
        out.push(Diagnostic::error(
            block,
            error_code(tag, requirement),
            message(tag, requirement),
        ));
    }
}

fn error_code(tag: CommandTag, requirement: &Requirement) -> String {
    match requirement.code {
        Some(code) => code.to_string(),
        None => format!("{}_NO_{}", tag, requirement.key.to_ascii_uppercase()),
    }
}

pub(super) fn check_opt_text(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let block = ctx.block();
    if let BlockKind::Opt(opt) = &block.kind {
        let has_text = opt
            .text
            .get(PRIMARY_LANGUAGE)
            .is_some_and(|text| !text.trim().is_empty());
        if !has_text {
            out.push(Diagnostic::error(
                block,
                "OPT_NO_TEXT",
                format!("OPT block must have text in {}.", PRIMARY_LANGUAGE),
            ));
        }
    }
}

#[cfg(test)]
mod parameters_tests {
    use super::*;

    #[test]
    fn derived_codes_follow_tag_and_key() {
        assert_eq!(error_code(CommandTag::Say, &TEXT[0]), "SAY_NO_TEXT");
        assert_eq!(
            error_code(CommandTag::SubScript, &requirements(CommandTag::SubScript)[0]),
            "SUB_SCRIPT_NO_NAME"
        );
        assert_eq!(
            error_code(CommandTag::SetAdvPile, &PARAMS[0]),
            "SETADVPILE_NO_PARAMS"
        );
    }

    #[test]
    fn numeric_checks_accept_numeric_strings() {
        let five = ParamValue::from("5");
        assert!(satisfies(Some(&five), Check::Positive));
        assert!(satisfies(Some(&five), Check::IntegerRange(0, 5)));
        assert!(!satisfies(Some(&ParamValue::from("2.5")), Check::IntegerRange(0, 3)));
        assert!(!satisfies(Some(&ParamValue::Number(0.0)), Check::Positive));
        assert!(!satisfies(Some(&ParamValue::Number(201.0)), Check::Range(1.0, 200.0)));
        assert!(!satisfies(None, Check::NonNegative));
    }

    #[test]
    fn text_check_wants_the_primary_language() {
        let only_german = ParamValue::Map(
            [("DE".to_string(), ParamValue::from("Hallo"))]
                .into_iter()
                .collect(),
        );
        assert!(!satisfies(Some(&only_german), Check::Text));
        assert!(satisfies(Some(&ParamValue::from("Hello")), Check::Text));
        assert!(!satisfies(Some(&ParamValue::from("  ")), Check::Text));
    }
}
