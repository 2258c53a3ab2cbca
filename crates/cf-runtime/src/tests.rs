use cf_core::{
    Block, BlockKind, BuildBlock, CommandTag, IfBlock, MenuBlock, OptBlock, ParamValue,
    Parameters,
};

use super::*;

fn cmd(id: &str, tag: CommandTag, entries: &[(&str, &str)]) -> Block {
    let parameters = entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), ParamValue::from(*value)))
        .collect::<Parameters>();
    let mut block = Block::command(tag, parameters);
    block.id = id.to_string();
    block
}

fn show(id: &str, name: &str) -> Block {
    cmd(id, CommandTag::ShowCharacter, &[("character", name)])
}

fn hide(id: &str, name: &str) -> Block {
    cmd(id, CommandTag::HideCharacter, &[("character", name)])
}

fn ask(id: &str) -> Block {
    cmd(id, CommandTag::Ask, &[])
}

fn roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("A", vec!["a.png".to_string(), "a_angry.png".to_string()]),
        RosterEntry::new("B", vec!["b.png".to_string()]),
    ]
}

fn branch_tree() -> Vec<Block> {
    vec![
        show("s1", "A"),
        Block::with_id(
            "if1",
            BlockKind::If(IfBlock {
                then_blocks: vec![show("t1", "B"), ask("t2"), hide("t3", "A")],
                else_blocks: Some(vec![hide("e1", "A")]),
                ..IfBlock::default()
            }),
        ),
        hide("after", "A"),
    ]
}

#[test]
fn show_then_hide_leaves_character_hidden() {
    let roster = vec![RosterEntry::new("A", vec!["a.png".to_string()])];
    let blocks = vec![show("1", "A"), hide("2", "A")];
    let state = simulate(&blocks, "", &roster);
    assert!(!state.character("A").expect("A").is_visible);
    assert!(!state.target_reached);
}

#[test]
fn walk_stops_before_the_target_block() {
    let blocks = vec![show("1", "A"), hide("2", "A")];
    let state = simulate(&blocks, "2", &roster());
    assert!(state.target_reached);
    assert!(state.character("A").expect("A").is_visible);
    assert_eq!(
        state.current_speaking_character().map(|c| c.name.as_str()),
        Some("A")
    );
}

#[test]
fn unrecognized_script_lines_have_no_effect() {
    let mut unknown = Block::unknown("PlaySound", "boom.wav");
    unknown.id = "u".to_string();
    let blocks = vec![show("1", "A"), unknown, hide("2", "B"), ask("3")];
    for walk in [WalkMode::TopLevel, WalkMode::BranchAware] {
        let options = SimulationOptions { walk: Some(walk) };
        let state = simulate_with(&blocks, "3", &roster(), &options);
        assert!(state.target_reached);
        assert!(state.character("A").expect("A").is_visible);
        assert_eq!(state.visible_characters().len(), 1);
    }
}

#[test]
fn unknown_characters_are_ignored() {
    let blocks = vec![show("1", "Ghost"), hide("2", "Ghost")];
    let state = simulate(&blocks, "", &roster());
    assert!(state.character("Ghost").is_none());
    assert!(state.visible_characters().is_empty());
}

#[test]
fn change_character_needs_character_and_image() {
    let blocks = vec![
        cmd("1", CommandTag::ChangeCharacter, &[("character", "A")]),
        cmd(
            "2",
            CommandTag::ChangeCharacter,
            &[("character", "B"), ("image", "b_sad.png")],
        ),
    ];
    let state = simulate(&blocks, "", &roster());
    let a = state.character("A").expect("A");
    assert_eq!(a.current_image, "a.png");
    assert_eq!(a.base_image, "a.png");
    assert_eq!(state.character("B").expect("B").current_image, "b_sad.png");
}

#[test]
fn short_character_tags_behave_like_long_ones() {
    let blocks = vec![
        cmd("1", CommandTag::ShowChar, &[("character", "B"), ("position", "left")]),
        cmd(
            "2",
            CommandTag::ChangeChar,
            &[("character", "B"), ("image", "b2.png")],
        ),
        cmd("3", CommandTag::HideChar, &[("character", "A")]),
    ];
    let state = simulate(&blocks, "", &roster());
    let b = state.character("B").expect("B");
    assert!(b.is_visible);
    assert_eq!(b.current_image, "b2.png");
}

#[test]
fn variables_and_semaphores_are_boolean() {
    let blocks = vec![
        cmd("1", CommandTag::SetVariable, &[("variable", "door_open")]),
        cmd("2", CommandTag::Set, &[("semaphore", "met_tara")]),
        cmd("3", CommandTag::ResetVariable, &[("variable", "door_open")]),
        cmd("4", CommandTag::SetVariable, &[]),
    ];
    let state = simulate(&blocks, "", &roster());
    assert_eq!(state.variable("door_open"), Some(false));
    assert_eq!(state.variable("met_tara"), Some(true));
    assert_eq!(state.variables["met_tara"].r#type, "boolean");
    assert_eq!(state.variables.len(), 2);
}

#[test]
fn ask_outside_branches_records_main_path() {
    let blocks = vec![ask("q1"), ask("q2"), show("x", "A")];
    let state = simulate(&blocks, "x", &roster());
    assert_eq!(
        state.last_ask_per_branch.get("main").map(String::as_str),
        Some("q2")
    );
}

#[test]
fn top_level_walk_is_blind_to_nested_targets() {
    let options = SimulationOptions {
        walk: Some(WalkMode::TopLevel),
    };
    let state = simulate_with(&branch_tree(), "t3", &roster(), &options);
    assert!(!state.target_reached);
    assert!(state.branch_stack.is_empty());
    assert!(!state.character("A").expect("A").is_visible);
    assert!(!state.character("B").expect("B").is_visible);
    assert!(state.last_ask_per_branch.is_empty());
}

#[test]
fn branch_aware_walk_replays_the_targets_own_branch() {
    let state = simulate(&branch_tree(), "t3", &roster());
    assert!(state.target_reached);
    assert!(state.character("A").expect("A").is_visible);
    assert!(state.character("B").expect("B").is_visible);
    assert_eq!(state.branch_stack.len(), 1);
    let frame = &state.branch_stack[0];
    assert_eq!(frame.kind, BranchKind::If);
    assert_eq!(frame.block_id, "if1");
    assert_eq!(frame.active_branch, "then");
    assert_eq!(frame.available_branches, vec!["then", "else"]);
    assert_eq!(
        state.last_ask_per_branch.get("if:then").map(String::as_str),
        Some("t2")
    );
}

#[test]
fn branch_aware_walk_skips_the_other_branch() {
    let state = simulate(&branch_tree(), "e1", &roster());
    assert_eq!(state.branch_stack[0].active_branch, "else");
    assert!(!state.character("B").expect("B").is_visible);
    assert!(state.character("A").expect("A").is_visible);
}

#[test]
fn branches_that_do_not_hold_the_target_stay_opaque() {
    let state = simulate(&branch_tree(), "after", &roster());
    assert!(state.target_reached);
    assert!(state.branch_stack.is_empty());
    assert!(!state.character("B").expect("B").is_visible);
}

#[test]
fn menu_branch_records_chosen_option() {
    let opt = |id: &str, children: Vec<Block>| {
        Block::with_id(
            id,
            BlockKind::Opt(OptBlock {
                children,
                ..OptBlock::default()
            }),
        )
    };
    let blocks = vec![
        ask("q"),
        Block::with_id(
            "menu",
            BlockKind::Menu(MenuBlock {
                children: vec![
                    opt("o1", vec![show("o1-show", "B")]),
                    opt("o2", vec![ask("o2-ask"), show("o2-target", "A")]),
                ],
            }),
        ),
    ];
    let state = simulate(&blocks, "o2-target", &roster());
    assert!(state.target_reached);
    assert_eq!(state.branch_stack.len(), 1);
    assert_eq!(state.branch_stack[0].kind, BranchKind::Menu);
    assert_eq!(state.branch_stack[0].active_branch, "o2");
    assert_eq!(state.branch_stack[0].available_branches, vec!["o1", "o2"]);
    assert!(!state.character("B").expect("B").is_visible);
    assert_eq!(state.last_ask_per_branch["main"], "q");
    assert_eq!(state.last_ask_per_branch["menu:o2"], "o2-ask");

    let at_option = simulate(&blocks, "o1", &roster());
    assert!(at_option.target_reached);
    assert_eq!(at_option.branch_stack[0].active_branch, "o1");
}

#[test]
fn sequential_containers_before_the_target_are_replayed() {
    let blocks = vec![
        Block::with_id(
            "build",
            BlockKind::Build(BuildBlock {
                block_init: vec![show("init", "A")],
                block_start: vec![show("start", "B")],
            }),
        ),
        hide("target", "B"),
    ];
    let state = simulate(&blocks, "target", &roster());
    assert!(state.character("A").expect("A").is_visible);
    assert!(state.character("B").expect("B").is_visible);

    let inside = simulate(&blocks, "start", &roster());
    assert!(inside.character("A").expect("A").is_visible);
    assert!(!inside.character("B").expect("B").is_visible);
}

#[test]
fn walk_mode_parses_from_text() {
    assert_eq!("top-level".parse::<WalkMode>(), Ok(WalkMode::TopLevel));
    assert_eq!(
        "branch-aware".parse::<WalkMode>(),
        Ok(WalkMode::BranchAware)
    );
    let error = "sideways".parse::<WalkMode>().expect_err("unknown mode");
    assert_eq!(error.code, "SIM_WALK_MODE_INVALID");
}
