use std::fmt;
use std::str::FromStr;

use cf_core::{contains_block, Block, BlockKind, FlowError};
use tracing::debug;

use crate::effects::apply_effect;
use crate::roster::RosterEntry;
use crate::state::{BranchFrame, BranchKind, FlowState};

/// How far the replay looks below the top-level sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    /// Replays sequential containers and follows the branch that holds the target.
    #[default]
    BranchAware,
    /// Only top-level blocks; containers are opaque and nested targets are never reached.
    TopLevel,
}

impl WalkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BranchAware => "branch-aware",
            Self::TopLevel => "top-level",
        }
    }
}

impl fmt::Display for WalkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalkMode {
    type Err = FlowError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "branch-aware" => Ok(Self::BranchAware),
            "top-level" => Ok(Self::TopLevel),
            other => Err(FlowError::new(
                "SIM_WALK_MODE_INVALID",
                format!(
                    "Unknown walk mode \"{}\". Expected branch-aware or top-level.",
                    other
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    pub walk: Option<WalkMode>,
}

pub fn simulate(blocks: &[Block], target_block_id: &str, roster: &[RosterEntry]) -> FlowState {
    simulate_with(blocks, target_block_id, roster, &SimulationOptions::default())
}

/// Replays `blocks` in document order and stops before `target_block_id`. An empty or
/// unknown target replays everything.
pub fn simulate_with(
    blocks: &[Block],
    target_block_id: &str,
    roster: &[RosterEntry],
    options: &SimulationOptions,
) -> FlowState {
    let mode = options.walk.unwrap_or_default();
    let target = Some(target_block_id).filter(|id| !id.is_empty());
    let mut state = FlowState::from_roster(roster);

    state.target_reached = match mode {
        WalkMode::TopLevel => walk_top_level(blocks, target, &mut state),
        WalkMode::BranchAware => walk_sequence(blocks, target, &mut state),
    };
    debug!(
        target_block = target_block_id,
        mode = %mode,
        reached = state.target_reached,
        branches = state.branch_stack.len(),
        "flow state simulated"
    );
    state
}

fn walk_top_level(blocks: &[Block], target: Option<&str>, state: &mut FlowState) -> bool {
    for block in blocks {
        if is_target(block, target) {
            return true;
        }
        apply_effect(block, state);
    }
    false
}

/// Returns true once the target is reached; the state then reflects everything before it.
fn walk_sequence(blocks: &[Block], target: Option<&str>, state: &mut FlowState) -> bool {
    for block in blocks {
        if is_target(block, target) {
            return true;
        }
        let holds_target = target.is_some_and(|id| contains_block(block, id));
        match &block.kind {
            BlockKind::Command(_) => apply_effect(block, state),
            BlockKind::Unknown(_) => {}
            BlockKind::If(_) | BlockKind::Menu(_) if !holds_target => {}
            BlockKind::If(branch) => {
                let in_then = target.is_some_and(|id| {
                    branch
                        .then_blocks
                        .iter()
                        .any(|child| child.id == id || contains_block(child, id))
                });
                let (active, branch_blocks) = match (&branch.else_blocks, in_then) {
                    (_, true) => ("then", branch.then_blocks.as_slice()),
                    (Some(else_blocks), false) => ("else", else_blocks.as_slice()),
                    (None, false) => return false,
                };
                let mut available = vec!["then".to_string()];
                if branch.else_blocks.is_some() {
                    available.push("else".to_string());
                }
                state.branch_stack.push(BranchFrame {
                    kind: BranchKind::If,
                    block_id: block.id.clone(),
                    active_branch: active.to_string(),
                    available_branches: available,
                });
                return walk_sequence(branch_blocks, target, state);
            }
            BlockKind::Menu(menu) => {
                let Some(chosen) = menu.children.iter().find(|child| {
                    is_target(child, target) || target.is_some_and(|id| contains_block(child, id))
                }) else {
                    return false;
                };
                let BlockKind::Opt(opt) = &chosen.kind else {
                    return walk_sequence(std::slice::from_ref(chosen), target, state);
                };
                state.branch_stack.push(BranchFrame {
                    kind: BranchKind::Menu,
                    block_id: block.id.clone(),
                    active_branch: chosen.id.clone(),
                    available_branches: menu
                        .children
                        .iter()
                        .filter(|child| matches!(child.kind, BlockKind::Opt(_)))
                        .map(|child| child.id.clone())
                        .collect(),
                });
                if is_target(chosen, target) {
                    return true;
                }
                return walk_sequence(&opt.children, target, state);
            }
            _ => {
                for (_, children) in block.collections() {
                    if walk_sequence(children, target, state) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn is_target(block: &Block, target: Option<&str>) -> bool {
    target.is_some_and(|id| block.id == id)
}
