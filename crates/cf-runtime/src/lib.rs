mod effects;
mod roster;
mod simulator;
mod state;

pub use roster::RosterEntry;
pub use simulator::{simulate, simulate_with, SimulationOptions, WalkMode};
pub use state::{BranchFrame, BranchKind, CharacterState, FlowState, VariableState, MAIN_BRANCH};

#[cfg(test)]
mod tests;
