use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::roster::RosterEntry;

/// Branch path used for questions asked outside any IF or MENU.
pub const MAIN_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    pub name: String,
    pub is_visible: bool,
    pub current_image: String,
    pub base_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableState {
    pub r#type: String,
    pub value: bool,
}

impl VariableState {
    pub fn boolean(value: bool) -> Self {
        Self {
            r#type: "boolean".to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    If,
    Menu,
}

impl BranchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Menu => "menu",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchFrame {
    pub kind: BranchKind,
    pub block_id: String,
    pub active_branch: String,
    pub available_branches: Vec<String>,
}

/// World state just before the target block. Characters keep roster order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub character_states: Vec<CharacterState>,
    pub variables: BTreeMap<String, VariableState>,
    pub branch_stack: Vec<BranchFrame>,
    pub last_ask_per_branch: BTreeMap<String, String>,
    pub target_reached: bool,
}

impl FlowState {
    /// Every roster character starts hidden on its base image. Repeated names keep the first entry.
    pub fn from_roster(roster: &[RosterEntry]) -> Self {
        let mut state = Self::default();
        for entry in roster {
            if state.character(&entry.name).is_some() {
                continue;
            }
            let base_image = entry.base_image();
            state.character_states.push(CharacterState {
                name: entry.name.clone(),
                is_visible: false,
                current_image: base_image.clone(),
                base_image,
            });
        }
        state
    }

    pub fn character(&self, name: &str) -> Option<&CharacterState> {
        self.character_states.iter().find(|state| state.name == name)
    }

    pub(crate) fn character_mut(&mut self, name: &str) -> Option<&mut CharacterState> {
        self.character_states
            .iter_mut()
            .find(|state| state.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<bool> {
        self.variables.get(name).map(|variable| variable.value)
    }

    /// `type:activeBranch` pairs joined by `/`, or `main` outside any branch.
    pub fn branch_path(&self) -> String {
        if self.branch_stack.is_empty() {
            return MAIN_BRANCH.to_string();
        }
        self.branch_stack
            .iter()
            .map(|frame| format!("{}:{}", frame.kind.as_str(), frame.active_branch))
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn visible_characters(&self) -> Vec<&CharacterState> {
        self.character_states
            .iter()
            .filter(|state| state.is_visible)
            .collect()
    }

    pub fn current_speaking_character(&self) -> Option<&CharacterState> {
        self.character_states.iter().find(|state| state.is_visible)
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    fn frame(kind: BranchKind, active: &str) -> BranchFrame {
        BranchFrame {
            kind,
            block_id: format!("{}-block", kind.as_str()),
            active_branch: active.to_string(),
            available_branches: vec![active.to_string()],
        }
    }

    #[test]
    fn from_roster_starts_hidden_on_base_image() {
        let state = FlowState::from_roster(&[
            RosterEntry::new("A", vec!["a.png".to_string()]),
            RosterEntry::new("A", vec!["dup.png".to_string()]),
        ]);
        assert_eq!(state.character_states.len(), 1);
        let a = state.character("A").expect("A should exist");
        assert!(!a.is_visible);
        assert_eq!(a.current_image, "a.png");
        assert_eq!(a.base_image, "a.png");
    }

    #[test]
    fn branch_path_joins_frames() {
        let mut state = FlowState::default();
        assert_eq!(state.branch_path(), "main");
        state.branch_stack.push(frame(BranchKind::If, "then"));
        state.branch_stack.push(frame(BranchKind::Menu, "OPT-1"));
        assert_eq!(state.branch_path(), "if:then/menu:OPT-1");
    }

    #[test]
    fn speaking_character_is_first_visible_in_roster_order() {
        let mut state = FlowState::from_roster(&[
            RosterEntry::new("A", vec![]),
            RosterEntry::new("B", vec![]),
            RosterEntry::new("C", vec![]),
        ]);
        assert!(state.current_speaking_character().is_none());
        for name in ["C", "B"] {
            state.character_mut(name).expect("character").is_visible = true;
        }
        assert_eq!(
            state.current_speaking_character().map(|c| c.name.as_str()),
            Some("B")
        );
        assert_eq!(state.visible_characters().len(), 2);
    }

    #[test]
    fn flow_state_serializes_with_collaborator_field_names() {
        let mut state = FlowState::default();
        state
            .variables
            .insert("door".to_string(), VariableState::boolean(true));
        let json = serde_json::to_value(&state).expect("state should serialize");
        assert_eq!(json["variables"]["door"]["type"], "boolean");
        assert!(json.get("lastAskPerBranch").is_some());
        assert!(json.get("characterStates").is_some());
    }
}
