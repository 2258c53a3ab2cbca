use cf_core::{Block, CommandTag};

use crate::state::{FlowState, VariableState};

/// Applies the side effect of one command block. Anything else is inert.
pub(crate) fn apply_effect(block: &Block, state: &mut FlowState) {
    let Some(tag) = block.tag() else {
        return;
    };
    match tag {
        CommandTag::ShowCharacter | CommandTag::ShowChar => set_visible(block, state, true),
        CommandTag::HideCharacter | CommandTag::HideChar => set_visible(block, state, false),
        CommandTag::ChangeCharacter | CommandTag::ChangeChar => {
            let (Some(name), Some(image)) =
                (block.string_param("character"), block.string_param("image"))
            else {
                return;
            };
            if let Some(character) = state.character_mut(name) {
                character.current_image = image.to_string();
            }
        }
        CommandTag::SetVariable => set_variable(block, state, "variable", true),
        CommandTag::ResetVariable => set_variable(block, state, "variable", false),
        CommandTag::Set => set_variable(block, state, "semaphore", true),
        CommandTag::Reset => set_variable(block, state, "semaphore", false),
        CommandTag::Ask => {
            let path = state.branch_path();
            state.last_ask_per_branch.insert(path, block.id.clone());
        }
        _ => {}
    }
}

fn set_visible(block: &Block, state: &mut FlowState, visible: bool) {
    if let Some(character) = block
        .string_param("character")
        .and_then(|name| state.character_mut(name))
    {
        character.is_visible = visible;
    }
}

fn set_variable(block: &Block, state: &mut FlowState, key: &str, value: bool) {
    if let Some(name) = block.string_param(key) {
        state
            .variables
            .insert(name.to_string(), VariableState::boolean(value));
    }
}
