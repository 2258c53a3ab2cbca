use cf_core::{primary_text, Block, BlockKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Zoom,
    Subscript,
    Mission,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zoom => "zoom",
            Self::Subscript => "subscript",
            Self::Mission => "mission",
        }
    }
}

/// Which tree an entry's path starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKey {
    Root,
    Script(String),
}

/// One breadcrumb. `path` holds the ids from the document's top level down to the shown block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    pub document: DocumentKey,
    pub path: Vec<String>,
}

/// Breadcrumb label for a block.
pub fn display_name(block: &Block) -> String {
    match &block.kind {
        BlockKind::Script(script) => non_empty(script.script_name.as_deref())
            .unwrap_or("Script")
            .to_string(),
        BlockKind::Mission(mission) => non_empty(mission.mission_name.as_deref())
            .unwrap_or("Mission")
            .to_string(),
        BlockKind::If(branch) => format!("IF {}", branch.if_type),
        BlockKind::Opt(opt) => primary_text(&opt.text)
            .map_or_else(|| "OPT".to_string(), |text| format!("OPT {}", text)),
        _ => block.type_name().to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod entry_tests {
    use cf_core::{IfBlock, LocalizedText, OptBlock, ScriptBlock};

    use super::*;

    #[test]
    fn display_names_follow_block_kind() {
        let named = Block::new(BlockKind::Script(ScriptBlock {
            script_name: Some("intro".to_string()),
            ..ScriptBlock::default()
        }));
        assert_eq!(display_name(&named), "intro");
        assert_eq!(
            display_name(&Block::new(BlockKind::Script(ScriptBlock::default()))),
            "Script"
        );
        let branch = Block::new(BlockKind::If(IfBlock {
            if_type: "IF_PROB".to_string(),
            ..IfBlock::default()
        }));
        assert_eq!(display_name(&branch), "IF IF_PROB");
        let option = Block::new(BlockKind::Opt(OptBlock {
            text: LocalizedText::from([("EN".to_string(), "Leave".to_string())]),
            ..OptBlock::default()
        }));
        assert_eq!(display_name(&option), "OPT Leave");
        assert_eq!(
            display_name(&Block::new(BlockKind::Build(Default::default()))),
            "BUILD"
        );
    }
}
