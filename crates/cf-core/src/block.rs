use std::fmt;

use crate::tag::CommandTag;
use crate::value::{LocalizedText, Parameters};

pub const DEFAULT_IF_TYPE: &str = "IF";
pub const DEFAULT_OPT_TYPE: &str = "OPT_SIMPLE";
pub const UNKNOWN_COMMAND_TYPE: &str = "UNKNOWN_COMMAND";

/// Named child collection of a container block. Wire names match the persisted JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKind {
    Children,
    ThenBlocks,
    ElseBlocks,
    BlockInit,
    BlockStart,
    BlockEvaluate,
    BlocksMission,
    BlocksFinish,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 8] = [
        CollectionKind::Children,
        CollectionKind::ThenBlocks,
        CollectionKind::ElseBlocks,
        CollectionKind::BlockInit,
        CollectionKind::BlockStart,
        CollectionKind::BlockEvaluate,
        CollectionKind::BlocksMission,
        CollectionKind::BlocksFinish,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            Self::Children => "children",
            Self::ThenBlocks => "thenBlocks",
            Self::ElseBlocks => "elseBlocks",
            Self::BlockInit => "blockInit",
            Self::BlockStart => "blockStart",
            Self::BlockEvaluate => "blockEvaluate",
            Self::BlocksMission => "blocksMission",
            Self::BlocksFinish => "blocksFinish",
        }
    }

    pub fn from_field_name(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == raw)
    }

    /// Collections a block of `type_name` owns, in document order.
    pub fn owned_by(type_name: &str) -> &'static [CollectionKind] {
        match type_name {
            "SCRIPT" | "MENU" | "OPT" => &[CollectionKind::Children],
            "IF" => &[CollectionKind::ThenBlocks, CollectionKind::ElseBlocks],
            "BUILD" => &[CollectionKind::BlockInit, CollectionKind::BlockStart],
            "FLIGHT" => &[
                CollectionKind::BlockInit,
                CollectionKind::BlockStart,
                CollectionKind::BlockEvaluate,
            ],
            "MISSION" => &[CollectionKind::BlocksMission, CollectionKind::BlocksFinish],
            _ => &[],
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptBlock {
    pub script_name: Option<String>,
    pub file_name: Option<String>,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MissionBlock {
    pub mission_name: Option<String>,
    pub file_name: Option<String>,
    pub blocks_mission: Vec<Block>,
    pub blocks_finish: Vec<Block>,
}

/// `else_blocks: None` means no else branch was authored; `Some(vec![])` is an enabled, empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    pub if_type: String,
    pub variable: String,
    pub value: String,
    pub num_then: u32,
    pub num_else: u32,
    pub then_blocks: Vec<Block>,
    pub else_blocks: Option<Vec<Block>>,
}

impl Default for IfBlock {
    fn default() -> Self {
        Self {
            if_type: DEFAULT_IF_TYPE.to_string(),
            variable: String::new(),
            value: String::new(),
            num_then: 0,
            num_else: 0,
            then_blocks: Vec::new(),
            else_blocks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuBlock {
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptBlock {
    pub opt_type: String,
    pub condition: Option<String>,
    pub text: LocalizedText,
    pub children: Vec<Block>,
}

impl Default for OptBlock {
    fn default() -> Self {
        Self {
            opt_type: DEFAULT_OPT_TYPE.to_string(),
            condition: None,
            text: LocalizedText::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildBlock {
    pub block_init: Vec<Block>,
    pub block_start: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightBlock {
    pub block_init: Vec<Block>,
    pub block_start: Vec<Block>,
    pub block_evaluate: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandBlock {
    pub tag: CommandTag,
    pub parameters: Parameters,
}

/// A script line no tag matches. Kept verbatim so saving never loses it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownCommand {
    pub name: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Script(ScriptBlock),
    Mission(MissionBlock),
    If(IfBlock),
    Menu(MenuBlock),
    Opt(OptBlock),
    Build(BuildBlock),
    Flight(FlightBlock),
    Command(CommandBlock),
    Unknown(UnknownCommand),
}

/// One node of the editable tree. An empty `id` means none has been assigned yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: String::new(),
            kind,
        }
    }

    pub fn with_id(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn command(tag: CommandTag, parameters: Parameters) -> Self {
        Self::new(BlockKind::Command(CommandBlock { tag, parameters }))
    }

    pub fn unknown(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::new(BlockKind::Unknown(UnknownCommand {
            name: name.into(),
            raw: raw.into(),
        }))
    }

    pub fn script(
        script_name: Option<String>,
        file_name: Option<String>,
        children: Vec<Block>,
    ) -> Self {
        Self::new(BlockKind::Script(ScriptBlock {
            script_name,
            file_name,
            children,
        }))
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Script(_) => "SCRIPT",
            BlockKind::Mission(_) => "MISSION",
            BlockKind::If(_) => "IF",
            BlockKind::Menu(_) => "MENU",
            BlockKind::Opt(_) => "OPT",
            BlockKind::Build(_) => "BUILD",
            BlockKind::Flight(_) => "FLIGHT",
            BlockKind::Command(command) => command.tag.as_str(),
            BlockKind::Unknown(_) => UNKNOWN_COMMAND_TYPE,
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn tag(&self) -> Option<CommandTag> {
        match &self.kind {
            BlockKind::Command(command) => Some(command.tag),
            _ => None,
        }
    }

    pub fn is_tag(&self, tag: CommandTag) -> bool {
        self.tag() == Some(tag)
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.kind, BlockKind::Command(_) | BlockKind::Unknown(_))
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        match &self.kind {
            BlockKind::Command(command) => Some(&command.parameters),
            _ => None,
        }
    }

    pub fn parameters_mut(&mut self) -> Option<&mut Parameters> {
        match &mut self.kind {
            BlockKind::Command(command) => Some(&mut command.parameters),
            _ => None,
        }
    }

    /// Non-blank string parameter.
    pub fn string_param(&self, key: &str) -> Option<&str> {
        self.parameters()
            .and_then(|parameters| parameters.get(key))
            .and_then(|value| value.as_string())
            .filter(|value| !value.trim().is_empty())
    }

    /// Populated collections in document order. An unauthored else branch is skipped.
    pub fn collections(&self) -> Vec<(CollectionKind, &Vec<Block>)> {
        match &self.kind {
            BlockKind::Script(script) => vec![(CollectionKind::Children, &script.children)],
            BlockKind::Menu(menu) => vec![(CollectionKind::Children, &menu.children)],
            BlockKind::Opt(opt) => vec![(CollectionKind::Children, &opt.children)],
            BlockKind::If(branch) => {
                let mut collections = vec![(CollectionKind::ThenBlocks, &branch.then_blocks)];
                if let Some(else_blocks) = &branch.else_blocks {
                    collections.push((CollectionKind::ElseBlocks, else_blocks));
                }
                collections
            }
            BlockKind::Build(build) => vec![
                (CollectionKind::BlockInit, &build.block_init),
                (CollectionKind::BlockStart, &build.block_start),
            ],
            BlockKind::Flight(flight) => vec![
                (CollectionKind::BlockInit, &flight.block_init),
                (CollectionKind::BlockStart, &flight.block_start),
                (CollectionKind::BlockEvaluate, &flight.block_evaluate),
            ],
            BlockKind::Mission(mission) => vec![
                (CollectionKind::BlocksMission, &mission.blocks_mission),
                (CollectionKind::BlocksFinish, &mission.blocks_finish),
            ],
            BlockKind::Command(_) | BlockKind::Unknown(_) => Vec::new(),
        }
    }

    pub fn collections_mut(&mut self) -> Vec<(CollectionKind, &mut Vec<Block>)> {
        match &mut self.kind {
            BlockKind::Script(script) => vec![(CollectionKind::Children, &mut script.children)],
            BlockKind::Menu(menu) => vec![(CollectionKind::Children, &mut menu.children)],
            BlockKind::Opt(opt) => vec![(CollectionKind::Children, &mut opt.children)],
            BlockKind::If(branch) => {
                let mut collections = vec![(CollectionKind::ThenBlocks, &mut branch.then_blocks)];
                if let Some(else_blocks) = &mut branch.else_blocks {
                    collections.push((CollectionKind::ElseBlocks, else_blocks));
                }
                collections
            }
            BlockKind::Build(build) => vec![
                (CollectionKind::BlockInit, &mut build.block_init),
                (CollectionKind::BlockStart, &mut build.block_start),
            ],
            BlockKind::Flight(flight) => vec![
                (CollectionKind::BlockInit, &mut flight.block_init),
                (CollectionKind::BlockStart, &mut flight.block_start),
                (CollectionKind::BlockEvaluate, &mut flight.block_evaluate),
            ],
            BlockKind::Mission(mission) => vec![
                (CollectionKind::BlocksMission, &mut mission.blocks_mission),
                (CollectionKind::BlocksFinish, &mut mission.blocks_finish),
            ],
            BlockKind::Command(_) | BlockKind::Unknown(_) => Vec::new(),
        }
    }

    pub fn collection(&self, kind: CollectionKind) -> Option<&Vec<Block>> {
        self.collections()
            .into_iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, blocks)| blocks)
    }

    /// Mutable access to one collection. Asking an IF for `ElseBlocks` enables the else branch.
    pub fn collection_mut(&mut self, kind: CollectionKind) -> Option<&mut Vec<Block>> {
        use CollectionKind as C;
        match (&mut self.kind, kind) {
            (BlockKind::Script(script), C::Children) => Some(&mut script.children),
            (BlockKind::Menu(menu), C::Children) => Some(&mut menu.children),
            (BlockKind::Opt(opt), C::Children) => Some(&mut opt.children),
            (BlockKind::If(branch), C::ThenBlocks) => Some(&mut branch.then_blocks),
            (BlockKind::If(branch), C::ElseBlocks) => {
                Some(branch.else_blocks.get_or_insert_with(Vec::new))
            }
            (BlockKind::Build(build), C::BlockInit) => Some(&mut build.block_init),
            (BlockKind::Build(build), C::BlockStart) => Some(&mut build.block_start),
            (BlockKind::Flight(flight), C::BlockInit) => Some(&mut flight.block_init),
            (BlockKind::Flight(flight), C::BlockStart) => Some(&mut flight.block_start),
            (BlockKind::Flight(flight), C::BlockEvaluate) => Some(&mut flight.block_evaluate),
            (BlockKind::Mission(mission), C::BlocksMission) => Some(&mut mission.blocks_mission),
            (BlockKind::Mission(mission), C::BlocksFinish) => Some(&mut mission.blocks_finish),
            _ => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Block> {
        self.collections()
            .into_iter()
            .flat_map(|(_, blocks)| blocks.iter())
    }

    /// SCRIPT without a name and file name: a transient wrapper, never persisted.
    pub fn is_anonymous_script(&self) -> bool {
        match &self.kind {
            BlockKind::Script(script) => {
                is_blank(script.script_name.as_deref()) && is_blank(script.file_name.as_deref())
            }
            _ => false,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

#[cfg(test)]
mod block_tests {
    use super::*;
    use crate::value::ParamValue;

    fn flight() -> Block {
        Block::with_id(
            "FLIGHT-1",
            BlockKind::Flight(FlightBlock {
                block_init: vec![],
                block_start: vec![],
                block_evaluate: vec![Block::with_id(
                    "SAY-1",
                    BlockKind::Command(CommandBlock {
                        tag: CommandTag::Say,
                        parameters: Parameters::new(),
                    }),
                )],
            }),
        )
    }

    #[test]
    fn collections_follow_type_schema() {
        let block = flight();
        let kinds = block
            .collections()
            .into_iter()
            .map(|(kind, _)| kind)
            .collect::<Vec<_>>();
        assert_eq!(kinds, CollectionKind::owned_by("FLIGHT"));
        assert_eq!(block.children().count(), 1);
    }

    #[test]
    fn if_collections_skip_unauthored_else() {
        let mut block = Block::new(BlockKind::If(IfBlock::default()));
        assert_eq!(block.collections().len(), 1);
        assert!(block.collection(CollectionKind::ElseBlocks).is_none());

        block
            .collection_mut(CollectionKind::ElseBlocks)
            .expect("else should be enabled");
        match &block.kind {
            BlockKind::If(branch) => assert_eq!(branch.else_blocks, Some(vec![])),
            _ => panic!("expected IF"),
        }
    }

    #[test]
    fn collection_mut_rejects_foreign_collections() {
        let mut block = flight();
        assert!(block.collection_mut(CollectionKind::Children).is_none());
        assert!(block.collection_mut(CollectionKind::BlockEvaluate).is_some());
    }

    #[test]
    fn anonymous_script_needs_both_names_blank() {
        assert!(Block::script(None, None, vec![]).is_anonymous_script());
        assert!(Block::script(Some(" ".to_string()), None, vec![]).is_anonymous_script());
        assert!(!Block::script(Some("main".to_string()), None, vec![]).is_anonymous_script());
    }

    #[test]
    fn string_param_ignores_blank_values() {
        let mut parameters = Parameters::new();
        parameters.insert("label".to_string(), ParamValue::from("  "));
        let block = Block::command(CommandTag::Go, parameters);
        assert_eq!(block.string_param("label"), None);
        assert_eq!(block.type_name(), "GO");
        assert!(block.is_tag(CommandTag::Go));
        assert!(!block.is_container());
    }
}
