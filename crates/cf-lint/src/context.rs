use std::collections::BTreeMap;

use cf_core::{Block, CommandTag, Visit};

/// What a rule sees for one block: its walk position plus facts gathered over the whole tree.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub visit: Visit<'a>,
    pub tree: &'a [Block],
    pub facts: &'a TreeFacts,
    /// Pre-order index of the block within the tree.
    pub position: usize,
}

impl<'a> RuleContext<'a> {
    pub fn block(&self) -> &'a Block {
        self.visit.block
    }

    pub fn open_scenes(&self) -> u32 {
        self.facts.open_scenes_at(self.position)
    }

    pub fn visible_characters(&self) -> usize {
        self.facts.visible_characters_at(self.position)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelFacts {
    pub preceded_by_ask: bool,
    pub followed_by_menu: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CastMember {
    name: String,
    position: String,
    visible: bool,
}

/// Characters placed in one dialog scene. Each scene starts empty.
#[derive(Debug, Clone, Default)]
struct SceneCast {
    members: Vec<CastMember>,
}

impl SceneCast {
    fn apply(&mut self, block: &Block) {
        let Some(name) = block.string_param("character") else {
            return;
        };
        match block.tag() {
            Some(CommandTag::ShowChar) => {
                self.enter(name, block.string_param("position").unwrap_or(DEFAULT_POSITION))
            }
            Some(CommandTag::SayChar) => match self.member_mut(name) {
                Some(member) => member.visible = true,
                None => self.enter(name, DEFAULT_POSITION),
            },
            Some(CommandTag::HideChar) => {
                if let Some(member) = self.member_mut(name) {
                    member.visible = false;
                }
            }
            _ => {}
        }
    }

    // Whoever stands at the same position leaves the stage.
    fn enter(&mut self, name: &str, position: &str) {
        for member in &mut self.members {
            if member.visible && member.position == position {
                member.visible = false;
            }
        }
        let entering = CastMember {
            name: name.to_string(),
            position: position.to_string(),
            visible: true,
        };
        match self.member_mut(name) {
            Some(member) => *member = entering,
            None => self.members.push(entering),
        }
    }

    fn member_mut(&mut self, name: &str) -> Option<&mut CastMember> {
        self.members.iter_mut().find(|member| member.name == name)
    }

    fn visible_count(&self) -> usize {
        self.members.iter().filter(|member| member.visible).count()
    }
}

const DEFAULT_POSITION: &str = "left";

#[derive(Debug, Clone, Default)]
pub struct TreeFacts {
    labels: BTreeMap<String, LabelFacts>,
    open_scenes: Vec<u32>,
    visible_cast: Vec<usize>,
}

impl TreeFacts {
    pub fn collect(tree: &[Block]) -> Self {
        let mut facts = Self::default();
        facts.collect_sequence(tree, &[]);
        facts
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn label(&self, name: &str) -> Option<LabelFacts> {
        self.labels.get(name).copied()
    }

    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Dialog scenes open just before the block at `position` runs.
    pub fn open_scenes_at(&self, position: usize) -> u32 {
        self.open_scenes.get(position).copied().unwrap_or(0)
    }

    /// Characters visible in the innermost open scene just before `position` runs.
    pub fn visible_characters_at(&self, position: usize) -> usize {
        self.visible_cast.get(position).copied().unwrap_or(0)
    }

    // A nested sequence starts from the scenes of its container's slot and never leaks back out.
    fn collect_sequence(&mut self, blocks: &[Block], inherited: &[SceneCast]) {
        let mut scenes = inherited.to_vec();
        for (index, block) in blocks.iter().enumerate() {
            self.open_scenes.push(scenes.len() as u32);
            self.visible_cast
                .push(scenes.last().map_or(0, SceneCast::visible_count));
            if block.is_tag(CommandTag::Label) {
                if let Some(name) = block.string_param("name") {
                    let entry = self.labels.entry(name.to_string()).or_default();
                    let previous = index.checked_sub(1).and_then(|at| blocks.get(at));
                    entry.preceded_by_ask |= previous.is_some_and(|b| b.is_tag(CommandTag::Ask));
                    entry.followed_by_menu |= blocks
                        .get(index + 1)
                        .is_some_and(|b| b.type_name() == "MENU");
                }
            }
            match block.tag() {
                Some(CommandTag::ShowDlgScene) => scenes.push(SceneCast::default()),
                Some(CommandTag::HideDlgScene) => {
                    scenes.pop();
                }
                _ => {
                    if let Some(scene) = scenes.last_mut() {
                        scene.apply(block);
                    }
                }
            }
            for (_, children) in block.collections() {
                self.collect_sequence(children, &scenes);
            }
        }
    }
}

#[cfg(test)]
mod context_tests {
    use cf_core::{walk, BlockKind, IfBlock, Parameters, ParamValue};

    use super::*;

    fn cmd(tag: CommandTag) -> Block {
        Block::command(tag, Parameters::new())
    }

    fn label(name: &str) -> Block {
        Block::command(
            CommandTag::Label,
            Parameters::from([("name".to_string(), ParamValue::from(name))]),
        )
    }

    #[test]
    fn scene_count_is_scoped_to_its_sequence() {
        let tree = vec![
            Block::new(BlockKind::If(IfBlock {
                then_blocks: vec![cmd(CommandTag::ShowDlgScene), cmd(CommandTag::Say)],
                ..IfBlock::default()
            })),
            cmd(CommandTag::Say),
            cmd(CommandTag::ShowDlgScene),
            cmd(CommandTag::HideDlgScene),
            cmd(CommandTag::HideDlgScene),
            cmd(CommandTag::Say),
        ];
        let facts = TreeFacts::collect(&tree);
        let mut seen = Vec::new();
        let mut position = 0;
        walk(&tree, &mut |visit| {
            seen.push((visit.block.type_name(), facts.open_scenes_at(position)));
            position += 1;
        });
        assert_eq!(
            seen,
            vec![
                ("IF", 0),
                ("SHOWDLGSCENE", 0),
                ("SAY", 1),
                ("SAY", 0),
                ("SHOWDLGSCENE", 0),
                ("HIDEDLGSCENE", 1),
                ("HIDEDLGSCENE", 0),
                ("SAY", 0),
            ]
        );
    }

    fn char_cmd(tag: CommandTag, name: &str, position: Option<&str>) -> Block {
        let mut parameters =
            Parameters::from([("character".to_string(), ParamValue::from(name))]);
        if let Some(position) = position {
            parameters.insert("position".to_string(), ParamValue::from(position));
        }
        Block::command(tag, parameters)
    }

    #[test]
    fn scene_cast_tracks_who_is_on_stage() {
        let tree = vec![
            cmd(CommandTag::ShowDlgScene),
            char_cmd(CommandTag::ShowChar, "tara", Some("left")),
            char_cmd(CommandTag::ShowChar, "vex", Some("right")),
            char_cmd(CommandTag::ShowChar, "ora", Some("left")),
            char_cmd(CommandTag::HideChar, "ora", None),
            char_cmd(CommandTag::HideChar, "vex", None),
            cmd(CommandTag::ShowDlgScene),
            char_cmd(CommandTag::SayChar, "tara", None),
            cmd(CommandTag::HideDlgScene),
            cmd(CommandTag::Say),
        ];
        let facts = TreeFacts::collect(&tree);
        let visible = (0..tree.len())
            .map(|position| facts.visible_characters_at(position))
            .collect::<Vec<_>>();
        assert_eq!(visible, vec![0, 0, 1, 2, 2, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn labels_remember_their_neighbours() {
        let tree = vec![
            cmd(CommandTag::Ask),
            label("loop"),
            Block::new(BlockKind::Menu(Default::default())),
            label("end"),
        ];
        let facts = TreeFacts::collect(&tree);
        assert_eq!(
            facts.label("loop"),
            Some(LabelFacts {
                preceded_by_ask: true,
                followed_by_menu: true,
            })
        );
        assert_eq!(facts.label("end"), Some(LabelFacts::default()));
        assert!(!facts.has_label("missing"));
        assert_eq!(facts.label_names().collect::<Vec<_>>(), vec!["end", "loop"]);
    }
}
