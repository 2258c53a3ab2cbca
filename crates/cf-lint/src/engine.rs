use cf_core::{walk, Block};
use tracing::debug;

use crate::context::{RuleContext, TreeFacts};
use crate::diagnostic::{Diagnostic, ValidationReport};
use crate::rules::default_rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleCategory {
    /// Required or well-formed parameters of a single block.
    Parameters,
    /// Where a command is expected to live (BUILD, MISSION, phases).
    Context,
    /// Relationships between blocks: menus, asks, labels, scenes, nesting.
    Structure,
}

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> RuleCategory;
    fn check(&self, ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>);
}

/// Runs a rule table over every block of a tree.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl Validator {
    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// A block that already fails a parameter rule gets no context warnings on top.
    pub fn validate(&self, tree: &[Block]) -> ValidationReport {
        let facts = TreeFacts::collect(tree);
        let mut details = Vec::new();
        let mut position = 0usize;

        walk(tree, &mut |visit| {
            let ctx = RuleContext {
                visit: *visit,
                tree,
                facts: &facts,
                position,
            };
            position += 1;

            let before = details.len();
            self.run(RuleCategory::Parameters, &ctx, &mut details);
            if details.len() == before {
                self.run(RuleCategory::Context, &ctx, &mut details);
            }
            self.run(RuleCategory::Structure, &ctx, &mut details);
        });

        let report = ValidationReport::from_details(details);
        debug!(
            blocks = position,
            errors = report.errors,
            warnings = report.warnings,
            "validated block tree"
        );
        report
    }

    fn run(&self, category: RuleCategory, ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
        for rule in self.rules.iter().filter(|rule| rule.category() == category) {
            rule.check(ctx, out);
        }
    }
}

pub fn validate_all(tree: &[Block]) -> ValidationReport {
    Validator::default().validate(tree)
}
