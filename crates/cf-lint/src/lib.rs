mod context;
mod diagnostic;
mod engine;
mod insertion;
mod rules;

pub use context::{RuleContext, TreeFacts};
pub use diagnostic::{Diagnostic, Severity, ValidationReport};
pub use engine::{validate_all, RuleCategory, ValidationRule, Validator};
pub use insertion::{can_insert, InsertionPoint};
pub use rules::default_rules;
