use cf_core::Block;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub block_id: String,
    pub block_type: String,
    pub severity: Severity,
    pub error_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_block_id: Option<String>,
}

impl Diagnostic {
    pub fn error(block: &Block, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::on(block, Severity::Error, error_type, message)
    }

    pub fn warning(
        block: &Block,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::on(block, Severity::Warning, error_type, message)
    }

    fn on(
        block: &Block,
        severity: Severity,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            block_id: block.id.clone(),
            block_type: block.type_name().to_string(),
            severity,
            error_type: error_type.into(),
            message: message.into(),
            related_block_id: None,
        }
    }

    pub fn related_to(mut self, block: &Block) -> Self {
        self.related_block_id = Some(block.id.clone());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: usize,
    pub warnings: usize,
    pub details: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn from_details(details: Vec<Diagnostic>) -> Self {
        let errors = details.iter().filter(|detail| detail.is_error()).count();
        Self {
            errors,
            warnings: details.len() - errors,
            details,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.details.is_empty()
    }

    pub fn for_block<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.details
            .iter()
            .filter(move |detail| detail.block_id == block_id)
    }

    pub fn has(&self, error_type: &str) -> bool {
        self.details
            .iter()
            .any(|detail| detail.error_type == error_type)
    }
}
