use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct FlowError {
    pub code: String,
    pub message: String,
    pub block_id: Option<String>,
}

impl FlowError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            block_id: None,
        }
    }

    pub fn with_block(
        code: impl Into<String>,
        message: impl Into<String>,
        block_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            block_id: Some(block_id.into()),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_joins_code_and_message() {
        let error = FlowError::new("TREE_MISSING_ID", "Block has no id.");
        assert_eq!(error.to_string(), "TREE_MISSING_ID: Block has no id.");
        assert!(error.block_id.is_none());
    }

    #[test]
    fn with_block_keeps_block_id() {
        let error = FlowError::with_block("TREE_DUPLICATE_ID", "dup", "SAY-1");
        assert_eq!(error.block_id.as_deref(), Some("SAY-1"));
    }
}
