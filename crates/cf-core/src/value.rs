use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PRIMARY_LANGUAGE: &str = "EN";
pub const LANGUAGES: [&str; 7] = ["EN", "CS", "DE", "ES", "FR", "PL", "RU"];

pub type Parameters = BTreeMap<String, ParamValue>;

/// Text keyed by language code. `EN` is the authoring language.
pub type LocalizedText = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
    Null,
}

impl ParamValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Numbers authored as strings ("5") count as numbers.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::String(value) => value.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Reads one language out of a multilingual map, or the plain string itself.
    pub fn localized(&self, language: &str) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            Self::Map(entries) => entries.get(language).and_then(ParamValue::as_string),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(value) => value.trim().is_empty(),
            Self::Array(values) => values.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Null => "null",
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Non-empty primary-language text, if any.
pub fn primary_text(text: &LocalizedText) -> Option<&str> {
    text.get(PRIMARY_LANGUAGE)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn untagged_json_maps_to_variants() {
        let value: ParamValue =
            serde_json::from_str(r#"{"EN":"Hello","DE":"Hallo"}"#).expect("map should parse");
        assert_eq!(value.localized("DE"), Some("Hallo"));
        assert_eq!(value.type_name(), "map");

        let null: ParamValue = serde_json::from_str("null").expect("null should parse");
        assert_eq!(null, ParamValue::Null);
        assert!(null.is_blank());
    }

    #[test]
    fn to_number_accepts_numeric_strings() {
        assert_eq!(ParamValue::from("12").to_number(), Some(12.0));
        assert_eq!(ParamValue::from(3.5).to_number(), Some(3.5));
        assert_eq!(ParamValue::from("abc").to_number(), None);
        assert_eq!(ParamValue::Bool(true).to_number(), None);
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(ParamValue::from("   ").is_blank());
        assert!(!ParamValue::from("1 2").is_blank());
        assert!(!ParamValue::Number(0.0).is_blank());
    }

    #[test]
    fn primary_text_requires_english() {
        let mut text = LocalizedText::new();
        text.insert("DE".to_string(), "Hallo".to_string());
        assert_eq!(primary_text(&text), None);
        text.insert("EN".to_string(), "Hello".to_string());
        assert_eq!(primary_text(&text), Some("Hello"));
    }
}
