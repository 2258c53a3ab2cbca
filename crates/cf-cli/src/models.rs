use cf_codec::JsonNode;
use cf_lint::ValidationReport;
use serde::Serialize;

/// Validation outcome for one script file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptCheck {
    pub(crate) source: String,
    pub(crate) name: String,
    pub(crate) report: ValidationReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BreadcrumbView {
    pub(crate) index: usize,
    pub(crate) id: String,
    pub(crate) kind: &'static str,
    pub(crate) name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NavigationResult {
    pub(crate) breadcrumbs: Vec<BreadcrumbView>,
    /// `None` while the entry script itself is shown.
    pub(crate) document: Option<String>,
    pub(crate) visible: Vec<JsonNode>,
}
