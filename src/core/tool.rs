use serde::Serialize;

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> serde_json::Value;
}

/// Catalog entry as listed to the calling agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

impl ToolMeta {
    pub fn of(spec: &dyn ToolSpec) -> Self {
        Self {
            name: spec.name(),
            description: spec.description(),
            input_schema: spec.input_schema(),
        }
    }
}
