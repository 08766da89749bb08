//! Static descriptions of node kinds: ports, parameters and catalog metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Palette grouping of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    Triggers,
    Actions,
    FlowControl,
    Data,
    Integrations,
    Ai,
    Communication,
    Utilities,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Triggers => "triggers",
            NodeCategory::Actions => "actions",
            NodeCategory::FlowControl => "flow-control",
            NodeCategory::Data => "data",
            NodeCategory::Integrations => "integrations",
            NodeCategory::Ai => "ai",
            NodeCategory::Communication => "communication",
            NodeCategory::Utilities => "utilities",
        }
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_string()))
            .map_err(|_| format!("unknown node category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Trigger,
    Action,
    Logic,
    Transform,
    Integration,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

/// An input or output port on a node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub port_type: PortType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PortSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            port_type,
            required: false,
            default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Select,
    Multiselect,
    Code,
    Json,
    Credential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Visibility predicate: the parameter is shown only when `field` resolves to `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowWhen {
    pub field: String,
    pub value: Value,
}

/// A configurable parameter on a node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub display_type: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

impl ParameterSpec {
    /// A parameter whose `name` and `id` coincide, which is the usual case.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        display_type: ParameterType,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            display_name: display_name.into(),
            display_type,
            required: false,
            default: None,
            options: Vec::new(),
            placeholder: None,
            description: None,
            depends_on: None,
            show_when: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.options = values
            .into_iter()
            .map(|(label, value)| SelectOption {
                label: label.into(),
                value: value.into(),
            })
            .collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn show_when(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.show_when = Some(ShowWhen {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Whether the parameter is visible given the already resolved parameter set.
    pub fn is_visible(&self, resolved: &Map<String, Value>) -> bool {
        match &self.show_when {
            Some(cond) => resolved.get(&cond.field) == Some(&cond.value),
            None => true,
        }
    }
}

/// Immutable template for a class of workflow step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: NodeCategory,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PortSpec>,
    #[serde(default)]
    pub outputs: Vec<PortSpec>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl NodeDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
        category: NodeCategory,
        node_type: NodeType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            icon: String::new(),
            category,
            node_type,
            version: default_version(),
            author: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            credential_type: None,
            documentation: None,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_input(mut self, port: PortSpec) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: PortSpec) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_credential(mut self, credential_type: impl Into<String>) -> Self {
        self.credential_type = Some(credential_type.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn parameter(&self, id: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Resolve the effective parameter set for a node instance.
    ///
    /// Given values always win. A default fills a missing parameter only when
    /// the parameter is visible against the values resolved so far, which is
    /// how the editor populates its form. Keys not declared by the definition
    /// are carried through untouched.
    pub fn resolve_parameters(&self, given: &Map<String, Value>) -> Map<String, Value> {
        let mut resolved = given.clone();
        // showWhen may reference a parameter declared later, so iterate until stable.
        loop {
            let mut changed = false;
            for spec in &self.parameters {
                if resolved.contains_key(&spec.id) {
                    continue;
                }
                if let Some(default) = &spec.default {
                    if spec.is_visible(&resolved) {
                        resolved.insert(spec.id.clone(), default.clone());
                        changed = true;
                    }
                }
            }
            if !changed {
                return resolved;
            }
        }
    }

    /// Visible required parameters that have neither a value nor a default.
    pub fn missing_required(&self, given: &Map<String, Value>) -> Vec<&str> {
        let resolved = self.resolve_parameters(given);
        self.parameters
            .iter()
            .filter(|spec| spec.required && spec.is_visible(&resolved))
            .filter(|spec| resolved.get(&spec.id).map_or(true, Value::is_null))
            .map(|spec| spec.id.as_str())
            .collect()
    }

    /// Case-insensitive match over name, display name, description and tags.
    /// `query` must already be lowercase.
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.display_name.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule() -> NodeDefinition {
        NodeDefinition::new(
            "cron-trigger",
            "cron",
            "Schedule",
            NodeCategory::Triggers,
            NodeType::Trigger,
        )
        .with_description("Trigger workflow on a schedule")
        .with_parameter(
            ParameterSpec::new("interval", "Interval (minutes)", ParameterType::Number)
                .with_default(15)
                .show_when("mode", "interval"),
        )
        .with_parameter(
            ParameterSpec::new("mode", "Mode", ParameterType::Select)
                .required()
                .with_default("interval"),
        )
        .with_parameter(
            ParameterSpec::new("cronExpression", "Cron Expression", ParameterType::String)
                .required()
                .show_when("mode", "cron"),
        )
        .with_tags(["Timer", "cron"])
    }

    #[test]
    fn defaults_follow_visibility() {
        let def = schedule();

        let resolved = def.resolve_parameters(&Map::new());
        assert_eq!(resolved.get("mode"), Some(&json!("interval")));
        assert_eq!(resolved.get("interval"), Some(&json!(15)));

        let given = json!({"mode": "cron", "extra": true});
        let resolved = def.resolve_parameters(given.as_object().unwrap());
        assert_eq!(resolved.get("interval"), None);
        assert_eq!(resolved.get("extra"), Some(&json!(true)));
    }

    #[test]
    fn given_values_win_over_defaults() {
        let given = json!({"interval": 5});
        let resolved = schedule().resolve_parameters(given.as_object().unwrap());
        assert_eq!(resolved.get("interval"), Some(&json!(5)));
    }

    #[test]
    fn missing_required_only_reports_visible_parameters() {
        let def = schedule();
        assert!(def.missing_required(&Map::new()).is_empty());

        let given = json!({"mode": "cron"});
        assert_eq!(
            def.missing_required(given.as_object().unwrap()),
            vec!["cronExpression"]
        );
    }

    #[test]
    fn search_is_case_insensitive_over_tags() {
        let def = schedule();
        assert!(def.matches("timer"));
        assert!(def.matches("on a schedule"));
        assert!(!def.matches("webhook"));
    }

    #[test]
    fn serializes_with_external_field_names() {
        let value = serde_json::to_value(schedule()).unwrap();
        assert_eq!(value["displayName"], json!("Schedule"));
        assert_eq!(value["category"], json!("triggers"));
        assert_eq!(value["type"], json!("trigger"));
        assert_eq!(value["parameters"][0]["showWhen"]["field"], json!("mode"));
        assert_eq!("flow-control".parse::<NodeCategory>(), Ok(NodeCategory::FlowControl));
    }
}
