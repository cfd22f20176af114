//! Prompt types for kbqa.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A grounding prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Subject the assistant answers about, used when the corpus names none
    pub domain: String,

    /// Behavioral settings
    #[serde(default)]
    pub behavior: PromptBehavior,

    /// System instruction template (Handlebars); must reference `{{context}}`
    #[serde(rename = "systemTemplate")]
    pub system_template: String,

    /// User message template (Handlebars)
    #[serde(rename = "userTemplate", default = "default_user_template")]
    pub user_template: String,

    /// Text substituted for `{{context}}` when retrieval returned nothing
    #[serde(rename = "noContextMarker", default = "default_no_context_marker")]
    pub no_context_marker: String,
}

fn default_user_template() -> String {
    "{{query}}".to_string()
}

pub(crate) fn default_no_context_marker() -> String {
    "NO CONTEXT AVAILABLE FROM KB.".to_string()
}

/// Behavioral settings exposed to templates as `{{tone}}` and `{{style}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "helpful", "formal")
    pub tone: String,

    /// Style (e.g., "concise", "detailed")
    pub style: String,
}

impl Default for PromptBehavior {
    fn default() -> Self {
        Self {
            tone: "helpful".to_string(),
            style: "concise".to_string(),
        }
    }
}

/// A fully built prompt ready to be sent as two chat messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message: grounding rule plus context
    pub system: String,

    /// User message: the question
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Whether retrieved passages were embedded (false means the marker was)
    #[serde(rename = "contextIncluded")]
    pub context_included: bool,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: campus.strict
title: Strict campus assistant
apiVersion: "1.0"
createdBy: test
domain: the campus library
systemTemplate: "Answer about {{domain}} using only:\n{{context}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "campus.strict");
        assert_eq!(def.domain, "the campus library");
        assert_eq!(def.user_template, "{{query}}");
        assert_eq!(def.no_context_marker, "NO CONTEXT AVAILABLE FROM KB.");
        assert_eq!(def.behavior.tone, "helpful");
    }

    #[test]
    fn test_built_prompt_serializes_metadata() {
        let built = BuiltPrompt {
            system: "s".to_string(),
            user: "u".to_string(),
            metadata: BuiltPromptMetadata {
                source_prompt_id: "grounded.default".to_string(),
                context_included: false,
                resolved_variables: HashMap::new(),
            },
        };

        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(json["metadata"]["sourcePromptId"], "grounded.default");
        assert_eq!(json["metadata"]["contextIncluded"], false);
    }
}
