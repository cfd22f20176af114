//! Prompt builder for rendering the grounding instruction.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use kbqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build the system/user message pair for one question.
///
/// The system message names the domain, states the grounding rule and embeds
/// `context`, or the definition's no-context marker when `context` is empty.
/// The question only ever goes into the user message.
///
/// # Arguments
/// * `definition` - Prompt definition
/// * `query` - The user's question
/// * `context` - Assembled passages, possibly empty
/// * `domain` - Domain label overriding the definition's default
///
/// # Example
/// ```
/// use kbqa_prompt::{build_grounded_prompt, default_prompt};
///
/// let built = build_grounded_prompt(&default_prompt(), "Is there a fee?", "", None).unwrap();
/// assert!(built.system.contains("NO CONTEXT AVAILABLE FROM KB."));
/// assert_eq!(built.user, "Is there a fee?");
/// ```
pub fn build_grounded_prompt(
    definition: &PromptDefinition,
    query: &str,
    context: &str,
    domain: Option<&str>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let context_included = !context.trim().is_empty();
    let context_value = if context_included {
        context.to_string()
    } else {
        definition.no_context_marker.clone()
    };

    let mut variables = HashMap::new();
    variables.insert(
        "domain".to_string(),
        domain.unwrap_or(&definition.domain).to_string(),
    );
    variables.insert("tone".to_string(), definition.behavior.tone.clone());
    variables.insert("style".to_string(), definition.behavior.style.clone());
    variables.insert("context".to_string(), context_value);
    variables.insert("query".to_string(), query.to_string());

    let system = render_template(&definition.system_template, &variables)?;
    let user = render_template(&definition.user_template, &variables)?;

    if !context_included {
        tracing::debug!("No context retrieved; embedded no-context marker");
    }

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            context_included,
            resolved_variables: variables,
        },
    })
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output; passages may contain quotes and ampersands
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
