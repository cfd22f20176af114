//! Prompt loader for YAML prompt definitions.

use crate::builder::render_template;
use crate::types::{default_no_context_marker, PromptBehavior, PromptDefinition};
use kbqa_core::config::DEFAULT_PROMPT_ID;
use kbqa_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_DOMAIN: &str = "the M.Sc. Information Technology program at TH OWL";

const DEFAULT_SYSTEM_TEMPLATE: &str = "You are a {{tone}} assistant providing information about {{domain}} \
based ONLY on the context supplied below. If the answer is not in the context, say you cannot \
answer based on the provided data.\n\nContext:\n{{context}}";

/// The built-in grounding prompt, used when the workspace defines none.
pub fn default_prompt() -> PromptDefinition {
    PromptDefinition {
        id: DEFAULT_PROMPT_ID.to_string(),
        title: "Grounded knowledge base assistant".to_string(),
        api_version: "1.0".to_string(),
        created_by: "kbqa".to_string(),
        domain: DEFAULT_DOMAIN.to_string(),
        behavior: PromptBehavior::default(),
        system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
        user_template: "{{query}}".to_string(),
        no_context_marker: default_no_context_marker(),
    }
}

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `<id>.yml` in `.kbqa/prompts/`. When no such file exists and the
/// id is the default one, the built-in definition is returned.
///
/// # Example
/// ```no_run
/// use kbqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "grounded.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        if prompt_id == DEFAULT_PROMPT_ID {
            tracing::debug!("Using built-in prompt '{}'", DEFAULT_PROMPT_ID);
            return Ok(default_prompt());
        }
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all prompt IDs available in the workspace, including the built-in one.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids = vec![DEFAULT_PROMPT_ID.to_string()];
    let prompts_dir = prompts_dir(workspace_path);

    if !prompts_dir.exists() {
        return Ok(prompt_ids);
    }

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !prompt_ids.iter().any(|id| id == stem) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Whether rendering `template` embeds the `context` variable. Accepts any
/// spelling Handlebars does, such as `{{ context }}`.
fn references_context(template: &str) -> AppResult<bool> {
    const SENTINEL: &str = "__kbqa_context__";
    let variables = HashMap::from([("context".to_string(), SENTINEL.to_string())]);
    Ok(render_template(template, &variables)?.contains(SENTINEL))
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".kbqa").join("prompts")
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if !references_context(&def.system_template)? {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' systemTemplate must reference {{{{context}}}}",
            def.id
        )));
    }

    if def.user_template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt userTemplate cannot be empty".to_string(),
        ));
    }

    if def.no_context_marker.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt noContextMarker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, body: &str) -> PathBuf {
        let prompts_dir = dir.join(".kbqa/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, body).unwrap();
        file_path
    }

    fn valid_prompt(id: &str) -> String {
        format!(
            r#"
id: {}
title: "Test Prompt"
apiVersion: "1.0"
domain: the test lab
systemTemplate: "Only use:\n{{{{context}}}}"
noContextMarker: "NOTHING FOUND"
"#,
            id
        )
    }

    #[test]
    fn test_default_prompt_is_valid() {
        let def = default_prompt();
        assert!(validate_prompt(&def).is_ok());
        assert!(def.system_template.contains("ONLY"));
    }

    #[test]
    fn test_builtin_used_when_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), DEFAULT_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
        assert_eq!(prompt.domain, DEFAULT_DOMAIN);
    }

    #[test]
    fn test_workspace_file_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), DEFAULT_PROMPT_ID, &valid_prompt(DEFAULT_PROMPT_ID));

        let prompt = load_prompt(temp_dir.path(), DEFAULT_PROMPT_ID).unwrap();
        assert_eq!(prompt.domain, "the test lab");
        assert_eq!(prompt.no_context_marker, "NOTHING FOUND");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_rejects_template_without_context() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "ungrounded",
            r#"
id: ungrounded
title: Ungrounded
apiVersion: "1.0"
domain: anything
systemTemplate: "Answer freely."
"#,
        );

        let err = load_prompt(temp_dir.path(), "ungrounded").unwrap_err();
        assert!(err.to_string().contains("{{context}}"));
    }

    #[test]
    fn test_accepts_spaced_context_reference() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "spaced",
            r#"
id: spaced
title: Spaced
apiVersion: "1.0"
domain: the city library
systemTemplate: "Answer about {{ domain }} from:\n{{ context }}"
"#,
        );

        let prompt = load_prompt(temp_dir.path(), "spaced").unwrap();
        let built = crate::build_grounded_prompt(&prompt, "q", "PASSAGE TEXT", None).unwrap();
        assert!(built.system.ends_with("PASSAGE TEXT"));
    }

    #[test]
    fn test_rejects_misspelled_context_reference() {
        let mut def = default_prompt();
        def.system_template = "Answer from: {{contexts}}".to_string();
        assert!(validate_prompt(&def).is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "prompt1", &valid_prompt("prompt1"));
        write_prompt(temp_dir.path(), "prompt2", &valid_prompt("prompt2"));

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.contains(&DEFAULT_PROMPT_ID.to_string()));
        assert!(prompts.contains(&"prompt1".to_string()));
        assert!(prompts.contains(&"prompt2".to_string()));
    }
}
