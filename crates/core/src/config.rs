//! Configuration management for kbqa.
//!
//! Configuration is resolved in layers, later layers winning:
//! - Built-in defaults (no config file is required)
//! - YAML config file (`--config`, `KBQA_CONFIG`, or `.kbqa/config.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default chat endpoint of a local Ollama daemon.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/chat";

/// Default endpoint for OpenAI-compatible servers (llama.cpp, vLLM, LM Studio).
pub const DEFAULT_OPENAI_ENDPOINT: &str = "http://localhost:8080/v1/chat/completions";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "deepseek-r1:7b";

/// Default prompt definition id.
pub const DEFAULT_PROMPT_ID: &str = "grounded.default";

/// Providers the client factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["ollama", "openai", "openai-compatible"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (may contain .kbqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation backend provider ("ollama", "openai" or "openai-compatible")
    pub provider: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Explicit backend endpoint; `None` means the provider default
    pub endpoint: Option<String>,

    /// API key for OpenAI-compatible backends
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Timeout for a single generation call, in seconds
    pub timeout_secs: u64,

    /// Retrieval tunables
    pub retrieval: RetrievalConfig,

    /// Optional corpus file replacing the built-in knowledge base
    pub corpus_file: Option<PathBuf>,

    /// Prompt definition used for the grounding instruction
    pub prompt_id: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Retrieval tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of passages handed to the generator
    pub top_n: usize,

    /// Minimum cosine similarity a passage needs to be used
    pub min_score: f32,

    /// Optional character budget for the assembled context
    pub max_context_chars: Option<usize>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            min_score: 1e-6,
            max_context_chars: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceSection>,
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalSection>,
    knowledge: Option<KnowledgeSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topN")]
    top_n: Option<usize>,
    #[serde(rename = "minScore")]
    min_score: Option<f32>,
    #[serde(rename = "maxContextChars")]
    max_context_chars: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    #[serde(rename = "corpusFile")]
    corpus_file: Option<String>,
    #[serde(rename = "promptId")]
    prompt_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub top_n: Option<usize>,
    pub min_score: Option<f32>,
    pub max_context_chars: Option<usize>,
    pub corpus_file: Option<PathBuf>,
    pub prompt_id: Option<String>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key: None,
            timeout_secs: 60,
            retrieval: RetrievalConfig::default(),
            corpus_file: None,
            prompt_id: DEFAULT_PROMPT_ID.to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// Environment variables:
    /// - `KBQA_WORKSPACE`: Override workspace path
    /// - `KBQA_CONFIG`: Path to config file
    /// - `KBQA_PROVIDER`, `KBQA_MODEL`, `KBQA_ENDPOINT`, `KBQA_API_KEY`
    /// - `KBQA_TIMEOUT_SECS`, `KBQA_TOP_N`, `KBQA_MIN_SCORE`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use kbqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, letting the caller pin the workspace and config file
    /// before the YAML layer is read.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("KBQA_WORKSPACE")) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("KBQA_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        cf
                    )));
                }
                cf.clone()
            }
            None => config.kbqa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env()?;

        Ok(config)
    }

    /// Apply `KBQA_*` environment variables on top of the current values.
    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(provider) = std::env::var("KBQA_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("KBQA_MODEL") {
            self.model = model;
        }

        if let Ok(endpoint) = std::env::var("KBQA_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }

        if let Ok(key) = std::env::var("KBQA_API_KEY") {
            self.api_key = Some(key);
        }

        if let Some(timeout) = env_parse::<u64>("KBQA_TIMEOUT_SECS")? {
            self.timeout_secs = timeout;
        }

        if let Some(top_n) = env_parse::<usize>("KBQA_TOP_N")? {
            self.retrieval.top_n = top_n;
        }

        if let Some(min_score) = env_parse::<f32>("KBQA_MIN_SCORE")? {
            self.retrieval.min_score = min_score;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
            if let Some(timeout) = llm.timeout_secs {
                result.timeout_secs = timeout;
            }
            if let Some(env_var) = llm.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_n) = retrieval.top_n {
                result.retrieval.top_n = top_n;
            }
            if let Some(min_score) = retrieval.min_score {
                result.retrieval.min_score = min_score;
            }
            if retrieval.max_context_chars.is_some() {
                result.retrieval.max_context_chars = retrieval.max_context_chars;
            }
        }

        if let Some(knowledge) = config_file.knowledge {
            if let Some(corpus_file) = knowledge.corpus_file {
                result.corpus_file = Some(PathBuf::from(corpus_file));
            }
            if let Some(prompt_id) = knowledge.prompt_id {
                result.prompt_id = prompt_id;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the config file and environment variables.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = overrides.provider {
            self.provider = provider;
        }

        if let Some(model) = overrides.model {
            self.model = model;
        }

        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = Some(endpoint);
        }

        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }

        if let Some(top_n) = overrides.top_n {
            self.retrieval.top_n = top_n;
        }

        if let Some(min_score) = overrides.min_score {
            self.retrieval.min_score = min_score;
        }

        if overrides.max_context_chars.is_some() {
            self.retrieval.max_context_chars = overrides.max_context_chars;
        }

        if let Some(corpus_file) = overrides.corpus_file {
            self.corpus_file = Some(corpus_file);
        }

        if let Some(prompt_id) = overrides.prompt_id {
            self.prompt_id = prompt_id;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .kbqa directory.
    pub fn kbqa_dir(&self) -> PathBuf {
        self.workspace.join(".kbqa")
    }

    /// The endpoint requests are sent to, falling back to the provider default.
    pub fn resolved_endpoint(&self) -> String {
        if let Some(ref endpoint) = self.endpoint {
            return endpoint.clone();
        }

        match self.provider.to_lowercase().as_str() {
            "openai" | "openai-compatible" => DEFAULT_OPENAI_ENDPOINT.to_string(),
            _ => DEFAULT_OLLAMA_ENDPOINT.to_string(),
        }
    }

    /// Corpus file resolved against the workspace.
    pub fn resolved_corpus_file(&self) -> Option<PathBuf> {
        self.corpus_file.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.workspace.join(path)
            }
        })
    }

    /// Validate the configuration before any component is built.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model identifier cannot be empty".to_string()));
        }

        if self.resolved_endpoint().trim().is_empty() {
            return Err(AppError::Config("Backend endpoint cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "Timeout must be at least one second".to_string(),
            ));
        }

        if self.retrieval.top_n == 0 {
            return Err(AppError::Config("top_n must be a positive integer".to_string()));
        }

        let min_score = self.retrieval.min_score;
        if min_score.is_nan() || !(0.0..=1.0).contains(&min_score) {
            return Err(AppError::Config(format!(
                "min_score must be within [0, 1], got {}",
                min_score
            )));
        }

        if self.retrieval.max_context_chars == Some(0) {
            return Err(AppError::Config(
                "max_context_chars must be positive when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().map(PathBuf::from)
}

fn env_parse<T>(name: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid value for {}: '{}' ({})", name, raw, e))),
        Err(_) => Ok(None),
    }
}
