//! Application configuration for the precall pipeline.
//!
//! User config lives at `~/.precall/precall.toml`. The file never stores
//! credentials — each backend section names the environment variable holding
//! its key, and presence/absence of that variable drives the
//! configured-vs-unconfigured behavior of the news fetcher, the completion
//! backend, and the CRM store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrecallError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "precall.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".precall";

// ---------------------------------------------------------------------------
// Config structs (matching precall.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fetch defaults (timeouts, content budget).
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Completion backend settings.
    #[serde(default)]
    pub completion: CompletionSection,

    /// News index settings.
    #[serde(default)]
    pub news: NewsSection,

    /// Remote CRM settings.
    #[serde(default)]
    pub crm: CrmSection,

    /// Local file store settings.
    #[serde(default)]
    pub store: StoreSection,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Character budget for sanitized website text.
    #[serde(default = "default_page_char_budget")]
    pub page_char_budget: usize,

    /// Per-call timeout for website and news fetches, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            page_char_budget: default_page_char_budget(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_page_char_budget() -> usize {
    2000
}
fn default_fetch_timeout_secs() -> u64 {
    10
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSection {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_completion_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint (OpenAI-compatible).
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,

    /// Model used for briefing synthesis.
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Sampling temperature. Kept low to favor consistent JSON output.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the completion reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call timeout in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionSection {
    fn default() -> Self {
        Self {
            api_key_env: default_completion_key_env(),
            endpoint: default_completion_endpoint(),
            model: default_completion_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

fn default_completion_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_completion_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_completion_model() -> String {
    "llama3-8b-8192".into()
}
fn default_temperature() -> f32 {
    0.5
}
fn default_max_tokens() -> u32 {
    1200
}
fn default_completion_timeout_secs() -> u64 {
    30
}

/// `[news]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSection {
    /// Name of the env var holding the news index API key.
    #[serde(default = "default_news_key_env")]
    pub api_key_env: String,

    /// News index search endpoint.
    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,

    /// Number of most-recent articles to request.
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

impl Default for NewsSection {
    fn default() -> Self {
        Self {
            api_key_env: default_news_key_env(),
            endpoint: default_news_endpoint(),
            max_articles: default_max_articles(),
        }
    }
}

fn default_news_key_env() -> String {
    "NEWS_API_KEY".into()
}
fn default_news_endpoint() -> String {
    "https://newsapi.org/v2/everything".into()
}
fn default_max_articles() -> usize {
    3
}

/// `[crm]` section.
///
/// The CRM backend is selected when both `instance_url` is set and the
/// token env var resolves; otherwise lead upserts go to the local file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmSection {
    /// Base URL of the CRM instance. Empty = not configured.
    #[serde(default)]
    pub instance_url: String,

    /// Name of the env var holding the CRM API token.
    #[serde(default = "default_crm_token_env")]
    pub api_token_env: String,
}

impl Default for CrmSection {
    fn default() -> Self {
        Self {
            instance_url: String::new(),
            api_token_env: default_crm_token_env(),
        }
    }
}

fn default_crm_token_env() -> String {
    "CRM_API_TOKEN".into()
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Path of the local lead collection file.
    #[serde(default = "default_leads_path")]
    pub leads_path: String,

    /// Path of the static context lookup table.
    #[serde(default = "default_context_path")]
    pub context_path: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            leads_path: default_leads_path(),
            context_path: default_context_path(),
        }
    }
}

fn default_leads_path() -> String {
    "leads_db.json".into()
}
fn default_context_path() -> String {
    "context_db.json".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (resolved from AppConfig + environment)
// ---------------------------------------------------------------------------

/// Runtime configuration for the website fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Character budget for sanitized page text.
    pub char_budget: usize,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            char_budget: config.defaults.page_char_budget,
            timeout_secs: config.defaults.fetch_timeout_secs,
        }
    }
}

/// Runtime configuration for the news fetcher, with the credential resolved.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// Resolved API key; `None` selects the degraded-but-successful path.
    pub api_key: Option<String>,
    /// Search endpoint.
    pub endpoint: String,
    /// Number of most-recent articles to request.
    pub max_articles: usize,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for NewsConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: resolve_env(&config.news.api_key_env),
            endpoint: config.news.endpoint.clone(),
            max_articles: config.news.max_articles,
            timeout_secs: config.defaults.fetch_timeout_secs,
        }
    }
}

/// Runtime configuration for the completion backend, with the credential
/// resolved.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Resolved API key; `None` skips the network entirely.
    pub api_key: Option<String>,
    /// Chat-completions endpoint.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the reply.
    pub max_tokens: u32,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for CompletionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: resolve_env(&config.completion.api_key_env),
            endpoint: config.completion.endpoint.clone(),
            model: config.completion.model.clone(),
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
            timeout_secs: config.completion.timeout_secs,
        }
    }
}

/// Runtime configuration for the remote CRM store.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Base URL of the CRM instance.
    pub instance_url: String,
    /// Resolved API token.
    pub api_token: String,
}

impl CrmConfig {
    /// Resolve the CRM config, or `None` when the backend is not configured.
    pub fn from_app(config: &AppConfig) -> Option<Self> {
        if config.crm.instance_url.trim().is_empty() {
            return None;
        }
        let api_token = resolve_env(&config.crm.api_token_env)?;
        Some(Self {
            instance_url: config.crm.instance_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }
}

/// Resolve an environment variable to a non-empty value.
pub fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.precall/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PrecallError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.precall/precall.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PrecallError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PrecallError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PrecallError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PrecallError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PrecallError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GROQ_API_KEY"));
        assert!(toml_str.contains("NEWS_API_KEY"));
        assert!(toml_str.contains("leads_db.json"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.page_char_budget, 2000);
        assert_eq!(parsed.news.max_articles, 3);
        assert_eq!(parsed.completion.model, "llama3-8b-8192");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
page_char_budget = 500

[crm]
instance_url = "https://crm.example.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.page_char_budget, 500);
        assert_eq!(config.defaults.fetch_timeout_secs, 10);
        assert_eq!(config.crm.instance_url, "https://crm.example.com");
        assert_eq!(config.crm.api_token_env, "CRM_API_TOKEN");
    }

    #[test]
    fn resolve_env_treats_empty_as_absent() {
        // Use unique env var names to avoid interfering with other tests
        unsafe { std::env::set_var("PRECALL_TEST_EMPTY_KEY", "  ") };
        assert_eq!(resolve_env("PRECALL_TEST_EMPTY_KEY"), None);
        assert_eq!(resolve_env("PRECALL_TEST_UNSET_KEY_12345"), None);

        unsafe { std::env::set_var("PRECALL_TEST_SET_KEY", "secret") };
        assert_eq!(resolve_env("PRECALL_TEST_SET_KEY"), Some("secret".into()));
    }

    #[test]
    fn crm_config_requires_instance_url_and_token() {
        let mut app = AppConfig::default();
        assert!(CrmConfig::from_app(&app).is_none());

        app.crm.instance_url = "https://crm.example.com/".into();
        app.crm.api_token_env = "PRECALL_TEST_CRM_TOKEN".into();
        assert!(CrmConfig::from_app(&app).is_none());

        unsafe { std::env::set_var("PRECALL_TEST_CRM_TOKEN", "tok") };
        let crm = CrmConfig::from_app(&app).expect("configured");
        assert_eq!(crm.instance_url, "https://crm.example.com");
        assert_eq!(crm.api_token, "tok");
    }

    #[test]
    fn runtime_configs_derive_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.char_budget, 2000);
        assert_eq!(fetch.timeout_secs, 10);

        let completion = CompletionConfig::from(&app);
        assert_eq!(completion.max_tokens, 1200);
        assert!((completion.temperature - 0.5).abs() < f32::EPSILON);
    }
}
