//! Application configuration for wikicards.
//!
//! User config lives at `~/.wikicards/wikicards.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, WikicardsError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikicards.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikicards";

// ---------------------------------------------------------------------------
// Config structs (matching wikicards.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Encyclopedia service settings.
    #[serde(default)]
    pub encyclopedia: EncyclopediaConfig,

    /// Language-model backend settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory the flashcard documents are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "tmp".into()
}

/// `[encyclopedia]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncyclopediaConfig {
    /// MediaWiki Action API endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Number of candidate titles requested per search.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_encyclopedia_timeout")]
    pub timeout_secs: u64,
}

impl Default for EncyclopediaConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            search_limit: default_search_limit(),
            timeout_secs: default_encyclopedia_timeout(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://en.wikipedia.org/w/api.php").expect("static URL is valid")
}
fn default_search_limit() -> u32 {
    10
}
fn default_encyclopedia_timeout() -> u64 {
    30
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Model used for the summary stage.
    #[serde(default = "default_model")]
    pub summary_model: String,

    /// Model used for the flashcard stage.
    #[serde(default = "default_model")]
    pub flashcards_model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            summary_model: default_model(),
            flashcards_model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> Url {
    Url::parse("https://api.openai.com/v1").expect("static URL is valid")
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_llm_timeout() -> u64 {
    180
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wikicards/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WikicardsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikicards/wikicards.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| WikicardsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        WikicardsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Read the language-model API key from the configured env var.
///
/// Called once at startup; the key is then injected into the client.
pub fn resolve_api_key(config: &LlmConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(WikicardsError::config(format!(
            "language model API key not found. Set the {var_name} environment variable \
             or add it to a .env file in the working directory."
        ))),
    }
}
