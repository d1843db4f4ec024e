//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizdeck_core::model::Filter;
use quizdeck_core::selection::{KeepOrder, SelectionPolicy, ShuffleWithinCategories};
use quizdeck_core::traits::QuestionStore;

use crate::fs::FileStore;
use crate::http::HttpStore;

/// File name searched for in the current directory.
pub const CONFIG_FILE: &str = "quizdeck.toml";

/// Which backend serves question sets.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Http {
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
    },
    Files {
        #[serde(default = "default_data_root")]
        root: PathBuf,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Http { base_url, api_key } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .finish(),
            StoreConfig::Files { root } => f.debug_struct("Files").field("root", root).finish(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Files {
            root: default_data_root(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./data")
}

/// Top-level quizdeck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizdeckConfig {
    /// Store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Filter used when no filter flags are given.
    #[serde(default)]
    pub default_filter: Filter,
    /// Seconds to wait for any store call.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Shuffle questions within categories of categorized sets.
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    /// Fixed shuffle seed, for reproducible ordering.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
    /// Output directory for quiz reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_timeout() -> u64 {
    30
}
fn default_shuffle() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizdeck-results")
}

impl Default for QuizdeckConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            default_filter: Filter::default(),
            request_timeout_secs: default_timeout(),
            shuffle: default_shuffle(),
            shuffle_seed: None,
            output_dir: default_output_dir(),
        }
    }
}

impl QuizdeckConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Selection policy for categorized sets.
    pub fn selection_policy(&self) -> Box<dyn SelectionPolicy> {
        if self.shuffle {
            Box::new(ShuffleWithinCategories)
        } else {
            Box::new(KeepOrder)
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + len];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + len + 1..]);
        from = start + value.len();
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Http { base_url, api_key } => StoreConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_key: api_key
                .as_ref()
                .map(|k| resolve_env_vars(k))
                .filter(|k| !k.is_empty()),
        },
        StoreConfig::Files { root } => StoreConfig::Files {
            root: PathBuf::from(resolve_env_vars(&root.to_string_lossy())),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizdeck.toml` in the current directory
/// 2. `~/.config/quizdeck/config.toml`
///
/// Environment variable overrides: `QUIZDECK_STORE_URL`, `QUIZDECK_API_KEY`.
pub fn load_config() -> Result<QuizdeckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdeckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuizdeckConfig::default(),
    };

    Ok(apply_env_overrides(
        config,
        std::env::var("QUIZDECK_STORE_URL").ok(),
        std::env::var("QUIZDECK_API_KEY").ok(),
    ))
}

/// Parse a TOML config document.
pub fn parse_config(content: &str) -> Result<QuizdeckConfig> {
    let mut config: QuizdeckConfig = toml::from_str(content)?;
    config.store = resolve_store_config(&config.store);
    Ok(config)
}

fn apply_env_overrides(
    mut config: QuizdeckConfig,
    store_url: Option<String>,
    api_key: Option<String>,
) -> QuizdeckConfig {
    if let Some(url) = store_url.filter(|u| !u.is_empty()) {
        let existing_key = match &config.store {
            StoreConfig::Http { api_key, .. } => api_key.clone(),
            StoreConfig::Files { .. } => None,
        };
        config.store = StoreConfig::Http {
            base_url: url,
            api_key: existing_key,
        };
    }

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        if let StoreConfig::Http { api_key, .. } = &mut config.store {
            *api_key = Some(key);
        }
    }

    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdeck"))
}

/// Create a store instance from the configuration.
pub fn create_store(config: &QuizdeckConfig) -> Result<Box<dyn QuestionStore>> {
    match &config.store {
        StoreConfig::Http { base_url, api_key } => {
            let store = HttpStore::new(base_url, api_key.clone(), config.request_timeout())
                .with_context(|| format!("failed to create HTTP store for {base_url}"))?
                .with_policy(config.selection_policy())
                .with_seed(config.shuffle_seed);
            Ok(Box::new(store))
        }
        StoreConfig::Files { root } => Ok(Box::new(
            FileStore::new(root)
                .with_policy(config.selection_policy())
                .with_seed(config.shuffle_seed),
        )),
    }
}
