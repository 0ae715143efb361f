//! Runtime configuration.
//!
//! Resolution order, later wins:
//! 1. built-in defaults
//! 2. `<home>/config.toml` (optional)
//! 3. environment: `DOCGEN_MODEL`, `OPENAI_BASE_URL`, `DOCGEN_TIMEOUT_SECS`
//!
//! `<home>` is `DOCGEN_HOME` when set, otherwise `~/.docgen`. The API key is
//! captured from `OPENAI_API_KEY` but only checked when a remote call is about
//! to happen, so commands that never reach the model work without one.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::DocgenError;

pub const HOME_ENV: &str = "DOCGEN_HOME";
pub const MODEL_ENV: &str = "DOCGEN_MODEL";
pub const API_BASE_ENV: &str = "OPENAI_BASE_URL";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const TIMEOUT_ENV: &str = "DOCGEN_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OUTPUT_DIR: &str = "docs";
/// Long enough for a large file; matches the official OpenAI SDKs.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
const HOME_DIR_NAME: &str = ".docgen";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    model: Option<String>,
    api_base: Option<String>,
    output_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the ledger and `config.toml`.
    pub home: PathBuf,
    pub model: String,
    pub api_base: String,
    /// Default `--output` for `generate`.
    pub output_dir: PathBuf,
    pub api_key: Option<String>,
    /// Whole-request limit for one model call.
    pub request_timeout: Duration,
}

impl Config {
    /// Resolve against the process environment.
    pub fn load() -> Result<Self, DocgenError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration using `lookup` for environment variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DocgenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let home = match non_empty(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|h| h.join(HOME_DIR_NAME))
                .ok_or_else(|| {
                    DocgenError::Config(format!(
                        "cannot determine home directory; set {}",
                        HOME_ENV
                    ))
                })?,
        };

        let file = read_config_file(&home)?;

        let mut config = Config {
            home,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            api_key: non_empty(API_KEY_ENV),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        if let Some(model) = file.model {
            config.model = model;
        }
        if let Some(api_base) = file.api_base {
            config.api_base = api_base;
        }
        if let Some(output_dir) = file.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(secs) = file.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            config.model = model;
        }
        if let Some(api_base) = non_empty(API_BASE_ENV) {
            config.api_base = api_base;
        }
        if let Some(raw) = non_empty(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                DocgenError::Config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    TIMEOUT_ENV, raw
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        config.api_base = config.api_base.trim_end_matches('/').to_string();

        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }
}

/// Load `.env` from the working directory (or a parent) into the process
/// environment. Variables already set are not overridden.
pub fn load_dotenv() -> Result<Option<PathBuf>, DocgenError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(DocgenError::Config(format!(".env: {}", e))),
    }
}

fn read_config_file(home: &Path) -> Result<ConfigFile, DocgenError> {
    let path = home.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| DocgenError::Config(format!("{}: {}", path.display(), e)))
}
