//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::DEFAULT_BASE_URL;

/// Top-level quizform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizformConfig {
    /// Server hosting the units, generation, and PDF endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where generated previews, problem sets, and PDFs are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizform-output")
}

impl Default for QuizformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + len];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + len + 1..]);
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `quizform.toml` in the current directory
/// 2. `~/.config/quizform/config.toml`
///
/// `QUIZFORM_BASE_URL` overrides the configured base URL.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizformConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizform.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizformConfig::default(),
    };

    if let Ok(url) = std::env::var("QUIZFORM_BASE_URL") {
        if !url.trim().is_empty() {
            config.base_url = url;
        }
    }

    Ok(config)
}

/// Parse a TOML config string, resolving `${VAR}` references.
pub fn parse_config(content: &str) -> Result<QuizformConfig> {
    let mut config: QuizformConfig = toml::from_str(content)?;
    config.base_url = resolve_env_vars(&config.base_url);
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizform"))
}
