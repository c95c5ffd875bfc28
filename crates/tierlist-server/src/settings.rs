//! Server configuration, read from `config.toml` and `TIERLIST_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tierlist_core::config::BotConfig;
use tierlist_scrape::{CatalogSource, default_sources};

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  /// argon2 PHC string; see `server --hash-password`.
  pub auth_password_hash: String,
  pub bot:                BotConfig,
  #[serde(default)]
  pub catalog:            CatalogConfig,
}

/// Where `/subjects/refresh` scrapes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
  pub sources:      Vec<CatalogSource>,
  pub timeout_secs: u64,
}

impl Default for CatalogConfig {
  fn default() -> Self { Self { sources: default_sources(), timeout_secs: 30 } }
}

/// Layer the optional file at `path` under the environment.
///
/// Nested keys use a double underscore: `TIERLIST_BOT__ADMIN_ID`.
pub fn load(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("TIERLIST")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
