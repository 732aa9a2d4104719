//! Configuration for the Sentinel registry server.

use std::path::{Path, PathBuf};

use sentinel_api::PlatformAccount;
use serde::Deserialize;

/// Environment variables with this prefix override file settings,
/// e.g. `SENTINEL_PORT=9000`.
pub const ENV_PREFIX: &str = "SENTINEL";

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/sentinel/registry.db") }

fn default_admin_name() -> String { "Platform Admin".to_string() }

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                         String,
  #[serde(default = "default_port")]
  pub port:                         u16,
  #[serde(default = "default_store_path")]
  pub store_path:                   PathBuf,
  pub platform_admin_email:         String,
  #[serde(default = "default_admin_name")]
  pub platform_admin_name:          String,
  /// PHC string; generate with `sentinel-server --hash-password`.
  pub platform_admin_password_hash: String,
}

impl ServerConfig {
  /// Build a config from an optional TOML file plus `SENTINEL_*` variables.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn platform_account(&self) -> PlatformAccount {
    PlatformAccount {
      name:          self.platform_admin_name.clone(),
      email:         self.platform_admin_email.clone(),
      password_hash: self.platform_admin_password_hash.clone(),
    }
  }
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
