//! Rewriter configuration loaded from JSON and the WordPress environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{DEFAULT_CDN_HOST, Environment, RewriteContext};

/// Configuration file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "wporg-cdn.config.json";

/// Variable WordPress reads the environment type from.
pub const ENVIRONMENT_TYPE_VAR: &str = "WP_ENVIRONMENT_TYPE";

/// Variable opting non-production environments into the CDN.
pub const USE_CDN_VAR: &str = "USE_WPORG_CDN";

/// Site description used to build a [`RewriteContext`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriterConfig {
  /// Site URL eligible asset links start with.
  pub site_url: String,
  /// Document root the site URL is served from.
  pub abspath: PathBuf,
  /// Host used for links when the CDN is not in use.
  pub request_host: String,
  /// Environment type of the install.
  pub environment: Environment,
  /// Opt-in to the CDN outside production.
  pub use_wporg_cdn: bool,
  /// CDN host substituted into rewritten links.
  pub cdn_host: String,
}

impl Default for RewriterConfig {
  fn default() -> Self {
    Self {
      site_url: "https://wordpress.org/".into(),
      abspath: PathBuf::from("/var/www/wordpress"),
      request_host: "wordpress.org".into(),
      environment: Environment::Production,
      use_wporg_cdn: false,
      cdn_host: DEFAULT_CDN_HOST.into(),
    }
  }
}

/// Errors that can occur while loading the configuration file.
#[derive(Debug)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration file.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl RewriterConfig {
  /// Read configuration from a JSON file, reporting read and parse failures.
  ///
  /// A file that does not exist is not an error and produces the defaults.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(ConfigError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
      path: path.to_path_buf(),
      source: err,
    })
  }

  /// Apply `WP_ENVIRONMENT_TYPE` and `USE_WPORG_CDN` from the given variable lookup.
  ///
  /// Unknown environment types are ignored, matching WordPress.
  pub fn apply_env_overrides<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(value) = lookup(ENVIRONMENT_TYPE_VAR) {
      match value.parse() {
        Ok(environment) => self.environment = environment,
        Err(err) => tracing::warn!("ignoring {ENVIRONMENT_TYPE_VAR}: {err}"),
      }
    }

    if let Some(value) = lookup(USE_CDN_VAR) {
      self.use_wporg_cdn = is_truthy(&value);
    }
  }

  /// Apply overrides from the process environment.
  pub fn with_process_env(mut self) -> Self {
    self.apply_env_overrides(|name| std::env::var(name).ok());
    self
  }

  /// Build the request context consumed by the rewriter.
  pub fn to_context(&self) -> RewriteContext {
    RewriteContext {
      site_root: self.site_url.clone(),
      site_root_path: self.abspath.clone(),
      request_host: self.request_host.clone(),
      environment: self.environment,
      use_cdn_override: self.use_wporg_cdn,
      cdn_host: self.cdn_host.clone(),
    }
  }
}

fn is_truthy(value: &str) -> bool {
  matches!(
    value.trim().to_ascii_lowercase().as_str(),
    "1" | "true" | "yes" | "on"
  )
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io { path, source } => {
        write!(f, "failed to read {}: {}", path.display(), source)
      }
      Self::Parse { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
    }
  }
}
