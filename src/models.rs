//! Data structures shared by the rewriter, configuration and CLI.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Host serving WordPress.org static assets.
pub const DEFAULT_CDN_HOST: &str = "s.w.org";

/// WordPress environment classification, mirroring `wp_get_environment_type()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  /// Local developer machine.
  Local,
  /// Shared development install.
  Development,
  /// Pre-release staging install.
  Staging,
  /// Live site. WordPress falls back to this when nothing is configured.
  #[default]
  Production,
}

impl Environment {
  /// Returns `true` for the production environment.
  pub fn is_production(self) -> bool {
    self == Self::Production
  }

  /// Lowercase name as used by `WP_ENVIRONMENT_TYPE`.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Local => "local",
      Self::Development => "development",
      Self::Staging => "staging",
      Self::Production => "production",
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error returned when an environment name is not one WordPress recognises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnvironment(pub String);

impl fmt::Display for UnknownEnvironment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unknown environment type `{}`", self.0)
  }
}

impl std::error::Error for UnknownEnvironment {}

impl FromStr for Environment {
  type Err = UnknownEnvironment;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "local" => Ok(Self::Local),
      "development" => Ok(Self::Development),
      "staging" => Ok(Self::Staging),
      "production" => Ok(Self::Production),
      _ => Err(UnknownEnvironment(value.to_string())),
    }
  }
}

/// Which loader filter handed the URL to the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
  /// `style_loader_src`
  Style,
  /// `script_loader_src`
  Script,
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Style => f.write_str("style"),
      Self::Script => f.write_str("script"),
    }
  }
}

/// Cache-busting value carried in the `ver` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBusterVersion {
  /// Opaque token such as a content hash or release number.
  Token(String),
  /// Numeric value that passed the timestamp plausibility check.
  Timestamp {
    /// Text the version is written out as.
    raw: String,
    /// Whole seconds since the Unix epoch.
    value: u64,
  },
}

impl fmt::Display for CacheBusterVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Token(token) => f.write_str(token),
      Self::Timestamp { raw, .. } => f.write_str(raw),
    }
  }
}

/// Request-scoped inputs that the CMS would otherwise provide through globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteContext {
  /// Site URL that eligible links start with, e.g. `https://wordpress.org/`.
  pub site_root: String,
  /// Physical directory the site URL maps onto (`ABSPATH`).
  pub site_root_path: PathBuf,
  /// Host header of the current request.
  pub request_host: String,
  /// Environment the site is running in.
  pub environment: Environment,
  /// Opt-in to the CDN outside production (`USE_WPORG_CDN`).
  pub use_cdn_override: bool,
  /// Host substituted when the CDN is in use.
  pub cdn_host: String,
}

impl RewriteContext {
  /// Whether rewritten links should point at the CDN host.
  pub fn use_cdn(&self) -> bool {
    self.environment.is_production() || self.use_cdn_override
  }

  /// Host placed in front of rewritten links.
  pub fn target_host(&self) -> &str {
    if self.use_cdn() {
      &self.cdn_host
    } else {
      &self.request_host
    }
  }
}
