#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_url;
pub mod config;
pub mod logging;
pub mod models;
pub mod rewriter;
pub mod versioning;

pub use config::{ConfigError, RewriterConfig};
pub use models::{AssetKind, CacheBusterVersion, Environment, RewriteContext};
pub use rewriter::{AssetUrlRewriter, rewrite_asset_url, unix_now};
pub use versioning::{FilesystemModificationTime, ModificationTimeLookup};
