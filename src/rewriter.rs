//! Asset URL rewriter invoked from the style and script loader filters.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::asset_url::{
  build_target_url, is_eligible_asset_url, parse_asset_query, single_ver_parameter,
  strip_site_root,
};
use crate::models::{AssetKind, RewriteContext};
use crate::versioning::{FilesystemModificationTime, ModificationTimeLookup, resolve_version};

/// Rewrite a single asset URL onto the CDN host.
///
/// Every link that cannot be rewritten is returned exactly as it was passed in, so callers always
/// receive a usable URL.
pub fn rewrite_asset_url<L>(link: &str, context: &RewriteContext, lookup: &L, now: u64) -> String
where
  L: ModificationTimeLookup + ?Sized,
{
  if !is_eligible_asset_url(link, &context.site_root) {
    tracing::trace!(link, "not a wordpress.org asset on this site");
    return link.to_string();
  }

  let Some(relative_url) = strip_site_root(link, &context.site_root) else {
    return link.to_string();
  };

  let query = parse_asset_query(relative_url);
  let Some(ver) = single_ver_parameter(&query.params) else {
    tracing::trace!(link, "asset does not carry a lone ver parameter");
    return link.to_string();
  };

  let file = context
    .site_root_path
    .join(query.filepath.trim_start_matches('/'));
  let mut version = resolve_version(ver, &file, lookup, now);
  if context.environment.is_production() {
    version = version.bucketed();
  }

  build_target_url(context.target_host(), query.filepath, &version.to_string())
}

/// Rewriter bound to a request context and a modification-time source.
#[derive(Debug, Clone)]
pub struct AssetUrlRewriter<L = FilesystemModificationTime> {
  context: RewriteContext,
  lookup: L,
}

impl AssetUrlRewriter<FilesystemModificationTime> {
  /// Create a rewriter that reads modification times from the local filesystem.
  pub fn new(context: RewriteContext) -> Self {
    Self::with_lookup(context, FilesystemModificationTime)
  }
}

impl<L: ModificationTimeLookup> AssetUrlRewriter<L> {
  /// Create a rewriter with a custom modification-time source.
  pub fn with_lookup(context: RewriteContext, lookup: L) -> Self {
    Self { context, lookup }
  }

  /// Rewrite `link` using `now` as the current Unix time.
  pub fn rewrite(&self, link: &str, now: u64) -> String {
    rewrite_asset_url(link, &self.context, &self.lookup, now)
  }

  /// Rewrite a link handed over by one of the loader filters.
  pub fn filter_loader_src(&self, kind: AssetKind, link: &str, handle: &str, now: u64) -> String {
    let rewritten = self.rewrite(link, now);
    if rewritten != link {
      tracing::debug!(%kind, handle, from = link, to = %rewritten, "rewrote asset url");
    }
    rewritten
  }

  /// `style_loader_src` filter callback.
  pub fn filter_style_loader_src(&self, link: &str, handle: &str) -> String {
    self.filter_loader_src(AssetKind::Style, link, handle, unix_now())
  }

  /// `script_loader_src` filter callback.
  pub fn filter_script_loader_src(&self, link: &str, handle: &str) -> String {
    self.filter_loader_src(AssetKind::Script, link, handle, unix_now())
  }
}

/// Current Unix time in whole seconds. A clock before the epoch reads as zero.
pub fn unix_now() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|elapsed| elapsed.as_secs())
    .unwrap_or_default()
}
