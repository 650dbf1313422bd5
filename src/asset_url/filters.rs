/// Domain every rewritable asset URL must mention.
const ELIGIBLE_DOMAIN: &str = "wordpress.org";

/// Hosts that serve their own assets and must never be rewritten.
const EXCLUDED_HOSTS: &[&str] = &["profiles.wordpress.org"];

/// Determine whether a link is a WordPress.org asset served from the current site.
///
/// Links outside the site root, links that do not mention `wordpress.org` and links on the
/// profiles subdomain are left alone.
pub fn is_eligible_asset_url(link: &str, site_root: &str) -> bool {
    link.starts_with(site_root)
        && link.contains(ELIGIBLE_DOMAIN)
        && !EXCLUDED_HOSTS.iter().any(|host| link.contains(host))
}

/// Remove the site root from the front of an eligible link.
pub fn strip_site_root<'a>(link: &'a str, site_root: &str) -> Option<&'a str> {
    link.strip_prefix(site_root)
}
