use std::collections::BTreeMap;

use regex::Regex;
use url::form_urlencoded;

/// Name of the cache-busting query parameter WordPress appends to enqueued assets.
pub const VER_PARAMETER: &str = "ver";

fn webpack_hash_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\.([a-f0-9]{8})(\.min)?\.js$").expect("invalid webpack hash regex")
    })
}

/// Site-relative asset path split into its file path and decoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery<'a> {
    /// Path relative to the site root, without the query string.
    pub filepath: &'a str,
    /// Decoded query parameters. A repeated key keeps its last value.
    pub params: BTreeMap<String, String>,
}

/// Split a site-relative URL on its first `?` and decode the query string.
///
/// When there is no query string, script filenames carrying an eight character content hash
/// (`app.a1b2c3d4.min.js`) are treated as if the hash had been passed as `ver`.
pub fn parse_asset_query(relative_url: &str) -> AssetQuery<'_> {
    let (filepath, params) = match relative_url.split_once('?') {
        Some((filepath, query)) => (
            filepath,
            form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect::<BTreeMap<_, _>>(),
        ),
        None => {
            let mut params = BTreeMap::new();
            if let Some(hash) = webpack_content_hash(relative_url) {
                params.insert(VER_PARAMETER.to_string(), hash.to_string());
            }
            (relative_url, params)
        }
    };

    AssetQuery { filepath, params }
}

/// Extract the content hash from a webpack-style filename such as `main.0123abcd.js`.
pub fn webpack_content_hash(filepath: &str) -> Option<&str> {
    webpack_hash_pattern()
        .captures(filepath)
        .and_then(|caps| caps.get(1))
        .map(|hash| hash.as_str())
}

/// Return the `ver` value when it is the only parameter and is non-empty.
pub fn single_ver_parameter(params: &BTreeMap<String, String>) -> Option<&str> {
    if params.len() != 1 {
        return None;
    }

    params
        .get(VER_PARAMETER)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
