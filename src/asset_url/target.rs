use url::form_urlencoded;

use super::query::VER_PARAMETER;

/// Assemble the outgoing asset URL for the chosen host.
///
/// The path is always joined to the host with a single slash, so site roots configured with or
/// without a trailing slash produce the same result. The version is form-encoded.
pub fn build_target_url(host: &str, filepath: &str, version: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(VER_PARAMETER, version)
        .finish();

    format!(
        "https://{}/{}?{}",
        host.trim_end_matches('/'),
        filepath.trim_start_matches('/'),
        query
    )
}
