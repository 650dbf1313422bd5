use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::{TempDir, tempdir};
use wporg_asset_cdn::{AssetUrlRewriter, Environment, RewriteContext, RewriterConfig};

const NOW: u64 = 1_760_000_000;

fn site(environment: Environment) -> (TempDir, AssetUrlRewriter) {
    let root = tempdir().expect("failed to create temp dir");
    let config = RewriterConfig {
        abspath: root.path().to_path_buf(),
        request_host: "make.wordpress.org".into(),
        environment,
        ..RewriterConfig::default()
    };
    (root, AssetUrlRewriter::new(config.to_context()))
}

fn write_asset(root: &Path, relative: &str, modified: u64) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create asset dir");
    }
    let file = fs::File::create(&path).expect("failed to create asset");
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(modified))
        .expect("failed to set mtime");
    path
}

#[test]
fn release_version_is_replaced_by_bucketed_mtime() {
    let (root, rewriter) = site(Environment::Production);
    write_asset(root.path(), "wp-includes/js/jquery/jquery.js", 1_700_000_100);

    assert_eq!(
        rewriter.rewrite(
            "https://wordpress.org/wp-includes/js/jquery/jquery.js?ver=3.7.1",
            NOW
        ),
        "https://s.w.org/wp-includes/js/jquery/jquery.js?ver=1700000040"
    );
}

#[test]
fn missing_file_keeps_release_version() {
    let (_root, rewriter) = site(Environment::Production);

    assert_eq!(
        rewriter.rewrite("https://wordpress.org/wp-includes/css/admin.css?ver=6.4.2", NOW),
        "https://s.w.org/wp-includes/css/admin.css?ver=6.4.2"
    );
}

#[test]
fn future_timestamp_is_treated_as_token() {
    let (_root, rewriter) = site(Environment::Production);

    assert_eq!(
        rewriter.rewrite("https://wordpress.org/wp-includes/js/jquery.js?ver=9999999999", NOW),
        "https://s.w.org/wp-includes/js/jquery.js?ver=9999999999"
    );
}

#[test]
fn webpack_bundle_uses_file_mtime() {
    let (root, rewriter) = site(Environment::Production);
    write_asset(
        root.path(),
        "wp-content/themes/wporg/build/app.a1b2c3d4.min.js",
        1_700_000_000,
    );

    assert_eq!(
        rewriter.filter_script_loader_src(
            "https://wordpress.org/wp-content/themes/wporg/build/app.a1b2c3d4.min.js",
            "wporg-app"
        ),
        "https://s.w.org/wp-content/themes/wporg/build/app.a1b2c3d4.min.js?ver=1699999920"
    );
}

#[test]
fn webpack_bundle_without_file_keeps_hash() {
    let (_root, rewriter) = site(Environment::Production);

    assert_eq!(
        rewriter.rewrite("https://wordpress.org/build/app.a1b2c3d4.js", NOW),
        "https://s.w.org/build/app.a1b2c3d4.js?ver=a1b2c3d4"
    );
}

#[test]
fn staging_keeps_request_host_and_raw_mtime() {
    let (root, rewriter) = site(Environment::Staging);
    write_asset(root.path(), "style.css", 1_700_000_100);

    assert_eq!(
        rewriter.filter_style_loader_src("https://wordpress.org/style.css?ver=abc", "wporg-style"),
        "https://make.wordpress.org/style.css?ver=1700000100"
    );
}

#[test]
fn override_sends_non_production_to_cdn() {
    let root = tempdir().expect("failed to create temp dir");
    let rewriter = AssetUrlRewriter::new(RewriteContext {
        site_root: "https://wordpress.org/".into(),
        site_root_path: root.path().to_path_buf(),
        request_host: "localhost".into(),
        environment: Environment::Local,
        use_cdn_override: true,
        cdn_host: "s.w.org".into(),
    });

    assert_eq!(
        rewriter.rewrite("https://wordpress.org/style.css?ver=1700000100", NOW),
        "https://s.w.org/style.css?ver=1700000100"
    );
}

#[test]
fn ineligible_links_are_untouched() {
    let (_root, rewriter) = site(Environment::Production);

    for link in [
        "https://example.com/style.css?ver=1",
        "https://profiles.wordpress.org/style.css?ver=1",
        "https://wordpress.org/style.css?ver=1&foo=bar",
        "https://wordpress.org/style.css?foo=bar",
        "https://wordpress.org/style.css?ver=",
        "https://wordpress.org/style.css",
        "/wp-includes/js/jquery.js?ver=1",
    ] {
        assert_eq!(rewriter.rewrite(link, NOW), link);
    }
}
