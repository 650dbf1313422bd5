//! Helpers for taking apart and reassembling asset URLs.
//!
//! The submodules split the rewrite into an eligibility check, query parsing (including the
//! content-hash filename fallback) and construction of the outgoing URL so that each step can be
//! tested on its own.

mod filters;
mod query;
mod target;

pub use filters::{is_eligible_asset_url, strip_site_root};
pub use query::{AssetQuery, parse_asset_query, single_ver_parameter, webpack_content_hash};
pub use target::build_target_url;
