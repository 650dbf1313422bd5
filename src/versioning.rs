//! Cache-buster classification, modification-time lookups and timestamp bucketing.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use regex::Regex;

use crate::models::CacheBusterVersion;

/// Earliest value accepted as a timestamp (2010-01-01T00:00:00Z).
pub const TIMESTAMP_FLOOR: u64 = 1_262_304_000;

/// Width of the rolling window production timestamps are collapsed into, in seconds.
pub const BUCKET_WINDOW_SECS: u64 = 120;

/// Source of file modification times used to replace opaque version tokens.
pub trait ModificationTimeLookup {
  /// Seconds since the Unix epoch at which `path` was last modified, if known.
  fn modified_at(&self, path: &Path) -> Option<u64>;
}

impl<F> ModificationTimeLookup for F
where
  F: Fn(&Path) -> Option<u64>,
{
  fn modified_at(&self, path: &Path) -> Option<u64> {
    self(path)
  }
}

/// Lookup backed by `stat` on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemModificationTime;

impl ModificationTimeLookup for FilesystemModificationTime {
  fn modified_at(&self, path: &Path) -> Option<u64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    modified
      .duration_since(UNIX_EPOCH)
      .ok()
      .map(|elapsed| elapsed.as_secs())
  }
}

fn numeric_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
      .expect("invalid numeric regex")
  })
}

/// Returns `true` when `value` is numeric and lies between 2010 and `now`.
///
/// Signed, fractional and exponent forms count as numeric, as does surrounding whitespace.
/// Small numbers, hashes and future timestamps are all rejected.
pub fn is_timestamp(value: &str, now: u64) -> bool {
  parse_timestamp(value, now).is_some()
}

/// Whole seconds of a plausible timestamp, rounded down.
fn parse_timestamp(value: &str, now: u64) -> Option<u64> {
  let trimmed = value.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));
  if !numeric_pattern().is_match(trimmed) {
    return None;
  }

  let number = trimmed.parse::<f64>().ok()?;
  if number < TIMESTAMP_FLOOR as f64 || number > now as f64 {
    return None;
  }

  Some(number.floor() as u64)
}

/// Round a timestamp down to the start of its two-minute window.
pub fn bucket_timestamp(timestamp: u64) -> u64 {
  timestamp / BUCKET_WINDOW_SECS * BUCKET_WINDOW_SECS
}

impl CacheBusterVersion {
  /// Classify a raw `ver` value relative to the current time.
  ///
  /// The original text is kept so that a version that is not bucketed is written back as-is.
  pub fn classify(value: &str, now: u64) -> Self {
    match parse_timestamp(value, now) {
      Some(timestamp) => Self::Timestamp {
        raw: value.to_string(),
        value: timestamp,
      },
      None => Self::Token(value.to_string()),
    }
  }

  /// Collapse timestamps into their bucket; tokens are returned unchanged.
  pub fn bucketed(self) -> Self {
    match self {
      Self::Timestamp { value, .. } => {
        let bucket = bucket_timestamp(value);
        Self::Timestamp {
          raw: bucket.to_string(),
          value: bucket,
        }
      }
      token => token,
    }
  }
}

/// Pick the version for an asset from its `ver` value and the file on disk.
///
/// Values that are not timestamps are replaced by the file's modification time when one can be
/// read. A missing file or a zero modification time keeps the original value.
pub fn resolve_version<L>(ver: &str, file: &Path, lookup: &L, now: u64) -> CacheBusterVersion
where
  L: ModificationTimeLookup + ?Sized,
{
  if is_timestamp(ver, now) {
    return CacheBusterVersion::classify(ver, now);
  }

  match lookup.modified_at(file) {
    Some(modified) if modified > 0 => {
      tracing::trace!(path = %file.display(), modified, "using file modification time as version");
      CacheBusterVersion::classify(&modified.to_string(), now)
    }
    _ => {
      tracing::trace!(path = %file.display(), "no modification time, keeping ver token");
      CacheBusterVersion::classify(ver, now)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::path::PathBuf;
  use std::time::{Duration, SystemTime};
  use tempfile::tempdir;

  const NOW: u64 = 1_760_000_000;

  fn timestamp(raw: &str, value: u64) -> CacheBusterVersion {
    CacheBusterVersion::Timestamp {
      raw: raw.into(),
      value,
    }
  }

  #[test]
  fn accepts_plausible_timestamps() {
    assert!(is_timestamp("1262304000", NOW));
    assert!(is_timestamp("1700000000", NOW));
    assert!(is_timestamp(&NOW.to_string(), NOW));
  }

  #[test]
  fn accepts_other_numeric_forms() {
    assert!(is_timestamp("+1700000000", NOW));
    assert!(is_timestamp("1700000000.5", NOW));
    assert!(is_timestamp(" 1700000000\n", NOW));
    assert!(is_timestamp("1.7e9", NOW));
    assert!(is_timestamp("01700000000", NOW));
  }

  #[test]
  fn rejects_values_outside_the_window() {
    assert!(!is_timestamp("1262303999", NOW));
    assert!(!is_timestamp("9999999999", NOW));
    assert!(!is_timestamp("6.4.2", NOW));
    assert!(!is_timestamp("a1b2c3d4", NOW));
    assert!(!is_timestamp("-1700000000", NOW));
    assert!(!is_timestamp("", NOW));
    assert!(!is_timestamp("99999999999999999999999", NOW));
    assert!(!is_timestamp("inf", NOW));
    assert!(!is_timestamp("NaN", NOW));
    assert!(!is_timestamp("0x6553F100", NOW));
    assert!(!is_timestamp("1_700_000_000", NOW));
  }

  #[test]
  fn buckets_into_two_minute_windows() {
    assert_eq!(bucket_timestamp(1_700_000_000), 1_699_999_920);
    assert_eq!(bucket_timestamp(1_699_999_920), 1_699_999_920);
    assert_eq!(bucket_timestamp(1_700_000_039), 1_699_999_920);
    assert_eq!(bucket_timestamp(1_700_000_040), 1_700_000_040);
  }

  #[test]
  fn classifies_and_buckets_versions() {
    assert_eq!(
      CacheBusterVersion::classify("1700000000", NOW).bucketed(),
      timestamp("1699999920", 1_699_999_920)
    );
    assert_eq!(
      CacheBusterVersion::classify("1700000000.5", NOW).bucketed(),
      timestamp("1699999920", 1_699_999_920)
    );
    assert_eq!(
      CacheBusterVersion::classify("20240101", NOW).bucketed(),
      CacheBusterVersion::Token("20240101".into())
    );
  }

  #[test]
  fn classification_keeps_the_original_text() {
    let version = CacheBusterVersion::classify("01700000000", NOW);
    assert_eq!(version, timestamp("01700000000", 1_700_000_000));
    assert_eq!(version.to_string(), "01700000000");
  }

  #[test]
  fn timestamps_skip_the_lookup() {
    let calls = RefCell::new(Vec::<PathBuf>::new());
    let lookup = |path: &Path| -> Option<u64> {
      calls.borrow_mut().push(path.to_path_buf());
      Some(1_700_000_500)
    };

    let version = resolve_version("1700000000", Path::new("/srv/a.js"), &lookup, NOW);
    assert_eq!(version, timestamp("1700000000", 1_700_000_000));
    assert!(calls.borrow().is_empty());
  }

  #[test]
  fn tokens_are_replaced_by_modification_time() {
    let lookup = |_: &Path| -> Option<u64> { Some(1_700_000_500) };
    let version = resolve_version("6.4.2", Path::new("/srv/a.js"), &lookup, NOW);
    assert_eq!(version, timestamp("1700000500", 1_700_000_500));
  }

  #[test]
  fn missing_or_zero_modification_time_keeps_token() {
    let missing = |_: &Path| -> Option<u64> { None };
    let zero = |_: &Path| -> Option<u64> { Some(0) };

    assert_eq!(
      resolve_version("6.4.2", Path::new("/srv/a.js"), &missing, NOW),
      CacheBusterVersion::Token("6.4.2".into())
    );
    assert_eq!(
      resolve_version("6.4.2", Path::new("/srv/a.js"), &zero, NOW),
      CacheBusterVersion::Token("6.4.2".into())
    );
  }

  #[test]
  fn filesystem_lookup_reads_mtime() -> std::io::Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("app.js");
    let file = fs::File::create(&path)?;
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_123))?;

    assert_eq!(FilesystemModificationTime.modified_at(&path), Some(1_700_000_123));
    assert_eq!(
      FilesystemModificationTime.modified_at(&temp.path().join("missing.js")),
      None
    );
    Ok(())
  }
}
