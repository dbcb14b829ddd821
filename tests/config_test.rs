//! Tests for loading [`SessionConfig`] from disk.

use std::io::Write;
use std::time::Duration;

use memogate::{MemogateError, Session, SessionConfig};

#[test]
fn load_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
base_url = "https://api.test/v2/"
cache_ttl_secs = 45
key_prefix = "inventory"

[headers]
Authorization = "Bearer abc"
X-Client = "memogate"

[http]
timeout_secs = 3
max_redirects = 0

[store]
max_entries = 128
"#
    )
    .unwrap();

    let config = SessionConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.base_url, "https://api.test/v2/");
    assert_eq!(config.cache_ttl_secs, 45);
    assert_eq!(config.key_prefix.as_deref(), Some("inventory"));
    assert_eq!(config.headers.len(), 2);
    assert_eq!(config.http.timeout_secs, 3);
    assert_eq!(config.http.max_redirects, 0);
    assert_eq!(config.store.max_entries, 128);

    let session = Session::from_config(&config).unwrap();
    assert_eq!(session.base_url(), "https://api.test/v2/");
    assert_eq!(session.default_ttl(), Duration::from_secs(45));
    assert_eq!(session.store().name(), "memory");
}

#[test]
fn key_prefix_from_config_reaches_fingerprints() {
    let config = SessionConfig::from_toml(
        r#"
base_url = "https://api.test/"
cache_ttl_secs = 10
key_prefix = "inventory"
"#,
    )
    .unwrap();
    let session = Session::from_config(&config).unwrap();
    let fp = session
        .get("items")
        .unwrap()
        .fingerprint(&memogate::CallArgs::new())
        .unwrap();
    assert!(fp.as_str().starts_with("inventory:"));
}

#[test]
fn malformed_file_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "base_url = [").unwrap();

    let err = SessionConfig::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, MemogateError::Configuration(_)));
    let path = format!("{:?}", file.path());
    assert!(err.to_string().contains(&path));
}

#[test]
fn invalid_base_url_in_config_fails_session_build() {
    let config = SessionConfig::from_toml(r#"base_url = "::not a url::""#).unwrap();
    let err = Session::from_config(&config).err().unwrap();
    assert!(matches!(err, MemogateError::InvalidUrl(_)));
}

#[test]
fn invalid_header_in_config_fails_session_build() {
    let config = SessionConfig::from_toml(
        r#"
base_url = "https://api.test/"

[headers]
"bad header" = "x"
"#,
    )
    .unwrap();
    let err = Session::from_config(&config).err().unwrap();
    assert!(matches!(err, MemogateError::Configuration(_)));
}
