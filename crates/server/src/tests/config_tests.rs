use super::*;

use std::collections::HashMap;

#[test]
fn defaults_use_storage_database_url() {
    let settings = Settings::default();
    assert_eq!(settings.database_url, storage::DEFAULT_DATABASE_URL);
    assert_eq!(settings.server_bind, "127.0.0.1:5503");
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
bind_addr = "0.0.0.0:9000"
database_url = "sqlite://./other.db"
static_dir = "./public"
max_upload_bytes = 1024
"#,
    );

    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.database_url, "sqlite://./other.db");
    assert_eq!(settings.static_dir, Some(PathBuf::from("./public")));
    assert_eq!(settings.max_upload_bytes, 1024);
}

#[test]
fn unparseable_settings_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "bind_addr = [not toml");
    assert_eq!(settings.server_bind, Settings::default().server_bind);
}

#[test]
fn prefixed_env_vars_win_over_plain_ones() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("SERVER_BIND", "127.0.0.1:1"),
        ("APP__BIND_ADDR", "127.0.0.1:2"),
        ("DATABASE_URL", "sqlite://./plain.db"),
        ("APP__MAX_UPLOAD_BYTES", "2048"),
    ]);
    let mut settings = Settings::default();
    apply_env_settings(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.database_url, "sqlite://./plain.db");
    assert_eq!(settings.max_upload_bytes, 2048);
    assert!(settings.static_dir.is_none());
}

#[test]
fn invalid_upload_limit_keeps_default() {
    let env: HashMap<&str, &str> = HashMap::from([("APP__MAX_UPLOAD_BYTES", "lots")]);
    let mut settings = Settings::default();
    apply_env_settings(&mut settings, |key| env.get(key).map(|v| v.to_string()));
    assert_eq!(settings.max_upload_bytes, Settings::default().max_upload_bytes);
}
