use std::{collections::HashMap, fs};

const SETTINGS_FILE: &str = "snapdiff.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5503".into(),
            request_timeout_secs: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_settings(&mut settings, &raw);
    }
    apply_env_settings(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unparseable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_secs = Some(v);
    }
}

fn apply_env_settings(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SNAPSHOT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&'static str, &'static str> = pairs.iter().copied().collect();
        move |key: &str| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_point_at_local_server_without_timeout() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "http://127.0.0.1:5503");
        assert!(settings.request_timeout_secs.is_none());
    }

    #[test]
    fn file_settings_override_defaults() {
        let mut settings = Settings::default();
        apply_file_settings(
            &mut settings,
            "server_url = \"http://snapshots.internal:8080\"\nrequest_timeout_secs = 30\n",
        );
        assert_eq!(settings.server_url, "http://snapshots.internal:8080");
        assert_eq!(settings.request_timeout_secs, Some(30));
    }

    #[test]
    fn negative_timeout_in_file_is_ignored() {
        let mut settings = Settings::default();
        apply_file_settings(&mut settings, "request_timeout_secs = -5\n");
        assert!(settings.request_timeout_secs.is_none());
    }

    #[test]
    fn prefixed_env_var_wins() {
        let mut settings = Settings::default();
        apply_env_settings(
            &mut settings,
            env(&[
                ("SNAPSHOT_SERVER_URL", "http://plain:1"),
                ("APP__SERVER_URL", "http://prefixed:2"),
                ("APP__REQUEST_TIMEOUT_SECS", "12"),
            ]),
        );
        assert_eq!(settings.server_url, "http://prefixed:2");
        assert_eq!(settings.request_timeout_secs, Some(12));
    }

    #[test]
    fn unparseable_timeout_env_is_ignored() {
        let mut settings = Settings::default();
        apply_env_settings(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]));
        assert!(settings.request_timeout_secs.is_none());
    }
}
