use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::{ContentFilter, SortOrder};
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_CONFIG_FILE: &str = "posterdesk.toml";
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub server_url: String,
    pub notification_ttl_secs: u64,
    /// Unset means requests wait for the backend indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub default_filter: ContentFilter,
    pub default_sort: SortOrder,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            request_timeout_secs: None,
            default_filter: ContentFilter::All,
            default_sort: SortOrder::Name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(alias = "base_url")]
    server_url: Option<String>,
    notification_ttl_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    #[serde(alias = "type")]
    default_filter: Option<String>,
    #[serde(alias = "sort")]
    default_sort: Option<String>,
}

impl ClientSettings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Overlays values from a TOML document. Unknown filter or sort values are ignored.
    pub fn merge_toml(&mut self, raw: &str) -> ClientResult<()> {
        let file_cfg: FileSettings = toml::from_str(raw)
            .map_err(|err| ClientError::precondition(format!("invalid settings file: {err}")))?;

        if let Some(v) = file_cfg.server_url {
            self.server_url = v;
        }
        if let Some(v) = file_cfg.notification_ttl_secs {
            self.notification_ttl_secs = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
        if let Some(v) = file_cfg.default_filter {
            match v.parse() {
                Ok(filter) => self.default_filter = filter,
                Err(err) => warn!(%err, "ignoring default_filter from settings file"),
            }
        }
        if let Some(v) = file_cfg.default_sort {
            match v.parse() {
                Ok(sort) => self.default_sort = sort,
                Err(err) => warn!(%err, "ignoring default_sort from settings file"),
            }
        }
        Ok(())
    }

    /// Overlays `POSTERDESK_*` and `APP__*` environment variables through `lookup`.
    pub fn merge_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("POSTERDESK_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = lookup("POSTERDESK_NOTIFICATION_TTL_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.notification_ttl_secs = parsed;
            }
        }

        if let Some(v) = lookup("POSTERDESK_REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = Some(parsed);
            }
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = Some(parsed);
            }
        }
    }
}

/// Defaults, then `path` (or `posterdesk.toml` in the working directory) when present,
/// then the process environment.
pub fn load_settings(path: Option<&Path>) -> ClientResult<ClientSettings> {
    let mut settings = ClientSettings::default();

    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(file) {
        Ok(raw) => {
            settings.merge_toml(&raw)?;
            info!(path = %file.display(), "loaded settings file");
        }
        Err(err) if path.is_some() => {
            return Err(ClientError::precondition(format!(
                "failed to read settings file '{}': {err}",
                file.display()
            )));
        }
        Err(_) => {}
    }

    settings.merge_env(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let mut settings = ClientSettings::default();
        settings
            .merge_toml(
                r#"
                server_url = "http://media.lan:5000"
                request_timeout_secs = 30
                sort = "date_added"
                type = "series"
                "#,
            )
            .expect("merge");

        assert_eq!(settings.server_url, "http://media.lan:5000");
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.default_sort, SortOrder::DateAdded);
        assert_eq!(settings.default_filter, ContentFilter::Series);
        assert_eq!(settings.notification_ttl_secs, DEFAULT_NOTIFICATION_TTL_SECS);
    }

    #[test]
    fn unknown_sort_keeps_previous_value() {
        let mut settings = ClientSettings::default();
        settings.merge_toml("sort = \"rating\"").expect("merge");
        assert_eq!(settings.default_sort, SortOrder::Name);
    }

    #[test]
    fn app_prefixed_env_wins_over_tool_prefixed() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("POSTERDESK_SERVER_URL", "http://a:5000"),
            ("APP__SERVER_URL", "http://b:5000"),
            ("POSTERDESK_NOTIFICATION_TTL_SECS", "9"),
        ]);
        let mut settings = ClientSettings::default();
        settings.merge_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.server_url, "http://b:5000");
        assert_eq!(settings.notification_ttl(), Duration::from_secs(9));
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn zero_timeout_means_wait_indefinitely() {
        let settings = ClientSettings {
            request_timeout_secs: Some(0),
            ..ClientSettings::default()
        };
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/posterdesk.toml")))
            .expect_err("must fail");
        assert!(err.to_string().contains("failed to read settings file"));
    }
}
