use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Production Web API host. `im.open` lives at `{base_url}/api/im.open`.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com";

/// Top-level config (slackline.toml + SLACKLINE_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlacklineConfig {
    #[serde(default)]
    pub api: ApiConfig,
    /// Bot token used for the DM-open REST call. Override with SLACKLINE_TOKEN.
    pub token: Option<String>,
}

/// Web API endpoint settings.
///
/// Override with env var: SLACKLINE_API__BASE_URL=http://127.0.0.1:8080
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Full URL for a Web API method, e.g. `im.open`.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), method)
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl SlacklineConfig {
    /// Load config from a TOML file with SLACKLINE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.slackline/slackline.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SlacklineConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SLACKLINE_").split("__"))
            .extract()
            .map_err(|e| crate::error::SlacklineError::Config(e.to_string()))?;

        tracing::debug!(path = %path, base_url = %config.api.base_url, "config loaded");
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.slackline/slackline.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_production() {
        let cfg = SlacklineConfig::default();
        assert_eq!(cfg.api.base_url, "https://slack.com");
        assert!(cfg.token.is_none());
    }

    #[test]
    fn method_url_tolerates_trailing_slash() {
        let api = ApiConfig::new("http://127.0.0.1:9000/");
        assert_eq!(api.method_url("im.open"), "http://127.0.0.1:9000/api/im.open");
        assert_eq!(
            ApiConfig::default().method_url("im.open"),
            "https://slack.com/api/im.open"
        );
    }

    #[test]
    fn toml_overrides_base_url() {
        let cfg: SlacklineConfig = Figment::new()
            .merge(Toml::string(
                "token = \"xoxb-1\"\n[api]\nbase_url = \"http://localhost:3000\"\n",
            ))
            .extract()
            .unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:3000");
        assert_eq!(cfg.token.as_deref(), Some("xoxb-1"));
    }

    #[test]
    fn empty_source_yields_defaults() {
        let cfg: SlacklineConfig = Figment::new().merge(Toml::string("")).extract().unwrap();
        assert_eq!(cfg.api.base_url, DEFAULT_API_BASE_URL);
    }
}
