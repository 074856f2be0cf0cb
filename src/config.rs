use std::env;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, ensure};

use crate::i18n::Language;
use crate::theme::Theme;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_HTTP_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyView {
    Overview,
    Full,
    Group,
}

impl TopologyView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Full => "full",
            Self::Group => "group",
        }
    }
}

impl Display for TopologyView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopologyView {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Self::Overview),
            "full" => Ok(Self::Full),
            "group" => Ok(Self::Group),
            other => Err(anyhow!(
                "invalid TOPOLOGY_VIEW `{other}`; expected `overview`, `full`, or `group`"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub http_timeout_ms: u64,
    pub http_max_retries: u32,
    pub default_view: TopologyView,
    pub language: Language,
    pub theme: Theme,
    pub notify_sound: bool,
}

impl DashboardSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();

        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        ensure!(
            !api_base_url.trim().is_empty(),
            "API_BASE_URL cannot be empty"
        );

        let poll_interval_secs = parse_u64_env("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        ensure!(
            poll_interval_secs > 0,
            "POLL_INTERVAL_SECS must be greater than 0"
        );

        let http_timeout_ms = parse_u64_env("HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)?;
        ensure!(http_timeout_ms > 0, "HTTP_TIMEOUT_MS must be greater than 0");

        let http_max_retries = parse_u32_env("HTTP_MAX_RETRIES", DEFAULT_HTTP_MAX_RETRIES)?;

        let default_view = env::var("TOPOLOGY_VIEW")
            .unwrap_or_else(|_| TopologyView::Overview.as_str().to_owned())
            .parse::<TopologyView>()
            .context("failed to parse TOPOLOGY_VIEW")?;

        let language = env::var("LANGUAGE")
            .unwrap_or_else(|_| Language::English.as_str().to_owned())
            .parse::<Language>()
            .context("failed to parse LANGUAGE")?;

        let theme = env::var("THEME")
            .unwrap_or_else(|_| Theme::Dark.as_str().to_owned())
            .parse::<Theme>()
            .context("failed to parse THEME")?;

        let notify_sound = parse_bool_env("NOTIFY_SOUND", false)?;

        Ok(Self {
            api_base_url,
            poll_interval_secs,
            http_timeout_ms,
            http_max_retries,
            default_view,
            language,
            theme,
            notify_sound,
        })
    }
}

fn parse_u32_env(name: &str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("failed to parse {name} as u32")),
        Err(_) => Ok(default),
    }
}

fn parse_u64_env(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("failed to parse {name} as u64")),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(anyhow!("invalid {name} `{other}`; expected true or false")),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::TopologyView;

    #[test]
    fn topology_view_parses_known_values_case_insensitively() {
        assert_eq!(
            "overview".parse::<TopologyView>().expect("should parse"),
            TopologyView::Overview
        );
        assert_eq!(
            "FULL".parse::<TopologyView>().expect("should parse"),
            TopologyView::Full
        );
        assert_eq!(
            " group ".parse::<TopologyView>().expect("should parse"),
            TopologyView::Group
        );
    }

    #[test]
    fn topology_view_rejects_unknown_values() {
        let error = "sideways".parse::<TopologyView>().expect_err("should fail");
        assert!(error.to_string().contains("invalid TOPOLOGY_VIEW"));
    }

    #[test]
    fn topology_view_round_trips_through_as_str() {
        for view in [
            TopologyView::Overview,
            TopologyView::Full,
            TopologyView::Group,
        ] {
            assert_eq!(
                view.as_str().parse::<TopologyView>().expect("should parse"),
                view
            );
        }
    }
}
