use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{DashboardSettings, TopologyView};
use crate::i18n::Language;
use crate::theme::Theme;

pub fn temp_path(prefix: &str) -> PathBuf {
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "netmap_studio_{prefix}_{}_{}",
        std::process::id(),
        now_ns
    ))
}

pub fn remove_dir_if_exists(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}

pub fn settings_for_base_url(base_url: &str) -> DashboardSettings {
    DashboardSettings {
        api_base_url: base_url.to_owned(),
        poll_interval_secs: 120,
        http_timeout_ms: 2_000,
        http_max_retries: 0,
        default_view: TopologyView::Overview,
        language: Language::English,
        theme: Theme::Dark,
        notify_sound: false,
    }
}
