use serde::{Deserialize, Serialize};

pub mod client;

pub use client::{ApiClientError, TopologyApiClient};

/// Wire shape of `GET /alerts/active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActiveAlerts {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    #[serde(default)]
    pub device_id: Option<u64>,
    pub severity: AlertSeverity,
    pub alert_type: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub triggered_at: Option<String>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub threshold_value: Option<f64>,
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        AlertKind::from_code(&self.alert_type)
    }

    /// Panel text: the message when present, otherwise the kind label.
    pub fn display_text(&self) -> String {
        match &self.message {
            Some(message) if !message.trim().is_empty() => message.clone(),
            _ => self.kind().label(&self.alert_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AlertSeverity {
    Critical,
    Warning,
    #[default]
    Info,
}

impl From<String> for AlertSeverity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

/// Known alert-type codes from the monitoring backend. Anything else keeps
/// its raw code as the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    DeviceOffline,
    CpuHigh,
    MemoryHigh,
    LinkHighUtilization,
    Other,
}

impl AlertKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "device_offline" => Self::DeviceOffline,
            "cpu_high" => Self::CpuHigh,
            "memory_high" => Self::MemoryHigh,
            "link_high_utilization" => Self::LinkHighUtilization,
            _ => Self::Other,
        }
    }

    pub fn label(self, raw_code: &str) -> String {
        match self {
            Self::DeviceOffline => "Device Offline".to_owned(),
            Self::CpuHigh => "High CPU".to_owned(),
            Self::MemoryHigh => "High Memory".to_owned(),
            Self::LinkHighUtilization => "Link High Utilization".to_owned(),
            Self::Other => raw_code.to_owned(),
        }
    }
}

/// Wire shape of `GET /groups` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub device_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{Alert, AlertKind, AlertSeverity};

    #[test]
    fn alert_kind_maps_known_codes_and_keeps_raw_labels() {
        assert_eq!(
            AlertKind::from_code("device_offline"),
            AlertKind::DeviceOffline
        );
        assert_eq!(AlertKind::from_code("cpu_high"), AlertKind::CpuHigh);
        assert_eq!(
            AlertKind::from_code("link_high_utilization").label("link_high_utilization"),
            "Link High Utilization"
        );
        assert_eq!(
            AlertKind::from_code("fan_failure").label("fan_failure"),
            "fan_failure"
        );
    }

    #[test]
    fn alert_display_text_prefers_the_message() {
        let mut alert: Alert = serde_json::from_str(
            r#"{
                "id": 7,
                "severity": "critical",
                "alert_type": "cpu_high",
                "message": "CPU at 97% on core-1"
            }"#,
        )
        .expect("alert should deserialize");
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.display_text(), "CPU at 97% on core-1");

        alert.message = None;
        assert_eq!(alert.display_text(), "High CPU");
    }

    #[test]
    fn unknown_severity_degrades_to_info() {
        let alert: Alert = serde_json::from_str(
            r#"{"id": 1, "severity": "catastrophic", "alert_type": "cpu_high"}"#,
        )
        .expect("alert should deserialize");
        assert_eq!(alert.severity, AlertSeverity::Info);
    }
}
