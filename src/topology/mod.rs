use serde::{Deserialize, Serialize};

pub mod layout;

/// Wire shape of the topology endpoint. `last_updated` is passed through as
/// the server's RFC3339 string; the dashboard only displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub nodes: Vec<TopologyNode>,
    #[serde(default)]
    pub links: Vec<TopologyLink>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: String,
    pub hostname: String,
    pub ip_address: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    pub status: NodeStatus,
    #[serde(default)]
    pub cpu_percent: Option<f32>,
    #[serde(default)]
    pub memory_percent: Option<f32>,
    #[serde(default)]
    pub alert_count: u32,
}

impl TopologyNode {
    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::classify(self.device_type.as_deref().unwrap_or_default())
    }

    pub fn vendor_display_name(&self) -> String {
        vendor_display_name(self.vendor.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NodeStatus {
    Online,
    Offline,
    Managed,
    #[default]
    Unknown,
}

impl From<String> for NodeStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "online" => Self::Online,
            "offline" => Self::Offline,
            "managed" => Self::Managed,
            _ => Self::Unknown,
        }
    }
}

impl NodeStatus {
    /// Managed devices draw with the online style; only offline and unknown
    /// keep their own look.
    pub fn style_bucket(self) -> NodeStatus {
        match self {
            Self::Managed => Self::Online,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyLink {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub status: LinkStatus,
    pub total_bandwidth_mbps: u64,
    #[serde(default)]
    pub utilization_in_percent: f32,
    #[serde(default)]
    pub utilization_out_percent: f32,
    #[serde(default)]
    pub port_details: Vec<PortDetail>,
}

impl TopologyLink {
    pub fn peak_utilization_percent(&self) -> f32 {
        self.utilization_in_percent
            .max(self.utilization_out_percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Normal,
    Elevated,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDetail {
    pub local_port: String,
    pub remote_port: String,
    pub bandwidth_mbps: u64,
    #[serde(default)]
    pub in_bps: Option<u64>,
    #[serde(default)]
    pub out_bps: Option<u64>,
}

/// Coarse device categories used for sizing and labeling. Classification is
/// a case-insensitive substring match over the raw `device_type` string, in
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Core,
    Distribution,
    Router,
    Firewall,
    Wireless,
    Access,
    Unknown,
}

impl DeviceClass {
    pub fn classify(device_type: &str) -> Self {
        let lowered = device_type.to_ascii_lowercase();
        if lowered.contains("core") {
            Self::Core
        } else if lowered.contains("dist") {
            Self::Distribution
        } else if lowered.contains("router") {
            Self::Router
        } else if lowered.contains("firewall") {
            Self::Firewall
        } else if lowered.contains("ap") || lowered.contains("wireless") {
            Self::Wireless
        } else if lowered.contains("access") || lowered.contains("switch") {
            Self::Access
        } else {
            Self::Unknown
        }
    }

    /// Short tag drawn inside the node circle.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Distribution => "DIST",
            Self::Router => "RTR",
            Self::Firewall => "FW",
            Self::Wireless => "AP",
            Self::Access => "SW",
            Self::Unknown => "?",
        }
    }

    /// Core and distribution devices draw larger than the rest.
    pub fn node_radius(self) -> f32 {
        match self {
            Self::Core => 30.0,
            Self::Distribution => 25.0,
            Self::Router
            | Self::Firewall
            | Self::Wireless
            | Self::Access
            | Self::Unknown => 20.0,
        }
    }
}

/// Fixed vendor-code table from the collector. Unlisted codes display as
/// their raw value; a missing vendor displays as "Unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    CiscoIos,
    CiscoNxos,
    Fortinet,
    PaloAlto,
    HpAruba,
    Ruckus,
}

impl Vendor {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "cisco_ios" => Some(Self::CiscoIos),
            "cisco_nxos" => Some(Self::CiscoNxos),
            "fortinet" => Some(Self::Fortinet),
            "paloalto" => Some(Self::PaloAlto),
            "hp_aruba" => Some(Self::HpAruba),
            "ruckus" => Some(Self::Ruckus),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CiscoIos => "Cisco IOS",
            Self::CiscoNxos => "Cisco NX-OS",
            Self::Fortinet => "Fortinet",
            Self::PaloAlto => "Palo Alto",
            Self::HpAruba => "HPE Aruba",
            Self::Ruckus => "Ruckus",
        }
    }
}

pub fn vendor_display_name(code: Option<&str>) -> String {
    match code {
        None => "Unknown".to_owned(),
        Some(raw) if raw.trim().is_empty() => "Unknown".to_owned(),
        Some(raw) => match Vendor::from_code(raw) {
            Some(vendor) => vendor.display_name().to_owned(),
            None => raw.to_owned(),
        },
    }
}

/// `500 -> "500M"`, `1000 -> "1G"`, `10000 -> "10G"`. Gigabit values use
/// integer division; sub-gigabit values stay in megabits.
pub fn format_bandwidth(mbps: u64) -> String {
    if mbps >= 1_000 {
        format!("{}G", mbps / 1_000)
    } else {
        format!("{mbps}M")
    }
}

/// Stroke width tier for a link, monotonic non-decreasing in bandwidth.
pub fn link_stroke_width(bandwidth_mbps: u64) -> f32 {
    if bandwidth_mbps >= 100_000 {
        8.0
    } else if bandwidth_mbps >= 40_000 {
        6.0
    } else if bandwidth_mbps >= 10_000 {
        4.0
    } else if bandwidth_mbps >= 1_000 {
        3.0
    } else {
        2.0
    }
}
