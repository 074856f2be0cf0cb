use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{Result, anyhow};

use crate::topology::{DeviceClass, LinkStatus, NodeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    TraditionalChinese,
    SimplifiedChinese,
}

impl Language {
    pub const ALL: [Language; 3] = [
        Language::English,
        Language::TraditionalChinese,
        Language::SimplifiedChinese,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::TraditionalChinese => "zh-TW",
            Self::SimplifiedChinese => "zh-CN",
        }
    }

    /// Native-script name shown in the language picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::TraditionalChinese => "繁體中文",
            Self::SimplifiedChinese => "简体中文",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "en" => Ok(Self::English),
            "zh-TW" => Ok(Self::TraditionalChinese),
            "zh-CN" => Ok(Self::SimplifiedChinese),
            other => Err(anyhow!(
                "invalid LANGUAGE `{other}`; expected `en`, `zh-TW`, or `zh-CN`"
            )),
        }
    }
}

/// Every user-facing string the dashboard renders. A closed enum keeps the
/// per-language tables exhaustive, so a missing translation is a compile
/// error rather than a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Topology,
    Overview,
    FullMap,
    GroupView,
    SelectGroup,
    Refresh,
    Fit,
    ResetZoom,
    LastUpdate,
    Online,
    Offline,
    Managed,
    Unknown,
    Normal,
    Elevated,
    Warning,
    Critical,
    CoreSwitch,
    Distribution,
    AccessSwitch,
    Router,
    Firewall,
    AccessPoint,
    Details,
    DeviceInfo,
    IpAddress,
    Type,
    Vendor,
    Status,
    Metrics,
    Cpu,
    Memory,
    LinkDetails,
    Connection,
    From,
    To,
    Bandwidth,
    Total,
    InUtilization,
    OutUtilization,
    PortDetails,
    ActiveAlerts,
    NoActiveAlerts,
    Loading,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationCatalog {
    language: Language,
}

impl TranslationCatalog {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn t(&self, key: MessageKey) -> &'static str {
        match self.language {
            Language::English => english(key),
            Language::TraditionalChinese => traditional_chinese(key),
            Language::SimplifiedChinese => simplified_chinese(key),
        }
    }

    pub fn node_status(&self, status: NodeStatus) -> &'static str {
        self.t(match status {
            NodeStatus::Online => MessageKey::Online,
            NodeStatus::Offline => MessageKey::Offline,
            NodeStatus::Managed => MessageKey::Managed,
            NodeStatus::Unknown => MessageKey::Unknown,
        })
    }

    pub fn link_status(&self, status: LinkStatus) -> &'static str {
        self.t(match status {
            LinkStatus::Normal => MessageKey::Normal,
            LinkStatus::Elevated => MessageKey::Elevated,
            LinkStatus::Warning => MessageKey::Warning,
            LinkStatus::Critical => MessageKey::Critical,
        })
    }

    pub fn device_class(&self, class: DeviceClass) -> &'static str {
        self.t(match class {
            DeviceClass::Core => MessageKey::CoreSwitch,
            DeviceClass::Distribution => MessageKey::Distribution,
            DeviceClass::Access => MessageKey::AccessSwitch,
            DeviceClass::Router => MessageKey::Router,
            DeviceClass::Firewall => MessageKey::Firewall,
            DeviceClass::Wireless => MessageKey::AccessPoint,
            DeviceClass::Unknown => MessageKey::Unknown,
        })
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Topology => "Topology",
        MessageKey::Overview => "Overview",
        MessageKey::FullMap => "Full Map",
        MessageKey::GroupView => "Group View",
        MessageKey::SelectGroup => "Select Group...",
        MessageKey::Refresh => "Refresh",
        MessageKey::Fit => "Fit",
        MessageKey::ResetZoom => "Reset Zoom",
        MessageKey::LastUpdate => "Last update",
        MessageKey::Online => "Online",
        MessageKey::Offline => "Offline",
        MessageKey::Managed => "Managed",
        MessageKey::Unknown => "Unknown",
        MessageKey::Normal => "Normal",
        MessageKey::Elevated => "Elevated",
        MessageKey::Warning => "Warning",
        MessageKey::Critical => "Critical",
        MessageKey::CoreSwitch => "Core Switch",
        MessageKey::Distribution => "Distribution",
        MessageKey::AccessSwitch => "Access Switch",
        MessageKey::Router => "Router",
        MessageKey::Firewall => "Firewall",
        MessageKey::AccessPoint => "Access Point",
        MessageKey::Details => "Details",
        MessageKey::DeviceInfo => "Device Info",
        MessageKey::IpAddress => "IP Address",
        MessageKey::Type => "Type",
        MessageKey::Vendor => "Vendor",
        MessageKey::Status => "Status",
        MessageKey::Metrics => "Metrics",
        MessageKey::Cpu => "CPU",
        MessageKey::Memory => "Memory",
        MessageKey::LinkDetails => "Link Details",
        MessageKey::Connection => "Connection",
        MessageKey::From => "From",
        MessageKey::To => "To",
        MessageKey::Bandwidth => "Bandwidth",
        MessageKey::Total => "Total",
        MessageKey::InUtilization => "In Utilization",
        MessageKey::OutUtilization => "Out Utilization",
        MessageKey::PortDetails => "Port Details",
        MessageKey::ActiveAlerts => "Active Alerts",
        MessageKey::NoActiveAlerts => "No active alerts",
        MessageKey::Loading => "Loading...",
        MessageKey::Close => "Close",
    }
}

fn traditional_chinese(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Topology => "拓撲圖",
        MessageKey::Overview => "總覽",
        MessageKey::FullMap => "完整地圖",
        MessageKey::GroupView => "群組視圖",
        MessageKey::SelectGroup => "選擇群組...",
        MessageKey::Refresh => "重新整理",
        MessageKey::Fit => "適配",
        MessageKey::ResetZoom => "重設縮放",
        MessageKey::LastUpdate => "最後更新",
        MessageKey::Online => "線上",
        MessageKey::Offline => "離線",
        MessageKey::Managed => "受管理",
        MessageKey::Unknown => "未知",
        MessageKey::Normal => "正常",
        MessageKey::Elevated => "偏高",
        MessageKey::Warning => "警告",
        MessageKey::Critical => "嚴重",
        MessageKey::CoreSwitch => "核心交換機",
        MessageKey::Distribution => "分發交換機",
        MessageKey::AccessSwitch => "接入交換機",
        MessageKey::Router => "路由器",
        MessageKey::Firewall => "防火牆",
        MessageKey::AccessPoint => "無線基地台",
        MessageKey::Details => "詳細資訊",
        MessageKey::DeviceInfo => "設備資訊",
        MessageKey::IpAddress => "IP 位址",
        MessageKey::Type => "類型",
        MessageKey::Vendor => "廠商",
        MessageKey::Status => "狀態",
        MessageKey::Metrics => "指標",
        MessageKey::Cpu => "CPU",
        MessageKey::Memory => "記憶體",
        MessageKey::LinkDetails => "連結詳情",
        MessageKey::Connection => "連接",
        MessageKey::From => "來源",
        MessageKey::To => "目標",
        MessageKey::Bandwidth => "頻寬",
        MessageKey::Total => "總計",
        MessageKey::InUtilization => "輸入使用率",
        MessageKey::OutUtilization => "輸出使用率",
        MessageKey::PortDetails => "埠詳情",
        MessageKey::ActiveAlerts => "活躍告警",
        MessageKey::NoActiveAlerts => "無告警",
        MessageKey::Loading => "載入中...",
        MessageKey::Close => "關閉",
    }
}

fn simplified_chinese(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Topology => "拓扑图",
        MessageKey::Overview => "概览",
        MessageKey::FullMap => "完整地图",
        MessageKey::GroupView => "群组视图",
        MessageKey::SelectGroup => "选择群组...",
        MessageKey::Refresh => "刷新",
        MessageKey::Fit => "适配",
        MessageKey::ResetZoom => "重置缩放",
        MessageKey::LastUpdate => "最后更新",
        MessageKey::Online => "在线",
        MessageKey::Offline => "离线",
        MessageKey::Managed => "受管理",
        MessageKey::Unknown => "未知",
        MessageKey::Normal => "正常",
        MessageKey::Elevated => "偏高",
        MessageKey::Warning => "警告",
        MessageKey::Critical => "严重",
        MessageKey::CoreSwitch => "核心交换机",
        MessageKey::Distribution => "分发交换机",
        MessageKey::AccessSwitch => "接入交换机",
        MessageKey::Router => "路由器",
        MessageKey::Firewall => "防火墙",
        MessageKey::AccessPoint => "无线访问点",
        MessageKey::Details => "详细信息",
        MessageKey::DeviceInfo => "设备信息",
        MessageKey::IpAddress => "IP 地址",
        MessageKey::Type => "类型",
        MessageKey::Vendor => "厂商",
        MessageKey::Status => "状态",
        MessageKey::Metrics => "指标",
        MessageKey::Cpu => "CPU",
        MessageKey::Memory => "内存",
        MessageKey::LinkDetails => "链接详情",
        MessageKey::Connection => "连接",
        MessageKey::From => "来源",
        MessageKey::To => "目标",
        MessageKey::Bandwidth => "带宽",
        MessageKey::Total => "总计",
        MessageKey::InUtilization => "输入利用率",
        MessageKey::OutUtilization => "输出利用率",
        MessageKey::PortDetails => "端口详情",
        MessageKey::ActiveAlerts => "活跃告警",
        MessageKey::NoActiveAlerts => "无告警",
        MessageKey::Loading => "加载中...",
        MessageKey::Close => "关闭",
    }
}

#[cfg(test)]
mod tests {
    use crate::topology::{DeviceClass, NodeStatus};

    use super::{Language, MessageKey, TranslationCatalog};

    #[test]
    fn language_parses_locale_codes() {
        assert_eq!(
            "en".parse::<Language>().expect("should parse"),
            Language::English
        );
        assert_eq!(
            "zh-TW".parse::<Language>().expect("should parse"),
            Language::TraditionalChinese
        );
        assert_eq!(
            "zh-CN".parse::<Language>().expect("should parse"),
            Language::SimplifiedChinese
        );
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn catalog_switches_language_for_the_same_key() {
        let mut catalog = TranslationCatalog::new(Language::English);
        assert_eq!(catalog.t(MessageKey::Refresh), "Refresh");

        catalog.set_language(Language::TraditionalChinese);
        assert_eq!(catalog.t(MessageKey::Refresh), "重新整理");

        catalog.set_language(Language::SimplifiedChinese);
        assert_eq!(catalog.t(MessageKey::Refresh), "刷新");
    }

    #[test]
    fn status_and_class_labels_route_through_the_catalog() {
        let catalog = TranslationCatalog::new(Language::English);
        assert_eq!(catalog.node_status(NodeStatus::Offline), "Offline");
        assert_eq!(catalog.device_class(DeviceClass::Firewall), "Firewall");
        assert_eq!(catalog.device_class(DeviceClass::Unknown), "Unknown");
    }
}
