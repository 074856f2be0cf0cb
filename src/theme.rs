use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{Result, anyhow};
use eframe::egui::Color32;

use crate::topology::{LinkStatus, NodeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(anyhow!(
                "invalid THEME `{other}`; expected `light` or `dark`"
            )),
        }
    }
}

/// Color set for one theme. A palette swap re-colors labels and fills only;
/// it never moves anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub canvas_background: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub node_online_fill: Color32,
    pub node_online_stroke: Color32,
    pub node_offline_fill: Color32,
    pub node_offline_stroke: Color32,
    pub node_unknown_fill: Color32,
    pub node_unknown_stroke: Color32,
    pub link_normal: Color32,
    pub link_elevated: Color32,
    pub link_warning: Color32,
    pub link_critical: Color32,
    pub alert_badge: Color32,
    pub badge_text: Color32,
}

impl Palette {
    pub fn node_fill(&self, status: NodeStatus) -> Color32 {
        match status.style_bucket() {
            NodeStatus::Offline => self.node_offline_fill,
            NodeStatus::Online => self.node_online_fill,
            NodeStatus::Managed | NodeStatus::Unknown => self.node_unknown_fill,
        }
    }

    pub fn node_stroke(&self, status: NodeStatus) -> Color32 {
        match status.style_bucket() {
            NodeStatus::Offline => self.node_offline_stroke,
            NodeStatus::Online => self.node_online_stroke,
            NodeStatus::Managed | NodeStatus::Unknown => self.node_unknown_stroke,
        }
    }

    pub fn link_color(&self, status: LinkStatus) -> Color32 {
        match status {
            LinkStatus::Normal => self.link_normal,
            LinkStatus::Elevated => self.link_elevated,
            LinkStatus::Warning => self.link_warning,
            LinkStatus::Critical => self.link_critical,
        }
    }
}

static DARK_PALETTE: Palette = Palette {
    canvas_background: Color32::from_rgb(0x0d, 0x11, 0x17),
    text_primary: Color32::from_rgb(0xc9, 0xd1, 0xd9),
    text_secondary: Color32::from_rgb(0x8b, 0x94, 0x9e),
    node_online_fill: Color32::from_rgb(0x3f, 0xb9, 0x50),
    node_online_stroke: Color32::from_rgb(0x2e, 0xa0, 0x43),
    node_offline_fill: Color32::from_rgb(0xf8, 0x51, 0x49),
    node_offline_stroke: Color32::from_rgb(0xda, 0x36, 0x33),
    node_unknown_fill: Color32::from_rgb(0x8b, 0x94, 0x9e),
    node_unknown_stroke: Color32::from_rgb(0x6e, 0x76, 0x81),
    link_normal: Color32::from_rgb(0x3f, 0xb9, 0x50),
    link_elevated: Color32::from_rgb(0xd2, 0x99, 0x22),
    link_warning: Color32::from_rgb(0xf0, 0x88, 0x3e),
    link_critical: Color32::from_rgb(0xf8, 0x51, 0x49),
    alert_badge: Color32::from_rgb(0xf8, 0x51, 0x49),
    badge_text: Color32::WHITE,
};

static LIGHT_PALETTE: Palette = Palette {
    canvas_background: Color32::from_rgb(0xff, 0xff, 0xff),
    text_primary: Color32::from_rgb(0x24, 0x29, 0x2f),
    text_secondary: Color32::from_rgb(0x57, 0x60, 0x6a),
    node_online_fill: Color32::from_rgb(0x2d, 0xa4, 0x4e),
    node_online_stroke: Color32::from_rgb(0x1a, 0x7f, 0x37),
    node_offline_fill: Color32::from_rgb(0xcf, 0x22, 0x2e),
    node_offline_stroke: Color32::from_rgb(0xa4, 0x0e, 0x26),
    node_unknown_fill: Color32::from_rgb(0x6e, 0x77, 0x81),
    node_unknown_stroke: Color32::from_rgb(0x57, 0x60, 0x6a),
    link_normal: Color32::from_rgb(0x1a, 0x7f, 0x37),
    link_elevated: Color32::from_rgb(0x9a, 0x67, 0x00),
    link_warning: Color32::from_rgb(0xbc, 0x4c, 0x00),
    link_critical: Color32::from_rgb(0xcf, 0x22, 0x2e),
    alert_badge: Color32::from_rgb(0xcf, 0x22, 0x2e),
    badge_text: Color32::WHITE,
};

#[cfg(test)]
mod tests {
    use crate::topology::NodeStatus;

    use super::Theme;

    #[test]
    fn theme_parses_and_round_trips() {
        assert_eq!("dark".parse::<Theme>().expect("should parse"), Theme::Dark);
        assert_eq!(
            "LIGHT".parse::<Theme>().expect("should parse"),
            Theme::Light
        );
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.as_str(), "dark");
    }

    #[test]
    fn toggled_flips_between_light_and_dark() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn managed_nodes_share_the_online_style_bucket() {
        let palette = Theme::Dark.palette();
        assert_eq!(
            palette.node_fill(NodeStatus::Managed),
            palette.node_fill(NodeStatus::Online)
        );
        assert_eq!(
            palette.node_stroke(NodeStatus::Managed),
            palette.node_stroke(NodeStatus::Online)
        );
    }

    #[test]
    fn palettes_differ_between_themes() {
        assert_ne!(
            Theme::Dark.palette().text_primary,
            Theme::Light.palette().text_primary
        );
    }
}
