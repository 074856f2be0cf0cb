use crate::topology::{TopologyLink, TopologyNode};

/// Click selection surfaced by the topology canvas.
///
/// The canvas returns at most one selection per frame, synchronously during
/// the click's frame, and performs no panel or navigation logic itself. The
/// value carries clones of the clicked data objects; link selections include
/// the resolved endpoint nodes.
///
/// Contract: single consumer, replaceable. Whoever calls
/// [`crate::studio::canvas::TopologyCanvas::show`] owns the event for that
/// frame; there is no multi-subscriber fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasSelection {
    Node(TopologyNode),
    Link {
        link: TopologyLink,
        source: TopologyNode,
        target: TopologyNode,
    },
}

impl CanvasSelection {
    /// Panel heading for the selection.
    pub fn title(&self) -> &str {
        match self {
            Self::Node(node) => &node.hostname,
            Self::Link { .. } => "Link",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::topology::{NodeStatus, TopologyLink, TopologyNode};

    use super::CanvasSelection;

    fn node(hostname: &str) -> TopologyNode {
        TopologyNode {
            id: hostname.to_owned(),
            hostname: hostname.to_owned(),
            ip_address: "10.0.0.1".to_owned(),
            device_type: None,
            vendor: None,
            status: NodeStatus::Online,
            cpu_percent: None,
            memory_percent: None,
            alert_count: 0,
        }
    }

    #[test]
    fn node_selection_titles_with_the_hostname() {
        let selection = CanvasSelection::Node(node("core-1"));
        assert_eq!(selection.title(), "core-1");
    }

    #[test]
    fn link_selection_preserves_resolved_endpoints() {
        let link: TopologyLink = serde_json::from_str(
            r#"{
                "source": "core-1",
                "target": "dist-1",
                "status": "normal",
                "total_bandwidth_mbps": 10000
            }"#,
        )
        .expect("link should deserialize");

        let selection = CanvasSelection::Link {
            link,
            source: node("core-1"),
            target: node("dist-1"),
        };

        match selection {
            CanvasSelection::Link { source, target, .. } => {
                assert_eq!(source.hostname, "core-1");
                assert_eq!(target.hostname, "dist-1");
            }
            CanvasSelection::Node(_) => panic!("unexpected selection variant"),
        }
    }

    #[test]
    fn link_selection_titles_generically() {
        let link: TopologyLink = serde_json::from_str(
            r#"{
                "source": "a",
                "target": "b",
                "status": "critical",
                "total_bandwidth_mbps": 1000
            }"#,
        )
        .expect("link should deserialize");
        let selection = CanvasSelection::Link {
            link,
            source: node("a"),
            target: node("b"),
        };
        assert_eq!(selection.title(), "Link");
    }
}
