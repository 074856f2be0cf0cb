use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ActiveAlerts, Alert, DeviceGroup};
use crate::config::TopologyView;
use crate::topology::{DeviceClass, LinkStatus, TopologyLink, TopologyNode, TopologySnapshot};

/// Development data source: serves the same REST surface the dashboard polls
/// in production, backed by a seeded in-memory topology.
#[derive(Clone)]
pub struct DemoServerState {
    seed: Arc<DemoSeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoSeed {
    pub nodes: Vec<TopologyNode>,
    pub links: Vec<TopologyLink>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub groups: Vec<DemoGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub device_ids: Vec<String>,
}

impl DemoServerState {
    pub fn seeded() -> Self {
        let seed: DemoSeed = serde_yaml::from_str(DEFAULT_SEED_YAML)
            .expect("built-in demo seed should be valid YAML");
        Self {
            seed: Arc::new(seed),
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read demo seed `{}`", path.display()))?;
        let seed: DemoSeed = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse demo seed `{}`", path.display()))?;
        Ok(Self {
            seed: Arc::new(seed),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TopologyQuery {
    view: Option<String>,
    group_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

pub async fn run_demo_server(bind: &str, seed_path: Option<&Path>) -> Result<()> {
    let state = match seed_path {
        Some(path) => DemoServerState::from_yaml_file(path)?,
        None => DemoServerState::seeded(),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind demo API server to `{bind}`"))?;
    let local_addr = listener.local_addr().ok();

    info!(
        requested_bind = %bind,
        bound_addr = local_addr.map(|addr| addr.to_string()),
        "starting demo API server"
    );

    axum::serve(listener, app)
        .await
        .context("demo API server exited with an error")
}

pub fn router(state: DemoServerState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/topology", get(handle_topology))
        .route("/api/v1/alerts/active", get(handle_active_alerts))
        .route("/api/v1/groups", get(handle_groups))
        .with_state(state)
}

async fn handle_health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn handle_topology(
    State(state): State<DemoServerState>,
    Query(query): Query<TopologyQuery>,
) -> Response {
    let view = match query.view.as_deref() {
        None => TopologyView::Overview,
        Some(raw) => match raw.parse::<TopologyView>() {
            Ok(view) => view,
            Err(error) => {
                let body = ErrorBody {
                    error: error.to_string(),
                };
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
        },
    };

    let snapshot = build_snapshot(&state.seed, view, query.group_id, SystemTime::now());
    (StatusCode::OK, Json(snapshot)).into_response()
}

async fn handle_active_alerts(State(state): State<DemoServerState>) -> Json<ActiveAlerts> {
    Json(ActiveAlerts {
        alerts: state.seed.alerts.clone(),
    })
}

async fn handle_groups(State(state): State<DemoServerState>) -> Json<Vec<DeviceGroup>> {
    let groups = state
        .seed
        .groups
        .iter()
        .map(|group| DeviceGroup {
            id: group.id,
            name: group.name.clone(),
            device_count: group.device_ids.len() as u32,
        })
        .collect();
    Json(groups)
}

fn build_snapshot(
    seed: &DemoSeed,
    view: TopologyView,
    group_id: Option<u64>,
    now: SystemTime,
) -> TopologySnapshot {
    let nodes: Vec<TopologyNode> = seed
        .nodes
        .iter()
        .filter(|node| node_in_view(node, seed, view, group_id))
        .cloned()
        .collect();

    // Links only survive when both endpoints made it into the view.
    let links = seed
        .links
        .iter()
        .filter(|link| {
            nodes.iter().any(|node| node.id == link.source)
                && nodes.iter().any(|node| node.id == link.target)
        })
        .map(|link| {
            let mut link = link.clone();
            link.status = link_status_for_utilization(link.peak_utilization_percent());
            link
        })
        .collect();

    TopologySnapshot {
        nodes,
        links,
        last_updated: Some(humantime::format_rfc3339_seconds(now).to_string()),
    }
}

fn node_in_view(
    node: &TopologyNode,
    seed: &DemoSeed,
    view: TopologyView,
    group_id: Option<u64>,
) -> bool {
    match view {
        TopologyView::Full => true,
        TopologyView::Overview => matches!(
            node.device_class(),
            DeviceClass::Core | DeviceClass::Distribution | DeviceClass::Router
        ),
        TopologyView::Group => match group_id {
            None => true,
            Some(group_id) => seed
                .groups
                .iter()
                .find(|group| group.id == group_id)
                .is_some_and(|group| group.device_ids.contains(&node.id)),
        },
    }
}

/// Utilization thresholds for link coloring: 90% critical, 70% warning,
/// 50% elevated.
fn link_status_for_utilization(peak_percent: f32) -> LinkStatus {
    if peak_percent >= 90.0 {
        LinkStatus::Critical
    } else if peak_percent >= 70.0 {
        LinkStatus::Warning
    } else if peak_percent >= 50.0 {
        LinkStatus::Elevated
    } else {
        LinkStatus::Normal
    }
}

const DEFAULT_SEED_YAML: &str = r#"
nodes:
  - id: "1"
    hostname: core-sw-01
    ip_address: 10.0.0.1
    device_type: core
    vendor: cisco_nxos
    status: managed
    cpu_percent: 41.5
    memory_percent: 58.0
    alert_count: 0
  - id: "2"
    hostname: core-sw-02
    ip_address: 10.0.0.2
    device_type: core
    vendor: cisco_nxos
    status: managed
    cpu_percent: 37.2
    memory_percent: 55.3
    alert_count: 0
  - id: "3"
    hostname: dist-sw-01
    ip_address: 10.0.1.1
    device_type: distribution
    vendor: cisco_ios
    status: managed
    cpu_percent: 62.8
    memory_percent: 71.4
    alert_count: 1
  - id: "4"
    hostname: edge-rtr-01
    ip_address: 10.0.2.1
    device_type: router
    vendor: cisco_ios
    status: online
    cpu_percent: 23.9
    memory_percent: 44.1
    alert_count: 0
  - id: "5"
    hostname: fw-01
    ip_address: 10.0.3.1
    device_type: firewall
    vendor: fortinet
    status: managed
    cpu_percent: 51.0
    memory_percent: 66.7
    alert_count: 0
  - id: "6"
    hostname: access-sw-01
    ip_address: 10.0.4.1
    device_type: access switch
    vendor: hp_aruba
    status: online
    alert_count: 0
  - id: "7"
    hostname: access-sw-02
    ip_address: 10.0.4.2
    device_type: access switch
    vendor: hp_aruba
    status: offline
    alert_count: 2
  - id: "8"
    hostname: ap-01
    ip_address: 10.0.5.1
    device_type: wireless ap
    vendor: ruckus
    status: online
    alert_count: 0
links:
  - source: "1"
    target: "2"
    status: normal
    total_bandwidth_mbps: 100000
    utilization_in_percent: 31.0
    utilization_out_percent: 28.5
    port_details:
      - local_port: Eth1/49
        remote_port: Eth1/49
        bandwidth_mbps: 100000
  - source: "1"
    target: "3"
    status: normal
    total_bandwidth_mbps: 40000
    utilization_in_percent: 55.4
    utilization_out_percent: 47.8
  - source: "2"
    target: "3"
    status: normal
    total_bandwidth_mbps: 40000
    utilization_in_percent: 73.1
    utilization_out_percent: 61.0
  - source: "1"
    target: "4"
    status: normal
    total_bandwidth_mbps: 10000
    utilization_in_percent: 18.2
    utilization_out_percent: 22.6
  - source: "4"
    target: "5"
    status: normal
    total_bandwidth_mbps: 10000
    utilization_in_percent: 92.3
    utilization_out_percent: 41.9
  - source: "3"
    target: "6"
    status: normal
    total_bandwidth_mbps: 1000
    utilization_in_percent: 12.0
    utilization_out_percent: 9.4
  - source: "3"
    target: "7"
    status: normal
    total_bandwidth_mbps: 1000
    utilization_in_percent: 0.0
    utilization_out_percent: 0.0
  - source: "6"
    target: "8"
    status: normal
    total_bandwidth_mbps: 1000
    utilization_in_percent: 35.7
    utilization_out_percent: 14.2
alerts:
  - id: 1
    device_id: 7
    severity: critical
    alert_type: device_offline
    message: access-sw-02 is unreachable
    triggered_at: 2026-01-15T08:12:00Z
  - id: 2
    device_id: 3
    severity: warning
    alert_type: memory_high
    message: Memory at 71% on dist-sw-01
    triggered_at: 2026-01-15T07:40:00Z
    current_value: 71.4
    threshold_value: 70.0
  - id: 3
    device_id: 7
    severity: warning
    alert_type: link_high_utilization
    triggered_at: 2026-01-15T08:14:00Z
groups:
  - id: 1
    name: Campus Core
    device_ids: ["1", "2", "3"]
  - id: 2
    name: Branch Access
    device_ids: ["3", "6", "7", "8"]
"#;

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use crate::config::TopologyView;
    use crate::topology::LinkStatus;

    use super::{DemoServerState, build_snapshot, link_status_for_utilization};

    #[test]
    fn built_in_seed_parses_and_is_referentially_consistent() {
        let state = DemoServerState::seeded();
        assert!(!state.seed.nodes.is_empty());
        for link in &state.seed.links {
            assert!(
                state.seed.nodes.iter().any(|node| node.id == link.source),
                "link source {} should exist",
                link.source
            );
            assert!(
                state.seed.nodes.iter().any(|node| node.id == link.target),
                "link target {} should exist",
                link.target
            );
        }
    }

    #[test]
    fn overview_filters_to_core_distribution_and_router() {
        let state = DemoServerState::seeded();
        let snapshot = build_snapshot(&state.seed, TopologyView::Overview, None, UNIX_EPOCH);

        assert!(!snapshot.nodes.is_empty());
        for node in &snapshot.nodes {
            let class = node.device_class();
            assert!(
                matches!(
                    class,
                    crate::topology::DeviceClass::Core
                        | crate::topology::DeviceClass::Distribution
                        | crate::topology::DeviceClass::Router
                ),
                "unexpected class {class:?} in overview"
            );
        }

        // Every served link's endpoints stay within the filtered node set.
        for link in &snapshot.links {
            assert!(snapshot.nodes.iter().any(|node| node.id == link.source));
            assert!(snapshot.nodes.iter().any(|node| node.id == link.target));
        }
    }

    #[test]
    fn full_view_serves_every_device() {
        let state = DemoServerState::seeded();
        let snapshot = build_snapshot(&state.seed, TopologyView::Full, None, UNIX_EPOCH);
        assert_eq!(snapshot.nodes.len(), state.seed.nodes.len());
        assert_eq!(snapshot.links.len(), state.seed.links.len());
        assert_eq!(
            snapshot.last_updated.as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
    }

    #[test]
    fn group_view_restricts_to_member_devices() {
        let state = DemoServerState::seeded();
        let snapshot = build_snapshot(&state.seed, TopologyView::Group, Some(2), UNIX_EPOCH);

        let ids: Vec<&str> = snapshot.nodes.iter().map(|node| node.id.as_str()).collect();
        assert!(ids.contains(&"6"));
        assert!(ids.contains(&"7"));
        assert!(!ids.contains(&"1"), "core-sw-01 is not in Branch Access");

        let snapshot = build_snapshot(&state.seed, TopologyView::Group, Some(999), UNIX_EPOCH);
        assert!(snapshot.nodes.is_empty(), "unknown group serves nothing");
        assert!(snapshot.links.is_empty());
    }

    #[test]
    fn link_status_derives_from_peak_utilization() {
        assert_eq!(link_status_for_utilization(95.0), LinkStatus::Critical);
        assert_eq!(link_status_for_utilization(90.0), LinkStatus::Critical);
        assert_eq!(link_status_for_utilization(75.0), LinkStatus::Warning);
        assert_eq!(link_status_for_utilization(55.0), LinkStatus::Elevated);
        assert_eq!(link_status_for_utilization(10.0), LinkStatus::Normal);
    }

    #[test]
    fn served_links_carry_recomputed_status() {
        let state = DemoServerState::seeded();
        let snapshot = build_snapshot(&state.seed, TopologyView::Full, None, UNIX_EPOCH);

        let hot_link = snapshot
            .links
            .iter()
            .find(|link| link.source == "4" && link.target == "5")
            .expect("firewall uplink should be served");
        assert_eq!(hot_link.status, LinkStatus::Critical);

        let idle_link = snapshot
            .links
            .iter()
            .find(|link| link.source == "3" && link.target == "7")
            .expect("idle access link should be served");
        assert_eq!(idle_link.status, LinkStatus::Normal);
    }
}
