use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Duration, interval};
use tracing::{debug, warn};

use crate::api::{Alert, DeviceGroup, TopologyApiClient};
use crate::config::{DashboardSettings, TopologyView};
use crate::topology::TopologySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Interval,
    Manual,
    ViewChanged,
}

impl RefreshTrigger {
    pub fn label(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Interval => "interval",
            Self::Manual => "manual",
            Self::ViewChanged => "view_changed",
        }
    }
}

/// One completed refresh cycle. `alerts` is `None` when the alert fetch
/// failed (the UI keeps its previous list); `groups` is only populated on
/// the startup fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRefreshUpdate {
    pub topology: TopologySnapshot,
    pub alerts: Option<Vec<Alert>>,
    pub groups: Option<Vec<DeviceGroup>>,
    pub trigger: RefreshTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    pub poll_interval: Duration,
}

impl PollConfig {
    pub fn from_settings(settings: &DashboardSettings) -> Self {
        Self {
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollHandle {
    command_tx: UnboundedSender<PollCommand>,
}

impl PollHandle {
    pub fn request_refresh(&self) {
        let _ = self.command_tx.send(PollCommand::Refresh);
    }

    pub fn set_view(&self, view: TopologyView, group_id: Option<u64>) {
        let _ = self.command_tx.send(PollCommand::SetView { view, group_id });
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(PollCommand::Shutdown);
    }
}

#[derive(Debug)]
enum PollCommand {
    Refresh,
    SetView {
        view: TopologyView,
        group_id: Option<u64>,
    },
    Shutdown,
}

pub fn spawn_topology_poll_worker(
    handle: &Handle,
    settings: &DashboardSettings,
) -> (PollHandle, UnboundedReceiver<DashboardRefreshUpdate>) {
    spawn_topology_poll_worker_with_config(
        handle,
        TopologyApiClient::new(settings),
        PollConfig::from_settings(settings),
        settings.default_view,
    )
}

fn spawn_topology_poll_worker_with_config(
    handle: &Handle,
    client: TopologyApiClient,
    config: PollConfig,
    initial_view: TopologyView,
) -> (PollHandle, UnboundedReceiver<DashboardRefreshUpdate>) {
    let (command_tx, command_rx) = unbounded_channel();
    let (update_tx, update_rx) = unbounded_channel();
    let poll_handle = PollHandle { command_tx };

    let _task = handle.spawn(run_poll_loop(
        client,
        config,
        initial_view,
        command_rx,
        update_tx,
    ));

    (poll_handle, update_rx)
}

async fn run_poll_loop(
    client: TopologyApiClient,
    config: PollConfig,
    initial_view: TopologyView,
    mut command_rx: UnboundedReceiver<PollCommand>,
    update_tx: UnboundedSender<DashboardRefreshUpdate>,
) {
    let mut view = initial_view;
    let mut group_id: Option<u64> = None;
    let mut ticker = interval(config.poll_interval);
    // The first tick of a tokio interval fires immediately; it doubles as
    // the startup fetch.
    let mut startup_done = false;

    loop {
        let trigger = tokio::select! {
            maybe_command = command_rx.recv() => {
                match maybe_command {
                    Some(PollCommand::Refresh) => RefreshTrigger::Manual,
                    Some(PollCommand::SetView { view: next_view, group_id: next_group }) => {
                        view = next_view;
                        group_id = next_group;
                        RefreshTrigger::ViewChanged
                    }
                    Some(PollCommand::Shutdown) | None => break,
                }
            }
            _ = ticker.tick() => {
                if startup_done {
                    RefreshTrigger::Interval
                } else {
                    RefreshTrigger::Startup
                }
            }
        };

        let topology = match client.fetch_topology(view, group_id).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    view = view.as_str(),
                    trigger = trigger.label(),
                    error = %error,
                    "topology fetch failed; keeping last snapshot"
                );
                continue;
            }
        };

        let alerts = match client.fetch_active_alerts().await {
            Ok(alerts) => Some(alerts),
            Err(error) => {
                warn!(error = %error, "alert fetch failed; keeping last alert list");
                None
            }
        };

        let groups = if trigger == RefreshTrigger::Startup {
            match client.fetch_groups().await {
                Ok(groups) => Some(groups),
                Err(error) => {
                    warn!(error = %error, "group fetch failed");
                    None
                }
            }
        } else {
            None
        };

        if trigger == RefreshTrigger::Startup {
            startup_done = true;
        }

        debug!(
            view = view.as_str(),
            trigger = trigger.label(),
            node_count = topology.nodes.len(),
            link_count = topology.links.len(),
            "topology refresh completed"
        );

        if update_tx
            .send(DashboardRefreshUpdate {
                topology,
                alerts,
                groups,
                trigger,
            })
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::runtime::Handle;
    use tokio::time::timeout;

    use crate::api::TopologyApiClient;
    use crate::config::TopologyView;
    use crate::server::{DemoServerState, router};
    use crate::test_support::settings_for_base_url;

    use super::{
        PollConfig, RefreshTrigger, spawn_topology_poll_worker_with_config,
    };

    #[test]
    fn trigger_labels_are_stable() {
        assert_eq!(RefreshTrigger::Startup.label(), "startup");
        assert_eq!(RefreshTrigger::Interval.label(), "interval");
        assert_eq!(RefreshTrigger::Manual.label(), "manual");
        assert_eq!(RefreshTrigger::ViewChanged.label(), "view_changed");
    }

    #[tokio::test]
    async fn poll_worker_emits_startup_and_manual_updates() {
        let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => {
                eprintln!("skipping: local TCP bind is not permitted in this environment");
                return;
            }
            Err(error) => panic!("ephemeral port should be available: {error}"),
        };
        let addr = listener.local_addr().expect("listener should have an address");
        let app = router(DemoServerState::seeded());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let settings = settings_for_base_url(&format!("http://{addr}/api/v1"));
        let client = TopologyApiClient::new(&settings);
        let (handle, mut update_rx) = spawn_topology_poll_worker_with_config(
            &Handle::current(),
            client,
            PollConfig {
                poll_interval: Duration::from_secs(120),
            },
            TopologyView::Full,
        );

        let startup = timeout(Duration::from_secs(5), update_rx.recv())
            .await
            .expect("startup update should arrive")
            .expect("startup update should be present");
        assert_eq!(startup.trigger, RefreshTrigger::Startup);
        assert!(!startup.topology.nodes.is_empty());
        assert!(startup.groups.is_some(), "startup should include groups");

        handle.request_refresh();
        let manual = timeout(Duration::from_secs(5), update_rx.recv())
            .await
            .expect("manual update should arrive")
            .expect("manual update should be present");
        assert_eq!(manual.trigger, RefreshTrigger::Manual);
        assert!(manual.groups.is_none(), "groups only load at startup");

        handle.set_view(TopologyView::Overview, None);
        let view_change = timeout(Duration::from_secs(5), update_rx.recv())
            .await
            .expect("view-change update should arrive")
            .expect("view-change update should be present");
        assert_eq!(view_change.trigger, RefreshTrigger::ViewChanged);

        handle.shutdown();
    }
}
