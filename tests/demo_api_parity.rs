use std::net::TcpListener;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

use netmap_studio::api::TopologyApiClient;
use netmap_studio::config::TopologyView;
use netmap_studio::test_support::settings_for_base_url;
use netmap_studio::topology::TopologySnapshot;
use tokio::time::sleep;

struct RunningServer {
    child: Child,
    bind_addr: String,
}

impl RunningServer {
    fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.bind_addr)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[tokio::test]
async fn client_and_demo_server_agree_on_the_topology_contract() {
    let Some(server) = start_demo_server().await else {
        eprintln!("skipping: local TCP bind is not permitted in this environment");
        return;
    };

    let settings = settings_for_base_url(&server.base_url());
    let client = TopologyApiClient::new(&settings);

    let full = client
        .fetch_topology(TopologyView::Full, None)
        .await
        .expect("full topology fetch should succeed");
    assert!(!full.nodes.is_empty(), "demo topology should have devices");
    assert!(full.last_updated.is_some());

    // Referential consistency: every served link resolves inside the snapshot.
    for link in &full.links {
        assert!(
            full.nodes.iter().any(|node| node.id == link.source),
            "link source {} should resolve",
            link.source
        );
        assert!(
            full.nodes.iter().any(|node| node.id == link.target),
            "link target {} should resolve",
            link.target
        );
    }

    let overview = client
        .fetch_topology(TopologyView::Overview, None)
        .await
        .expect("overview topology fetch should succeed");
    assert!(
        overview.nodes.len() < full.nodes.len(),
        "overview should filter access-layer devices"
    );

    let alerts = client
        .fetch_active_alerts()
        .await
        .expect("alert fetch should succeed");
    assert!(!alerts.is_empty(), "demo seed ships active alerts");

    let groups = client
        .fetch_groups()
        .await
        .expect("group fetch should succeed");
    assert!(!groups.is_empty(), "demo seed ships device groups");
    assert!(groups.iter().all(|group| group.device_count > 0));
}

#[tokio::test]
async fn snapshot_command_prints_the_same_payload_the_client_sees() {
    let Some(server) = start_demo_server().await else {
        eprintln!("skipping: local TCP bind is not permitted in this environment");
        return;
    };

    let settings = settings_for_base_url(&server.base_url());
    let client = TopologyApiClient::new(&settings);
    let fetched = client
        .fetch_topology(TopologyView::Full, None)
        .await
        .expect("full topology fetch should succeed");

    let output = run_snapshot_cli(&server.base_url(), "full");
    assert!(
        output.status.success(),
        "snapshot command should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let printed: TopologySnapshot = serde_json::from_slice(&output.stdout)
        .expect("snapshot output should be valid topology JSON");
    assert_eq!(printed.nodes, fetched.nodes);
    assert_eq!(printed.links, fetched.links);
}

async fn start_demo_server() -> Option<RunningServer> {
    let port = find_available_port()?;
    let bind_addr = format!("127.0.0.1:{port}");

    let mut command = Command::new(bin_path());
    command
        .args(["serve-demo", "--bind", &bind_addr])
        .env("RUST_LOG", "error")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => return None,
        Err(error) => panic!("demo server should start: {error}"),
    };

    let health_url = format!("http://{bind_addr}/health");
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Some(status) = child.try_wait().expect("failed to poll server process") {
            panic!("demo server exited before becoming healthy: {status}");
        }

        if let Ok(response) = client.get(&health_url).send().await
            && response.status().is_success()
        {
            return Some(RunningServer { child, bind_addr });
        }

        sleep(Duration::from_millis(50)).await;
    }

    let _ = child.kill();
    let _ = child.wait();
    panic!("demo server did not become healthy at {health_url}");
}

fn run_snapshot_cli(base_url: &str, view: &str) -> Output {
    let mut command = Command::new(bin_path());
    command
        .args(["snapshot", "--view", view])
        .env("API_BASE_URL", base_url)
        .env("RUST_LOG", "error");
    command.output().expect("snapshot command should execute")
}

fn find_available_port() -> Option<u16> {
    let listener = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener,
        Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => return None,
        Err(error) => panic!("ephemeral port should be available for bind: {error}"),
    };
    let port = listener
        .local_addr()
        .expect("ephemeral listener should have local address")
        .port();
    drop(listener);
    Some(port)
}

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_netmap_studio")
}
