use std::time::Duration;

use anyhow::{Context, Result};
use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{info, warn};

use crate::api::{Alert, AlertSeverity, DeviceGroup};
use crate::config::{DashboardSettings, TopologyView};
use crate::i18n::{Language, MessageKey, TranslationCatalog};
use crate::poll::{DashboardRefreshUpdate, PollHandle, spawn_topology_poll_worker};
use crate::sound::{AlertSounder, AudioPolicy, ToneKind};
use crate::theme::{Palette, Theme};
use crate::topology::format_bandwidth;

pub mod canvas;
pub mod events;

use self::canvas::TopologyCanvas;
use self::events::CanvasSelection;

const APP_TITLE: &str = "netmap studio";

pub fn run_studio(settings: &DashboardSettings) -> Result<()> {
    let runtime_handle = Handle::try_current().context("studio requires a tokio runtime")?;
    let (poll_handle, update_rx) = spawn_topology_poll_worker(&runtime_handle, settings);
    let app_settings = settings.clone();

    info!(
        api_base_url = %settings.api_base_url,
        view = %settings.default_view,
        poll_interval_secs = settings.poll_interval_secs,
        "starting native dashboard shell"
    );

    eframe::run_native(
        APP_TITLE,
        eframe::NativeOptions::default(),
        Box::new(move |_cc| {
            Ok(Box::new(DashboardApp::new(
                app_settings,
                poll_handle,
                update_rx,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("dashboard UI exited with error: {error}"))
}

struct DashboardApp {
    poll_handle: PollHandle,
    update_rx: UnboundedReceiver<DashboardRefreshUpdate>,
    canvas: TopologyCanvas,
    catalog: TranslationCatalog,
    theme: Theme,
    sounder: AlertSounder,
    view: TopologyView,
    group_id: Option<u64>,
    groups: Vec<DeviceGroup>,
    alerts: Vec<Alert>,
    selection: Option<CanvasSelection>,
    last_updated: Option<String>,
    status_line: String,
    first_fit_done: bool,
    poll_disconnected: bool,
}

impl DashboardApp {
    fn new(
        settings: DashboardSettings,
        poll_handle: PollHandle,
        update_rx: UnboundedReceiver<DashboardRefreshUpdate>,
    ) -> Self {
        let catalog = TranslationCatalog::new(settings.language);
        Self {
            poll_handle,
            update_rx,
            canvas: TopologyCanvas::new(settings.theme),
            theme: settings.theme,
            sounder: AlertSounder::new(AudioPolicy::new(settings.notify_sound)),
            view: settings.default_view,
            group_id: None,
            groups: Vec::new(),
            alerts: Vec::new(),
            selection: None,
            last_updated: None,
            status_line: catalog.t(MessageKey::Loading).to_owned(),
            catalog,
            first_fit_done: false,
            poll_disconnected: false,
        }
    }

    fn drain_updates(&mut self) {
        loop {
            match self.update_rx.try_recv() {
                Ok(update) => self.apply_update(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.poll_disconnected {
                        warn!("dashboard poll worker disconnected");
                        self.status_line =
                            "Poll worker disconnected. Restart the dashboard to continue."
                                .to_owned();
                    }
                    self.poll_disconnected = true;
                    break;
                }
            }
        }
    }

    fn apply_update(&mut self, update: DashboardRefreshUpdate) {
        self.status_line = refresh_status_line(
            update.trigger.label(),
            update.topology.nodes.len(),
            update.topology.links.len(),
        );
        self.last_updated = update.topology.last_updated.clone();

        if let Some(alerts) = update.alerts {
            if let Some(kind) = tone_for_alert_transition(&self.alerts, &alerts) {
                self.sounder.notify(kind);
            }
            self.alerts = alerts;
        }
        if let Some(groups) = update.groups {
            self.groups = groups;
        }

        let has_nodes = !update.topology.nodes.is_empty();
        self.canvas.set_data(&update.topology);

        // Auto-fit once the first populated snapshot lands.
        if !self.first_fit_done && has_nodes {
            self.canvas.fit_view();
            self.first_fit_done = true;
        }
    }

    fn switch_view(&mut self, view: TopologyView) {
        self.view = view;
        match view {
            TopologyView::Group => {
                // Group view waits for a group selection before fetching.
                if let Some(group_id) = self.group_id {
                    self.poll_handle.set_view(view, Some(group_id));
                }
            }
            TopologyView::Overview | TopologyView::Full => {
                self.poll_handle.set_view(view, None);
            }
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.canvas.update_theme(theme);
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(self.catalog.t(MessageKey::Topology));
            ui.separator();

            for (view, key) in [
                (TopologyView::Overview, MessageKey::Overview),
                (TopologyView::Full, MessageKey::FullMap),
                (TopologyView::Group, MessageKey::GroupView),
            ] {
                if ui
                    .selectable_label(self.view == view, self.catalog.t(key))
                    .clicked()
                {
                    self.switch_view(view);
                }
            }

            if self.view == TopologyView::Group {
                self.render_group_picker(ui);
            }

            ui.separator();
            if ui.button(self.catalog.t(MessageKey::Refresh)).clicked() {
                self.poll_handle.request_refresh();
            }
            if ui.button(self.catalog.t(MessageKey::Fit)).clicked() {
                self.canvas.fit_view();
            }
            if ui.button(self.catalog.t(MessageKey::ResetZoom)).clicked() {
                self.canvas.reset_zoom();
            }

            ui.separator();
            let theme_icon = match self.theme {
                Theme::Light => "☀",
                Theme::Dark => "🌙",
            };
            if ui.button(theme_icon).clicked() {
                self.set_theme(self.theme.toggled());
            }

            let mut show_ip = self.canvas.show_ip_labels();
            if ui
                .checkbox(&mut show_ip, self.catalog.t(MessageKey::IpAddress))
                .changed()
            {
                self.canvas.set_show_ip_labels(show_ip);
            }

            self.render_language_picker(ui);
        });

        ui.horizontal(|ui| {
            ui.label(&self.status_line);
            if let Some(last_updated) = &self.last_updated {
                ui.separator();
                ui.label(format!(
                    "{}: {last_updated}",
                    self.catalog.t(MessageKey::LastUpdate)
                ));
            }
            if self.poll_disconnected {
                ui.colored_label(
                    self.theme.palette().link_critical,
                    "Poll worker is disconnected.",
                );
            }
        });
    }

    fn render_group_picker(&mut self, ui: &mut egui::Ui) {
        let options: Vec<(u64, String)> = self
            .groups
            .iter()
            .map(|group| {
                (
                    group.id,
                    format!("{} ({})", group.name, group.device_count),
                )
            })
            .collect();
        let selected_text = self
            .group_id
            .and_then(|id| {
                options
                    .iter()
                    .find(|(option_id, _)| *option_id == id)
                    .map(|(_, label)| label.clone())
            })
            .unwrap_or_else(|| self.catalog.t(MessageKey::SelectGroup).to_owned());

        let mut chosen = self.group_id;
        egui::ComboBox::from_id_salt("dashboard_group_picker")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for (id, label) in &options {
                    ui.selectable_value(&mut chosen, Some(*id), label);
                }
            });

        if chosen != self.group_id {
            self.group_id = chosen;
            if let Some(group_id) = chosen {
                self.poll_handle.set_view(TopologyView::Group, Some(group_id));
            }
        }
    }

    fn render_language_picker(&mut self, ui: &mut egui::Ui) {
        let mut language = self.catalog.language();
        egui::ComboBox::from_id_salt("dashboard_language_picker")
            .selected_text(language.label())
            .show_ui(ui, |ui| {
                for option in Language::ALL {
                    ui.selectable_value(&mut language, option, option.label());
                }
            });
        if language != self.catalog.language() {
            self.catalog.set_language(language);
        }
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        let palette = self.theme.palette();

        ui.heading(format!(
            "{} ({})",
            self.catalog.t(MessageKey::ActiveAlerts),
            self.alerts.len()
        ));
        egui::ScrollArea::vertical()
            .id_salt("dashboard_alert_list")
            .max_height(220.0)
            .show(ui, |ui| {
                if self.alerts.is_empty() {
                    ui.label(self.catalog.t(MessageKey::NoActiveAlerts));
                    return;
                }

                for alert in &self.alerts {
                    ui.horizontal(|ui| {
                        ui.colored_label(
                            severity_color(palette, alert.severity),
                            alert.kind().label(&alert.alert_type),
                        );
                        if let Some(triggered_at) = &alert.triggered_at {
                            ui.label(
                                egui::RichText::new(triggered_at)
                                    .color(palette.text_secondary)
                                    .small(),
                            );
                        }
                    });
                    ui.label(alert.display_text());
                    ui.add_space(4.0);
                }
            });

        ui.separator();
        self.render_detail_panel(ui);
    }

    fn render_detail_panel(&mut self, ui: &mut egui::Ui) {
        let Some(selection) = self.selection.clone() else {
            ui.label(self.catalog.t(MessageKey::Details));
            return;
        };

        let heading = match &selection {
            CanvasSelection::Node(node) => node.hostname.as_str(),
            CanvasSelection::Link { .. } => self.catalog.t(MessageKey::LinkDetails),
        };
        ui.horizontal(|ui| {
            ui.heading(heading);
            if ui.button(self.catalog.t(MessageKey::Close)).clicked() {
                self.selection = None;
            }
        });

        match &selection {
            CanvasSelection::Node(node) => self.render_node_details(ui, node),
            CanvasSelection::Link {
                link,
                source,
                target,
            } => self.render_link_details(ui, link, source, target),
        }
    }

    fn render_node_details(&self, ui: &mut egui::Ui, node: &crate::topology::TopologyNode) {
        let catalog = &self.catalog;
        ui.label(egui::RichText::new(catalog.t(MessageKey::DeviceInfo)).strong());
        detail_row(ui, catalog.t(MessageKey::IpAddress), &node.ip_address);
        detail_row(
            ui,
            catalog.t(MessageKey::Type),
            catalog.device_class(node.device_class()),
        );
        detail_row(
            ui,
            catalog.t(MessageKey::Vendor),
            &node.vendor_display_name(),
        );
        detail_row(
            ui,
            catalog.t(MessageKey::Status),
            catalog.node_status(node.status),
        );

        ui.add_space(6.0);
        ui.label(egui::RichText::new(catalog.t(MessageKey::Metrics)).strong());
        detail_row(
            ui,
            catalog.t(MessageKey::Cpu),
            &format_metric_percent(node.cpu_percent),
        );
        detail_row(
            ui,
            catalog.t(MessageKey::Memory),
            &format_metric_percent(node.memory_percent),
        );

        if node.alert_count > 0 {
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new(format!(
                    "{} ({})",
                    catalog.t(MessageKey::ActiveAlerts),
                    node.alert_count
                ))
                .strong(),
            );
        }
    }

    fn render_link_details(
        &self,
        ui: &mut egui::Ui,
        link: &crate::topology::TopologyLink,
        source: &crate::topology::TopologyNode,
        target: &crate::topology::TopologyNode,
    ) {
        let catalog = &self.catalog;
        let palette = self.theme.palette();

        ui.label(egui::RichText::new(catalog.t(MessageKey::Connection)).strong());
        detail_row(ui, catalog.t(MessageKey::From), &source.hostname);
        detail_row(ui, catalog.t(MessageKey::To), &target.hostname);

        ui.add_space(6.0);
        ui.label(egui::RichText::new(catalog.t(MessageKey::Bandwidth)).strong());
        detail_row(
            ui,
            catalog.t(MessageKey::Total),
            &format_bandwidth(link.total_bandwidth_mbps),
        );
        detail_row(
            ui,
            catalog.t(MessageKey::InUtilization),
            &format!("{:.1}%", link.utilization_in_percent),
        );
        detail_row(
            ui,
            catalog.t(MessageKey::OutUtilization),
            &format!("{:.1}%", link.utilization_out_percent),
        );
        ui.horizontal(|ui| {
            ui.label(catalog.t(MessageKey::Status));
            ui.colored_label(
                palette.link_color(link.status),
                catalog.link_status(link.status),
            );
        });

        if !link.port_details.is_empty() {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(catalog.t(MessageKey::PortDetails)).strong());
            for port in &link.port_details {
                detail_row(
                    ui,
                    &format!("{} ↔ {}", port.local_port, port.remote_port),
                    &format_bandwidth(port.bandwidth_mbps),
                );
            }
        }
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        self.poll_handle.shutdown();
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_updates();

        egui::TopBottomPanel::top("dashboard_controls")
            .show(ctx, |ui| self.render_controls(ui));

        egui::SidePanel::right("dashboard_details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.render_side_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(selection) = self.canvas.show(ui) {
                self.selection = Some(selection);
            }
        });

        ctx.request_repaint_after(Duration::from_millis(120));
    }
}

fn detail_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(value);
        });
    });
}

fn severity_color(palette: &Palette, severity: AlertSeverity) -> egui::Color32 {
    match severity {
        AlertSeverity::Critical => palette.link_critical,
        AlertSeverity::Warning => palette.link_warning,
        AlertSeverity::Info => palette.text_secondary,
    }
}

fn format_metric_percent(value: Option<f32>) -> String {
    match value {
        Some(value) => format!("{value:.1}%"),
        None => "N/A".to_owned(),
    }
}

fn refresh_status_line(trigger: &str, node_count: usize, link_count: usize) -> String {
    format!("Topology refreshed ({node_count} nodes, {link_count} links, trigger: {trigger})")
}

fn severity_count(alerts: &[Alert], severity: AlertSeverity) -> usize {
    alerts
        .iter()
        .filter(|alert| alert.severity == severity)
        .count()
}

/// Decide which tone (if any) a refreshed alert list deserves: critical
/// growth wins over warning growth, shrinking lists stay silent.
fn tone_for_alert_transition(previous: &[Alert], current: &[Alert]) -> Option<ToneKind> {
    let critical_before = severity_count(previous, AlertSeverity::Critical);
    let critical_now = severity_count(current, AlertSeverity::Critical);
    if critical_now > critical_before {
        return Some(ToneKind::Critical);
    }

    let warning_before = severity_count(previous, AlertSeverity::Warning);
    let warning_now = severity_count(current, AlertSeverity::Warning);
    if warning_now > warning_before {
        return Some(ToneKind::Warning);
    }

    None
}

#[cfg(test)]
mod tests {
    use crate::api::{Alert, AlertSeverity};
    use crate::sound::ToneKind;

    use super::{
        format_metric_percent, refresh_status_line, severity_count, tone_for_alert_transition,
    };

    fn alert(id: u64, severity: AlertSeverity) -> Alert {
        Alert {
            id,
            device_id: None,
            severity,
            alert_type: "cpu_high".to_owned(),
            message: None,
            triggered_at: None,
            current_value: None,
            threshold_value: None,
        }
    }

    #[test]
    fn metric_percent_formats_or_falls_back() {
        assert_eq!(format_metric_percent(Some(62.84)), "62.8%");
        assert_eq!(format_metric_percent(None), "N/A");
    }

    #[test]
    fn status_line_reports_counts_and_trigger() {
        assert_eq!(
            refresh_status_line("manual", 12, 18),
            "Topology refreshed (12 nodes, 18 links, trigger: manual)"
        );
    }

    #[test]
    fn severity_count_filters_by_severity() {
        let alerts = vec![
            alert(1, AlertSeverity::Critical),
            alert(2, AlertSeverity::Warning),
            alert(3, AlertSeverity::Critical),
        ];
        assert_eq!(severity_count(&alerts, AlertSeverity::Critical), 2);
        assert_eq!(severity_count(&alerts, AlertSeverity::Warning), 1);
        assert_eq!(severity_count(&alerts, AlertSeverity::Info), 0);
    }

    #[test]
    fn new_critical_alerts_win_over_warnings() {
        let previous = vec![alert(1, AlertSeverity::Warning)];
        let current = vec![
            alert(1, AlertSeverity::Warning),
            alert(2, AlertSeverity::Warning),
            alert(3, AlertSeverity::Critical),
        ];
        assert_eq!(
            tone_for_alert_transition(&previous, &current),
            Some(ToneKind::Critical)
        );
    }

    #[test]
    fn warning_growth_alone_plays_the_warning_tone() {
        let previous = vec![alert(1, AlertSeverity::Critical)];
        let current = vec![
            alert(1, AlertSeverity::Critical),
            alert(2, AlertSeverity::Warning),
        ];
        assert_eq!(
            tone_for_alert_transition(&previous, &current),
            Some(ToneKind::Warning)
        );
    }

    #[test]
    fn resolved_alerts_stay_silent() {
        let previous = vec![
            alert(1, AlertSeverity::Critical),
            alert(2, AlertSeverity::Warning),
        ];
        let current = vec![alert(2, AlertSeverity::Warning)];
        assert_eq!(tone_for_alert_transition(&previous, &current), None);
    }
}
