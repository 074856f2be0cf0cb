use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use tracing::debug;

use crate::theme::Theme;
use crate::topology::layout::{ForceLayout, LayoutConfig, LayoutLink, LayoutNode};
use crate::topology::{
    DeviceClass, TopologyLink, TopologyNode, TopologySnapshot, format_bandwidth,
    link_stroke_width,
};

use super::events::CanvasSelection;

const FALLBACK_SURFACE: Vec2 = Vec2::new(800.0, 600.0);
const MIN_SCALE: f32 = 0.1;
const MAX_SCALE: f32 = 4.0;
const FIT_PADDING: f32 = 60.0;
const FIT_DURATION_SECS: f64 = 0.75;
const RESET_DURATION_SECS: f64 = 0.5;
const RESIZE_NUDGE_ALPHA: f32 = 0.3;
const DRAG_ALPHA_TARGET: f32 = 0.3;
const LINK_HIT_SLOP: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
struct CanvasNode {
    data: TopologyNode,
    class: DeviceClass,
    radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct CanvasLink {
    data: TopologyLink,
    source: usize,
    target: usize,
    width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraTransform {
    translation: Vec2,
    scale: f32,
}

impl CameraTransform {
    const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        scale: 1.0,
    };

    fn world_to_screen(&self, origin: Pos2, world: Pos2) -> Pos2 {
        origin + self.translation + world.to_vec2() * self.scale
    }

    fn lerp(from: Self, to: Self, t: f32) -> Self {
        Self {
            translation: from.translation + (to.translation - from.translation) * t,
            scale: from.scale + (to.scale - from.scale) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraAnimation {
    from: CameraTransform,
    to: CameraTransform,
    start_time: f64,
    duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraRequest {
    FitView,
    ResetZoom,
}

/// Interactive force-directed topology view.
///
/// Holds the current snapshot's nodes and links, steps the force layout each
/// frame until it settles, and owns the pan/zoom camera. All visual state is
/// rebuilt from scratch on [`TopologyCanvas::set_data`]; nothing survives a
/// snapshot replacement, including drag pins.
pub struct TopologyCanvas {
    nodes: Vec<CanvasNode>,
    positions: Vec<LayoutNode>,
    links: Vec<CanvasLink>,
    sim_links: Vec<LayoutLink>,
    layout: ForceLayout,
    camera: CameraTransform,
    animation: Option<CameraAnimation>,
    pending_camera: Option<CameraRequest>,
    surface: Vec2,
    theme: Theme,
    show_ip_labels: bool,
    dragged: Option<usize>,
}

impl TopologyCanvas {
    pub fn new(theme: Theme) -> Self {
        let surface = FALLBACK_SURFACE;
        let layout = ForceLayout::new(LayoutConfig {
            center: (surface.x / 2.0, surface.y / 2.0),
            ..LayoutConfig::default()
        });

        Self {
            nodes: Vec::new(),
            positions: Vec::new(),
            links: Vec::new(),
            sim_links: Vec::new(),
            layout,
            camera: CameraTransform::IDENTITY,
            animation: None,
            pending_camera: None,
            surface,
            theme,
            show_ip_labels: false,
            dragged: None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn show_ip_labels(&self) -> bool {
        self.show_ip_labels
    }

    pub fn set_show_ip_labels(&mut self, show: bool) {
        self.show_ip_labels = show;
    }

    /// Replace the rendered snapshot wholesale and restart the simulation at
    /// full energy. Links whose endpoints do not resolve to a node in the
    /// same snapshot are omitted.
    pub fn set_data(&mut self, snapshot: &TopologySnapshot) {
        self.nodes = snapshot
            .nodes
            .iter()
            .map(|node| {
                let class = node.device_class();
                CanvasNode {
                    data: node.clone(),
                    class,
                    radius: class.node_radius(),
                }
            })
            .collect();

        let index_by_id: HashMap<&str, usize> = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();

        self.links = Vec::with_capacity(snapshot.links.len());
        let mut dropped = 0_usize;
        for link in &snapshot.links {
            match (
                index_by_id.get(link.source.as_str()),
                index_by_id.get(link.target.as_str()),
            ) {
                (Some(&source), Some(&target)) => {
                    self.links.push(CanvasLink {
                        width: link_stroke_width(link.total_bandwidth_mbps),
                        data: link.clone(),
                        source,
                        target,
                    });
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "omitted links with unresolvable endpoints");
        }

        self.sim_links = self
            .links
            .iter()
            .map(|link| LayoutLink {
                source: link.source,
                target: link.target,
            })
            .collect();

        self.positions = vec![LayoutNode::default(); self.nodes.len()];
        self.layout.seed_positions(&mut self.positions);
        self.layout.set_alpha_target(0.0);
        self.layout.restart();
        self.dragged = None;
    }

    /// Animate the camera to frame all rendered content, never zooming past
    /// 100%. No-op when nothing is rendered.
    pub fn fit_view(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.pending_camera = Some(CameraRequest::FitView);
    }

    /// Animate the camera back to the identity transform.
    pub fn reset_zoom(&mut self) {
        self.pending_camera = Some(CameraRequest::ResetZoom);
    }

    /// Pure styling pass; layout and data are untouched.
    pub fn update_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn show(&mut self, ui: &mut Ui) -> Option<CanvasSelection> {
        let rect = ui.available_rect_before_wrap();
        let rect = if rect.width() <= 0.0 || rect.height() <= 0.0 {
            Rect::from_min_size(rect.min, FALLBACK_SURFACE)
        } else {
            rect
        };
        self.handle_resize(rect.size());

        let background = ui.allocate_rect(rect, Sense::click_and_drag());
        let now = ui.input(|input| input.time);
        self.apply_pending_camera(now);
        self.step_camera(now);
        if self.animation.is_some() {
            ui.ctx().request_repaint();
        }

        if self.layout.is_active() {
            self.layout.tick(&mut self.positions, &self.sim_links);
            ui.ctx().request_repaint();
        }

        let palette = self.theme.palette();
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, egui::CornerRadius::ZERO, palette.canvas_background);

        let origin = rect.min;
        let scale = self.camera.scale;
        let label_font = FontId::proportional((12.0 * scale).max(5.0));
        let small_font = FontId::proportional((10.0 * scale).max(5.0));

        // Links first so nodes draw on top.
        for link in &self.links {
            let source = self.screen_position(origin, link.source);
            let target = self.screen_position(origin, link.target);
            let color = palette.link_color(link.data.status);
            painter.line_segment([source, target], Stroke::new(link.width * scale, color));

            let midpoint = Pos2::new((source.x + target.x) / 2.0, (source.y + target.y) / 2.0);
            painter.text(
                midpoint + Vec2::new(0.0, -10.0 * scale),
                Align2::CENTER_CENTER,
                format_bandwidth(link.data.total_bandwidth_mbps),
                label_font.clone(),
                palette.text_primary,
            );
            painter.text(
                midpoint + Vec2::new(0.0, 12.0 * scale),
                Align2::CENTER_CENTER,
                format!("{:.1}%", link.data.peak_utilization_percent()),
                small_font.clone(),
                palette.text_secondary,
            );
        }

        let mut selection = None;

        for index in 0..self.nodes.len() {
            let center = self.screen_position(origin, index);
            let radius = self.nodes[index].radius * scale;

            let hit_rect = Rect::from_center_size(center, Vec2::splat(radius * 2.0));
            let id = ui.id().with(("topology-node", index));
            let response = ui.interact(hit_rect, id, Sense::click_and_drag());

            if response.drag_started() {
                self.begin_node_drag(index);
            }
            if response.dragged() && self.dragged == Some(index) {
                self.drag_node_by(index, response.drag_delta() / scale);
                ui.ctx().request_repaint();
            }
            if response.drag_stopped() && self.dragged == Some(index) {
                self.end_node_drag(index);
            }
            if response.clicked() {
                selection = Some(CanvasSelection::Node(self.nodes[index].data.clone()));
            }

            self.paint_node(&painter, index, center, scale, label_font.clone());
        }

        // Background interactions: pan, zoom, link clicks.
        if background.dragged() && self.dragged.is_none() {
            self.camera.translation += background.drag_delta();
            self.animation = None;
        }

        if selection.is_none()
            && background.clicked()
            && let Some(pointer) = background.interact_pointer_pos()
        {
            selection = self.link_at(origin, pointer);
        }

        if background.hovered() {
            self.handle_zoom(ui, origin);
        }

        selection
    }

    fn handle_resize(&mut self, size: Vec2) {
        if size == self.surface {
            return;
        }
        self.surface = size;
        self.layout.set_center(size.x / 2.0, size.y / 2.0);
        self.layout.nudge(RESIZE_NUDGE_ALPHA);
    }

    fn apply_pending_camera(&mut self, now: f64) {
        let Some(request) = self.pending_camera.take() else {
            return;
        };

        let (to, duration) = match request {
            CameraRequest::FitView => {
                let Some((min, max)) = self.content_bounds() else {
                    return;
                };
                (
                    fit_transform(min, max, self.surface, FIT_PADDING),
                    FIT_DURATION_SECS,
                )
            }
            CameraRequest::ResetZoom => (CameraTransform::IDENTITY, RESET_DURATION_SECS),
        };

        self.animation = Some(CameraAnimation {
            from: self.camera,
            to,
            start_time: now,
            duration,
        });
    }

    fn step_camera(&mut self, now: f64) {
        let Some(animation) = self.animation else {
            return;
        };

        let t = ((now - animation.start_time) / animation.duration).clamp(0.0, 1.0) as f32;
        self.camera = CameraTransform::lerp(animation.from, animation.to, ease_in_out_cubic(t));
        if t >= 1.0 {
            self.animation = None;
        }
    }

    fn content_bounds(&self) -> Option<(Pos2, Pos2)> {
        let mut bounds: Option<(Pos2, Pos2)> = None;
        for (position, node) in self.positions.iter().zip(&self.nodes) {
            let min = Pos2::new(position.x - node.radius, position.y - node.radius);
            let max = Pos2::new(position.x + node.radius, position.y + node.radius);
            bounds = Some(match bounds {
                None => (min, max),
                Some((current_min, current_max)) => (
                    Pos2::new(current_min.x.min(min.x), current_min.y.min(min.y)),
                    Pos2::new(current_max.x.max(max.x), current_max.y.max(max.y)),
                ),
            });
        }
        bounds
    }

    fn screen_position(&self, origin: Pos2, index: usize) -> Pos2 {
        let position = &self.positions[index];
        self.camera
            .world_to_screen(origin, Pos2::new(position.x, position.y))
    }

    fn begin_node_drag(&mut self, index: usize) {
        self.dragged = Some(index);
        self.layout.set_alpha_target(DRAG_ALPHA_TARGET);
        self.positions[index].pin();
    }

    fn drag_node_by(&mut self, index: usize, world_delta: Vec2) {
        let position = &mut self.positions[index];
        let fx = position.fx.unwrap_or(position.x) + world_delta.x;
        let fy = position.fy.unwrap_or(position.y) + world_delta.y;
        position.pin_at(fx, fy);
    }

    fn end_node_drag(&mut self, index: usize) {
        self.layout.set_alpha_target(0.0);
        self.positions[index].release();
        self.dragged = None;
    }

    fn paint_node(
        &self,
        painter: &egui::Painter,
        index: usize,
        center: Pos2,
        scale: f32,
        label_font: FontId,
    ) {
        let palette = self.theme.palette();
        let node = &self.nodes[index];
        let radius = node.radius * scale;
        let status = node.data.status;

        painter.circle_filled(center, radius, palette.node_fill(status));
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(2.0 * scale, palette.node_stroke(status)),
        );
        if status == crate::topology::NodeStatus::Offline {
            // Offline devices get a second outer ring so they read at a glance.
            painter.circle_stroke(
                center,
                radius + 4.0 * scale,
                Stroke::new(1.5 * scale, palette.node_offline_stroke),
            );
        }

        painter.text(
            center,
            Align2::CENTER_CENTER,
            node.class.glyph(),
            FontId::monospace((9.0 * scale).max(5.0)),
            Color32::WHITE,
        );

        let mut label_y = node.radius + 14.0;
        painter.text(
            center + Vec2::new(0.0, label_y * scale),
            Align2::CENTER_CENTER,
            &node.data.hostname,
            label_font.clone(),
            palette.text_primary,
        );
        label_y += 14.0;
        painter.text(
            center + Vec2::new(0.0, label_y * scale),
            Align2::CENTER_CENTER,
            node.data.vendor_display_name(),
            FontId::proportional((10.0 * scale).max(5.0)),
            palette.text_secondary,
        );
        if self.show_ip_labels {
            label_y += 13.0;
            painter.text(
                center + Vec2::new(0.0, label_y * scale),
                Align2::CENTER_CENTER,
                &node.data.ip_address,
                FontId::proportional((10.0 * scale).max(5.0)),
                palette.text_secondary,
            );
        }

        if node.data.alert_count > 0 {
            let badge_center = center + Vec2::new(15.0, -15.0) * scale;
            painter.circle_filled(badge_center, 8.0 * scale, palette.alert_badge);
            painter.text(
                badge_center,
                Align2::CENTER_CENTER,
                node.data.alert_count.to_string(),
                FontId::proportional((10.0 * scale).max(5.0)),
                palette.badge_text,
            );
        }
    }

    fn link_at(&self, origin: Pos2, pointer: Pos2) -> Option<CanvasSelection> {
        let scale = self.camera.scale;
        let mut best: Option<(f32, usize)> = None;
        for (index, link) in self.links.iter().enumerate() {
            let source = self.screen_position(origin, link.source);
            let target = self.screen_position(origin, link.target);
            let tolerance = link.width * scale / 2.0 + LINK_HIT_SLOP;
            let distance_sq = point_segment_distance_sq(pointer, source, target);
            if distance_sq <= tolerance * tolerance
                && best.is_none_or(|(best_distance, _)| distance_sq < best_distance)
            {
                best = Some((distance_sq, index));
            }
        }

        best.map(|(_, index)| {
            let link = &self.links[index];
            CanvasSelection::Link {
                link: link.data.clone(),
                source: self.nodes[link.source].data.clone(),
                target: self.nodes[link.target].data.clone(),
            }
        })
    }

    fn handle_zoom(&mut self, ui: &Ui, origin: Pos2) {
        let (zoom_delta, scroll, pointer) = ui.input(|input| {
            (
                input.zoom_delta(),
                input.raw_scroll_delta,
                input.pointer.hover_pos(),
            )
        });

        let mut factor = zoom_delta;
        if scroll.y != 0.0 {
            factor *= (scroll.y * 0.002).exp();
        }
        if factor == 1.0 {
            return;
        }

        let new_scale = (self.camera.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == self.camera.scale {
            return;
        }

        // Zoom about the pointer so the world point under it stays fixed.
        let anchor = pointer.unwrap_or(origin + self.surface / 2.0);
        let anchor_offset = anchor - origin;
        let world = (anchor_offset - self.camera.translation) / self.camera.scale;
        self.camera.translation = anchor_offset - world * new_scale;
        self.camera.scale = new_scale;
        self.animation = None;
    }
}

fn fit_transform(min: Pos2, max: Pos2, surface: Vec2, padding: f32) -> CameraTransform {
    let width = (max.x - min.x).max(1.0);
    let height = (max.y - min.y).max(1.0);
    let scale = (surface.x / (width + padding * 2.0))
        .min(surface.y / (height + padding * 2.0))
        .min(1.0)
        .max(MIN_SCALE);
    let center = Vec2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    CameraTransform {
        translation: surface / 2.0 - center * scale,
        scale,
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

fn point_segment_distance_sq(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq == 0.0 {
        return (point - a).length_sq();
    }

    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (point - closest).length_sq()
}
