use egui::epaint::Shadow;
use glam::Vec2;

use super::animator::FrameStats;
use super::palette::{DisplayMode, Rgba};
use super::surface::{DrawSurface, SurfaceMetrics};

/// Draw surface backed by egui shapes. The animator fills it during a
/// frame; `DebugOverlay::render` drains it into a background layer.
///
/// The shape buffer keeps its capacity between frames.
#[derive(Default)]
pub struct ShapeSurface {
    shapes: Vec<egui::Shape>,
    metrics: SurfaceMetrics,
}

impl ShapeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes_mut(&mut self) -> &mut Vec<egui::Shape> {
        &mut self.shapes
    }

    /// Logical-to-physical scale the shapes were produced for.
    pub fn pixels_per_point(&self) -> f32 {
        self.metrics.scale_factor()
    }
}

fn pos2(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

impl DrawSurface for ShapeSurface {
    fn configure(&mut self, metrics: &SurfaceMetrics) {
        self.metrics = *metrics;
        self.shapes.clear();
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.shapes.push(egui::Shape::line_segment(
            [pos2(from), pos2(to)],
            egui::Stroke::new(width, color.to_egui()),
        ));
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.shapes
            .push(egui::Shape::circle_filled(pos2(center), radius, color.to_egui()));
    }
}

pub struct DebugStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub frame_time_min_ms: f32,
    pub frame_time_max_ms: f32,
    pub point_count: usize,
    pub edge_count: usize,
    pub resolution: (u32, u32),
    pub scale_factor: f32,
    pub mode: DisplayMode,
}

/// Rolling one-second frame timing for the stats panel.
pub struct FrameTimer {
    last_frame: std::time::Instant,
    window_start: std::time::Instant,
    frames_in_window: u32,
    frame_ms: Vec<f32>,
    fps: u32,
    avg_ms: f32,
    min_ms: f32,
    max_ms: f32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = std::time::Instant::now();
        Self {
            last_frame: now,
            window_start: now,
            frames_in_window: 0,
            frame_ms: Vec::with_capacity(240),
            fps: 0,
            avg_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        }
    }

    /// Record one presented frame. Returns true when a new one-second
    /// window has just been summarised.
    pub fn record(&mut self) -> bool {
        let now = std::time::Instant::now();
        self.frame_ms
            .push((now - self.last_frame).as_secs_f32() * 1000.0);
        self.last_frame = now;
        self.frames_in_window += 1;

        if (now - self.window_start).as_secs_f32() < 1.0 {
            return false;
        }

        self.fps = self.frames_in_window;
        self.avg_ms = self.frame_ms.iter().sum::<f32>() / self.frame_ms.len() as f32;
        self.min_ms = self.frame_ms.iter().copied().fold(f32::INFINITY, f32::min);
        self.max_ms = self.frame_ms.iter().copied().fold(0.0, f32::max);
        self.frame_ms.clear();
        self.frames_in_window = 0;
        self.window_start = now;
        true
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn stats(
        &self,
        frame: FrameStats,
        resolution: (u32, u32),
        scale_factor: f32,
        mode: DisplayMode,
    ) -> DebugStats {
        DebugStats {
            fps: self.fps,
            frame_time_avg_ms: self.avg_ms,
            frame_time_min_ms: self.min_ms,
            frame_time_max_ms: self.max_ms,
            point_count: frame.points,
            edge_count: frame.edges,
            resolution,
            scale_factor,
            mode,
        }
    }
}

pub struct DebugOverlay {
    pub visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl DebugOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        visible: bool,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Style: dark, semi-transparent, small monospace white font
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            visible,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Render one egui frame:
    ///
    /// - `field`  — point-field shapes, drained onto a background layer.
    /// - `stats`  — F3 stats panel (`None` = hidden).
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        field: &mut Vec<egui::Shape>,
        stats: Option<&DebugStats>,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            // Point field sits behind everything else.
            if !field.is_empty() {
                let painter = ctx.layer_painter(egui::LayerId::new(
                    egui::Order::Background,
                    egui::Id::new("point_field"),
                ));
                painter.extend(field.drain(..));
            }

            // ── F3: stats panel ──────────────────────────────────────────────
            if let Some(stats) = stats {
                egui::Area::new(egui::Id::new("debug_overlay"))
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .show(ctx, |ui| {
                        egui::Frame::none()
                            .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
                            .inner_margin(egui::Margin::same(8.0))
                            .rounding(4.0)
                            .show(ui, |ui: &mut egui::Ui| {
                                ui.label(format!("FPS: {}", stats.fps));
                                ui.label(format!(
                                    "Frame: {:.2} ms (min: {:.1} | max: {:.1})",
                                    stats.frame_time_avg_ms,
                                    stats.frame_time_min_ms,
                                    stats.frame_time_max_ms
                                ));
                                ui.label(format!("Points: {}", stats.point_count));
                                ui.label(format!("Edges: {}", stats.edge_count));
                                ui.label(format!(
                                    "Resolution: {} x {} @{:.2}x",
                                    stats.resolution.0, stats.resolution.1, stats.scale_factor
                                ));
                                ui.label(format!("Mode: {:?}", stats.mode));
                            });
                    });
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_surface_collects_and_clears() {
        let mut surface = ShapeSurface::new();
        surface.configure(&SurfaceMetrics::new(100.0, 100.0, 2.0, 8192.0));
        assert_eq!(surface.pixels_per_point(), 2.0);

        let color = Rgba::from_rgb8(233, 57, 175).with_alpha(0.5);
        surface.stroke_line(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0, color);
        surface.fill_disc(Vec2::new(5.0, 5.0), 1.5, color);
        assert_eq!(surface.shapes_mut().len(), 2);

        surface.clear();
        assert!(surface.shapes_mut().is_empty());
    }

    #[test]
    fn frame_timer_reports_only_after_a_second() {
        let mut timer = FrameTimer::default();
        assert!(!timer.record());
        assert_eq!(timer.fps(), 0);

        let stats = timer.stats(
            FrameStats { points: 4, edges: 2 },
            (800, 600),
            1.0,
            DisplayMode::Dark,
        );
        assert_eq!(stats.point_count, 4);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.resolution, (800, 600));
    }
}
