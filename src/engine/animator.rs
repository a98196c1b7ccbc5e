// Point-field animator: owns the field, the pointer state, the drawing
// surface and the frame loop, and ties them to the host's lifecycle.
//
// Lifecycle:
//   mount(surface, metrics)  → listeners registered, field built, loop started
//   dispatch(event)          → pointer / resize updates (only while registered)
//   tick()                   → renders one frame if the loop has one pending
//   unmount()                → loop stopped, listeners removed, surface released
//
// A resize rebuilds the field before returning, so the next frame always
// sees a point set matching the current surface.

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::field::PointField;
use super::frame_loop::{FrameHandle, FrameLoop};
use super::input::{FieldEvent, Listener, ListenerSet, PointerState};
use super::palette::{DisplayMode, Palette};
use super::surface::{DrawSurface, SurfaceMetrics};
use crate::config::FieldConfig;

/// What one rendered frame contained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub points: usize,
    pub edges: usize,
}

pub struct Animator<S: DrawSurface> {
    config: FieldConfig,
    surface: Option<S>,
    field: PointField,
    pointer: PointerState,
    metrics: SurfaceMetrics,
    mode: DisplayMode,
    listeners: ListenerSet,
    frames: FrameLoop,
    frame_handle: Option<FrameHandle>,
    rng: StdRng,
}

impl<S: DrawSurface> Animator<S> {
    pub fn new(config: FieldConfig, mode: DisplayMode) -> Self {
        Self {
            config,
            surface: None,
            field: PointField::new(config),
            pointer: PointerState::new(),
            metrics: SurfaceMetrics::default(),
            mode,
            listeners: ListenerSet::new(),
            frames: FrameLoop::new(),
            frame_handle: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed for the lattice jitter.
    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Take ownership of `surface`, build the field for `metrics` and start
    /// animating. Mounting twice releases the previous surface first.
    pub fn mount(&mut self, surface: S, metrics: SurfaceMetrics) {
        if self.is_mounted() {
            log::warn!("Animator mounted twice, releasing previous surface");
            self.unmount();
        }

        self.surface = Some(surface);
        self.listeners.register(Listener::PointerMove);
        self.listeners.register(Listener::Resize);
        self.apply_metrics(metrics);
        self.frame_handle = Some(self.frames.start());

        log::info!(
            "Point field mounted: {} points on {:.0}x{:.0} @{}x",
            self.field.len(),
            metrics.logical_size().x,
            metrics.logical_size().y,
            metrics.scale_factor()
        );
    }

    /// Stop the frame loop, drop both listeners and hand the surface back.
    /// After this no draw call reaches any surface.
    pub fn unmount(&mut self) -> Option<S> {
        if let Some(handle) = self.frame_handle.take() {
            handle.stop();
        }
        self.listeners.unregister(Listener::PointerMove);
        self.listeners.unregister(Listener::Resize);

        let surface = self.surface.take();
        if surface.is_some() {
            log::info!("Point field unmounted after {} frames", self.frames.frames());
        }
        surface
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Route a host event. Events whose listener is not registered are
    /// dropped.
    pub fn dispatch(&mut self, event: FieldEvent) {
        if let Some(listener) = event.listener() {
            if !self.listeners.is_registered(listener) {
                return;
            }
        }

        match event {
            FieldEvent::PointerMoved(physical) => {
                let logical = self.metrics.to_logical(physical);
                self.on_pointer_move(logical.x, logical.y);
            }
            FieldEvent::Resized { width, height } => {
                let scale_factor = self.metrics.scale_factor() as f64;
                self.resize_physical(width, height, scale_factor);
            }
            FieldEvent::ScaleFactorChanged(scale_factor) => {
                let (width, height) = self.metrics.physical_size();
                self.resize_physical(width, height, scale_factor);
            }
            FieldEvent::ThemeChanged(mode) => self.set_mode(mode),
        }
    }

    /// Resize to a `width` x `height` logical surface at `scale_factor`.
    pub fn on_resize(&mut self, width: f32, height: f32, scale_factor: f32) {
        let metrics = SurfaceMetrics::new(width, height, scale_factor, self.config.max_extent);
        self.apply_metrics(metrics);
    }

    fn resize_physical(&mut self, width: u32, height: u32, scale_factor: f64) {
        let metrics =
            SurfaceMetrics::from_physical(width, height, scale_factor, self.config.max_extent);
        let size = metrics.logical_size();
        self.on_resize(size.x, size.y, metrics.scale_factor());
    }

    fn apply_metrics(&mut self, metrics: SurfaceMetrics) {
        self.metrics = metrics;
        if let Some(surface) = self.surface.as_mut() {
            surface.configure(&metrics);
        }
        let size = metrics.logical_size();
        self.field.initialize(size.x, size.y, &mut self.rng);
        log::debug!(
            "Resized to {:.0}x{:.0}: {}x{} lattice, {} points",
            size.x,
            size.y,
            self.field.lattice().0,
            self.field.lattice().1,
            self.field.len()
        );
    }

    /// Record the pointer position in logical client coordinates. Takes
    /// effect on the next frame.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.move_to(Vec2::new(x, y));
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if mode != self.mode {
            log::debug!("Display mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    /// True when the frame loop has a frame due.
    pub fn wants_frame(&self) -> bool {
        self.frames.wants_frame()
    }

    /// Run the pending frame, if any, and schedule the next one.
    pub fn tick(&mut self) -> Option<FrameStats> {
        if !self.frames.begin_frame() {
            return None;
        }
        let stats = self.render_frame();
        self.frames.schedule_next();
        stats
    }

    /// Illuminate, connect and draw the whole field once. Returns `None`
    /// when no surface is mounted.
    pub fn render_frame(&mut self) -> Option<FrameStats> {
        let surface = self.surface.as_mut()?;
        let palette = Palette::for_mode(self.mode);
        let line_width = self.config.line_width;
        let point_radius = self.config.point_radius;

        surface.clear();
        if self.field.is_empty() {
            return Some(FrameStats::default());
        }
        self.field.illuminate(self.pointer.position());

        let mut edges = 0;
        for i in 0..self.field.len() {
            edges += self.field.connect_from(i, |edge| {
                surface.stroke_line(edge.from, edge.to, line_width, palette.edge_color(edge.alpha));
            });
            let point = self.field.points()[i];
            surface.fill_disc(point.position, point_radius, palette.point_color(point.alpha));
        }

        Some(FrameStats {
            points: self.field.len(),
            edges,
        })
    }

    #[cfg(test)]
    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn metrics(&self) -> SurfaceMetrics {
        self.metrics
    }

    #[cfg(test)]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    #[cfg(test)]
    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frames.frames()
    }
}
