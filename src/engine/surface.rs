// Drawing surface abstraction.
//
// The animator draws in logical units only. Whatever backs the surface
// (egui painter on wgpu, a test recorder) maps logical units to physical
// pixels using the metrics handed to configure().

use glam::Vec2;

use super::palette::Rgba;

/// Something the point field can be drawn onto.
pub trait DrawSurface {
    /// Resize the backing store for new metrics. Called on every resize,
    /// before the point set is rebuilt.
    fn configure(&mut self, metrics: &SurfaceMetrics);

    /// Clear the whole surface.
    fn clear(&mut self);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba);
}

/// Logical size and device pixel ratio of the drawing surface.
///
/// Construction clamps everything: no field here is ever negative, NaN or
/// infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    logical_size: Vec2,
    scale_factor: f32,
}

impl Default for SurfaceMetrics {
    fn default() -> Self {
        Self {
            logical_size: Vec2::ZERO,
            scale_factor: 1.0,
        }
    }
}

impl SurfaceMetrics {
    /// Metrics for a `width` x `height` logical surface at `scale_factor`
    /// physical pixels per logical unit. Sides are clamped to `[0, max_extent]`.
    pub fn new(width: f32, height: f32, scale_factor: f32, max_extent: f32) -> Self {
        let clamp_side = |side: f32| {
            if side.is_nan() || side < 0.0 {
                log::warn!("Clamping invalid surface side {side} to 0");
                0.0
            } else if side > max_extent {
                log::warn!("Clamping surface side {side} to {max_extent}");
                max_extent
            } else {
                side
            }
        };
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            log::warn!("Invalid scale factor {scale_factor}, using 1.0");
            1.0
        };

        Self {
            logical_size: Vec2::new(clamp_side(width), clamp_side(height)),
            scale_factor,
        }
    }

    /// Metrics from a physical pixel size, as winit reports it.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64, max_extent: f32) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self::new(
            (width as f64 / scale) as f32,
            (height as f64 / scale) as f32,
            scale as f32,
            max_extent,
        )
    }

    pub fn logical_size(&self) -> Vec2 {
        self.logical_size
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Backing store size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let scaled = self.logical_size * self.scale_factor;
        (scaled.x.round() as u32, scaled.y.round() as u32)
    }

    /// Convert a physical pixel position to logical units.
    pub fn to_logical(&self, physical: Vec2) -> Vec2 {
        physical / self.scale_factor
    }
}
