// Color tables for the two display modes.
// The geometry never looks at the mode; only the palette lookup does.

use serde::{Deserialize, Serialize};

/// Binary display mode supplied by the host (system theme or user toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Light,
    #[default]
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn from_theme(theme: winit::window::Theme) -> Self {
        match theme {
            winit::window::Theme::Light => Self::Light,
            winit::window::Theme::Dark => Self::Dark,
        }
    }
}

/// Straight (non-premultiplied) RGBA color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Same color with alpha replaced, clamped to [0, 1].
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn to_egui(self) -> egui::Color32 {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a))
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Sakura pink shared by points and edges.
const SAKURA: Rgba = Rgba::from_rgb8(233, 57, 175);

/// Everything the frame pass needs to color one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub point: Rgba,
    pub edge: Rgba,
    /// Multiplier applied to a point's alpha when filling its disc.
    pub point_dimming: f32,
    /// Multiplier applied to an edge's alpha when stroking it.
    pub edge_dimming: f32,
}

const DARK: Palette = Palette {
    background: Rgba::from_rgb8(0x1a, 0x1a, 0x2e),
    point: SAKURA,
    edge: SAKURA,
    point_dimming: 0.4,
    edge_dimming: 0.3,
};

const LIGHT: Palette = Palette {
    background: Rgba::from_rgb8(0xf7, 0xfa, 0xfc),
    point: SAKURA,
    edge: SAKURA,
    point_dimming: 0.3,
    edge_dimming: 0.2,
};

impl Palette {
    pub fn for_mode(mode: DisplayMode) -> &'static Palette {
        match mode {
            DisplayMode::Dark => &DARK,
            DisplayMode::Light => &LIGHT,
        }
    }

    /// Fill color for a point of the given alpha.
    pub fn point_color(&self, alpha: f32) -> Rgba {
        self.point.with_alpha(alpha * self.point_dimming)
    }

    /// Stroke color for an edge of the given alpha.
    pub fn edge_color(&self, alpha: f32) -> Rgba {
        self.edge.with_alpha(alpha * self.edge_dimming)
    }
}
