// Engine module - the ambient point-field backdrop and the pieces it
// is built from.

pub mod animator;
pub mod debug_overlay;
pub mod field;
pub mod frame_loop;
pub mod input;
pub mod palette;
pub mod surface;

#[cfg(test)]
mod mock;

// Re-export commonly used items
pub use animator::Animator;
pub use input::FieldEvent;
pub use palette::{DisplayMode, Palette};
pub use surface::SurfaceMetrics;
