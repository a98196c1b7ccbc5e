// Host input for the point field.
// Abstracts winit window events into the few signals the animator listens
// to, plus the pointer state the frame pass reads.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::WindowEvent;

use super::palette::DisplayMode;

/// A window event the animator cares about, still in host units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEvent {
    /// Cursor position in physical pixels, relative to the window's client area.
    PointerMoved(Vec2),
    /// New inner size in physical pixels.
    Resized { width: u32, height: u32 },
    ScaleFactorChanged(f64),
    ThemeChanged(DisplayMode),
}

impl FieldEvent {
    /// Pick the events the point field reacts to out of a winit event.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(Self::PointerMoved(Vec2::new(
                position.x as f32,
                position.y as f32,
            ))),
            WindowEvent::Resized(size) => Some(Self::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(Self::ScaleFactorChanged(*scale_factor))
            }
            WindowEvent::ThemeChanged(theme) => Some(Self::ThemeChanged(DisplayMode::from_theme(*theme))),
            _ => None,
        }
    }

    /// The listener that must be registered for this event to be delivered.
    pub fn listener(&self) -> Option<Listener> {
        match self {
            Self::PointerMoved(_) => Some(Listener::PointerMove),
            Self::Resized { .. } | Self::ScaleFactorChanged(_) => Some(Listener::Resize),
            Self::ThemeChanged(_) => None,
        }
    }
}

/// Last known pointer position in logical units. The overlay covers the
/// whole client area, so client and surface coordinates coincide.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Record a client-relative logical position. Non-finite input is
    /// dropped and the previous position kept.
    pub fn move_to(&mut self, client: Vec2) {
        if client.is_finite() {
            self.position = client;
        } else {
            log::debug!("Ignoring non-finite pointer position {client:?}");
        }
    }
}

/// External event listeners the animator can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    PointerMove,
    Resize,
}

/// Listener registrations currently held by an animator.
#[derive(Debug, Default)]
pub struct ListenerSet {
    active: HashSet<Listener>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Listener) {
        self.active.insert(listener);
    }

    pub fn unregister(&mut self, listener: Listener) {
        self.active.remove(&listener);
    }

    pub fn is_registered(&self, listener: Listener) -> bool {
        self.active.contains(&listener)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_starts_at_origin_and_follows_moves() {
        let mut pointer = PointerState::new();
        assert_eq!(pointer.position(), Vec2::ZERO);

        pointer.move_to(Vec2::new(110.0, 70.0));
        pointer.move_to(Vec2::new(100.0, 50.0));
        assert_eq!(pointer.position(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn non_finite_pointer_keeps_last_position() {
        let mut pointer = PointerState::new();
        pointer.move_to(Vec2::new(5.0, 6.0));
        pointer.move_to(Vec2::new(f32::NAN, 1.0));
        pointer.move_to(Vec2::new(1.0, f32::INFINITY));
        assert_eq!(pointer.position(), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn out_of_surface_pointer_is_kept() {
        let mut pointer = PointerState::new();
        pointer.move_to(Vec2::new(-300.0, 9000.0));
        assert_eq!(pointer.position(), Vec2::new(-300.0, 9000.0));
    }

    #[test]
    fn events_map_to_listeners() {
        assert_eq!(FieldEvent::PointerMoved(Vec2::ZERO).listener(), Some(Listener::PointerMove));
        assert_eq!(
            FieldEvent::Resized { width: 1, height: 1 }.listener(),
            Some(Listener::Resize)
        );
        assert_eq!(FieldEvent::ScaleFactorChanged(2.0).listener(), Some(Listener::Resize));
        assert_eq!(FieldEvent::ThemeChanged(DisplayMode::Light).listener(), None);
    }

    #[test]
    fn winit_resize_is_translated() {
        let event = WindowEvent::Resized(winit::dpi::PhysicalSize::new(640, 480));
        assert_eq!(
            FieldEvent::from_window_event(&event),
            Some(FieldEvent::Resized { width: 640, height: 480 })
        );
        assert_eq!(FieldEvent::from_window_event(&WindowEvent::CloseRequested), None);
    }

    #[test]
    fn listener_set_tracks_registrations() {
        let mut listeners = ListenerSet::new();
        listeners.register(Listener::PointerMove);
        listeners.register(Listener::Resize);
        listeners.register(Listener::Resize);
        assert_eq!(listeners.len(), 2);

        listeners.unregister(Listener::PointerMove);
        assert!(!listeners.is_registered(Listener::PointerMove));
        assert!(listeners.is_registered(Listener::Resize));

        listeners.unregister(Listener::Resize);
        assert!(listeners.is_empty());
    }
}
