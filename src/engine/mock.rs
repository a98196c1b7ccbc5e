// Recording test double for DrawSurface.
// The log is shared so tests can keep watching it after the animator has
// released the surface.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::palette::Rgba;
use super::surface::{DrawSurface, SurfaceMetrics};

/// `lines` and `discs` hold the current frame only; the counters are
/// cumulative.
#[derive(Debug, Default)]
pub struct DrawLog {
    pub configures: Vec<SurfaceMetrics>,
    pub clears: usize,
    pub draw_calls: usize,
    pub lines: Vec<(Vec2, Vec2, Rgba)>,
    pub discs: Vec<(Vec2, Rgba)>,
}

pub struct RecordingSurface {
    log: Rc<RefCell<DrawLog>>,
}

impl RecordingSurface {
    /// A surface plus a handle on its log.
    pub fn with_log() -> (Self, Rc<RefCell<DrawLog>>) {
        let log = Rc::new(RefCell::new(DrawLog::default()));
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl DrawSurface for RecordingSurface {
    fn configure(&mut self, metrics: &SurfaceMetrics) {
        self.log.borrow_mut().configures.push(*metrics);
    }

    fn clear(&mut self) {
        let mut log = self.log.borrow_mut();
        log.clears += 1;
        log.draw_calls += 1;
        log.lines.clear();
        log.discs.clear();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Rgba) {
        let mut log = self.log.borrow_mut();
        log.draw_calls += 1;
        log.lines.push((from, to, color));
    }

    fn fill_disc(&mut self, center: Vec2, _radius: f32, color: Rgba) {
        let mut log = self.log.borrow_mut();
        log.draw_calls += 1;
        log.discs.push((center, color));
    }
}
