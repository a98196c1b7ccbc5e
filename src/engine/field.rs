// Point field: a jittered lattice of ambient points.
//
// Per frame:
//   illuminate()  — alpha from distance to the pointer, connection counts reset
//   connect()     — greedy, degree-capped edge selection in index order
//
// Edge selection is deliberately order dependent: point i only looks at
// points j > i, and a candidate that already reached the degree cap is
// skipped, never replaced by the next-closest one. An origin stops taking
// edges once it is capped itself.

use glam::Vec2;
use rand::Rng;

use crate::config::{FieldConfig, MIN_GRID_SIZE};

/// One ambient point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vec2,
    pub base_alpha: f32,
    pub alpha: f32,
    pub connections: u32,
}

impl Point {
    pub fn new(position: Vec2, base_alpha: f32) -> Self {
        Self {
            position,
            base_alpha,
            alpha: base_alpha,
            connections: 0,
        }
    }
}

/// An edge selected for drawing this frame. Never stored past the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
}

pub struct PointField {
    config: FieldConfig,
    points: Vec<Point>,
    columns: usize,
    rows: usize,
    /// Candidate buffer reused by every connect() call.
    candidates: Vec<(usize, f32)>,
}

impl PointField {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            points: Vec::new(),
            columns: 0,
            rows: 0,
            candidates: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lattice dimensions of the current point set as (columns, rows).
    pub fn lattice(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Number of lattice lines at spacing `grid` needed to cover `extent`,
    /// including the extra line that lets the lattice overrun the far edge.
    fn lines_for(extent: f32, grid: f32) -> usize {
        (extent / grid).ceil() as usize + 1
    }

    /// Rebuild the whole point set for a `width` x `height` surface.
    ///
    /// Callers are expected to pass already-clamped, finite, non-negative
    /// dimensions; anything else is treated as zero. The spacing never drops
    /// below `MIN_GRID_SIZE` and widens as needed to stay within `max_points`.
    pub fn initialize<R: Rng>(&mut self, width: f32, height: f32, rng: &mut R) {
        let sane = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let (width, height) = (sane(width), sane(height));

        let max_points = self.config.max_points.max(1);
        let mut grid = self.config.grid_size.max(MIN_GRID_SIZE);
        while Self::lines_for(width, grid) * Self::lines_for(height, grid) > max_points {
            grid *= 1.25;
        }
        if grid != self.config.grid_size {
            log::warn!(
                "Lattice spacing {} widened to {grid:.1} to keep {width:.0}x{height:.0} within {max_points} points",
                self.config.grid_size
            );
        }

        let half_jitter = grid * self.config.jitter / 2.0;
        self.columns = Self::lines_for(width, grid);
        self.rows = Self::lines_for(height, grid);

        self.points.clear();
        self.points.reserve(self.columns * self.rows);
        for i in 0..self.columns {
            for j in 0..self.rows {
                let mut position = Vec2::new(i as f32 * grid, j as f32 * grid);
                if half_jitter > 0.0 {
                    position.x += rng.gen_range(-half_jitter..half_jitter);
                    position.y += rng.gen_range(-half_jitter..half_jitter);
                }
                self.points.push(Point::new(position, self.config.base_alpha));
            }
        }
    }

    /// Replace the point set with explicit positions. Used for hand-built
    /// layouts; the lattice dimensions become (len, 1).
    #[cfg(test)]
    pub fn set_points(&mut self, positions: impl IntoIterator<Item = Vec2>) {
        self.points.clear();
        self.points.extend(
            positions
                .into_iter()
                .map(|p| Point::new(p, self.config.base_alpha)),
        );
        self.columns = self.points.len();
        self.rows = 1;
    }

    /// Step A: recompute every point's alpha from its distance to `pointer`
    /// and clear its connection count.
    pub fn illuminate(&mut self, pointer: Vec2) {
        let radius = self.config.hover_radius;
        let boost = self.config.illumination_boost;
        for point in &mut self.points {
            let distance = point.position.distance(pointer);
            point.alpha = if distance < radius {
                point.base_alpha + boost * (1.0 - distance / radius)
            } else {
                point.base_alpha
            };
            point.connections = 0;
        }
    }

    /// Step B: select edges for point `i` against every later point and
    /// hand each drawn edge to `on_edge`. Returns how many were drawn.
    ///
    /// Expects `illuminate` to have run this frame.
    pub fn connect_from(&mut self, i: usize, mut on_edge: impl FnMut(Edge)) -> usize {
        let max = self.config.max_connections;
        let reach = self.config.connection_distance;
        let Some(origin) = self.points.get(i).map(|p| p.position) else {
            return 0;
        };

        self.candidates.clear();
        for (j, other) in self.points.iter().enumerate().skip(i + 1) {
            let distance = origin.distance(other.position);
            if distance < reach {
                self.candidates.push((j, distance));
            }
        }
        // Stable, so equidistant candidates keep index order.
        self.candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut drawn = 0;
        for k in 0..self.candidates.len().min(max as usize) {
            if self.points[i].connections >= max {
                break;
            }
            let (j, distance) = self.candidates[k];
            if self.points[j].connections >= max {
                continue;
            }
            let a = self.points[i];
            let b = self.points[j];
            on_edge(Edge {
                from: a.position,
                to: b.position,
                alpha: a.alpha.min(b.alpha) * (1.0 - distance / reach),
            });
            self.points[i].connections += 1;
            self.points[j].connections += 1;
            drawn += 1;
        }
        drawn
    }

    /// Step B over the whole field. Returns the number of edges drawn.
    #[cfg(test)]
    pub fn connect(&mut self, mut on_edge: impl FnMut(Edge)) -> usize {
        (0..self.points.len())
            .map(|i| self.connect_from(i, &mut on_edge))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn field() -> PointField {
        PointField::new(FieldConfig::default())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn lattice_size_matches_formula() {
        let mut field = field();
        for &(w, h) in &[(800.0, 600.0), (1.0, 1.0), (49.0, 51.0), (1280.0, 720.0), (50.0, 100.0)] {
            field.initialize(w, h, &mut rng());
            let cols = (w / 50.0_f32).ceil() as usize + 1;
            let rows = (h / 50.0_f32).ceil() as usize + 1;
            assert_eq!(field.len(), cols * rows, "size {w}x{h}");
            assert_eq!(field.lattice(), (cols, rows));
        }
    }

    #[test]
    fn points_stay_within_jitter_of_lattice() {
        let mut field = field();
        field.initialize(800.0, 600.0, &mut rng());
        let (_, rows) = field.lattice();
        let bound = 50.0 * 0.1 + 1e-4;
        for (n, point) in field.points().iter().enumerate() {
            let lattice = Vec2::new((n / rows) as f32 * 50.0, (n % rows) as f32 * 50.0);
            let offset = point.position - lattice;
            assert!(offset.x.abs() <= bound && offset.y.abs() <= bound, "point {n}: {offset:?}");
            assert_eq!(point.alpha, point.base_alpha);
            assert_eq!(point.connections, 0);
        }
    }

    #[test]
    fn degenerate_dimensions_give_single_point() {
        let mut field = field();
        for &(w, h) in &[(0.0, 0.0), (-10.0, -5.0), (f32::NAN, f32::NAN), (f32::INFINITY, 0.0)] {
            field.initialize(w, h, &mut rng());
            assert_eq!(field.len(), 1, "size {w}x{h}");
        }
    }

    #[test]
    fn reinitialize_replaces_the_whole_set() {
        let mut field = field();
        field.initialize(800.0, 600.0, &mut rng());
        field.initialize(400.0, 300.0, &mut rng());
        assert_eq!(field.len(), 9 * 7);
        let bound = 50.0 * 0.1 + 1e-4;
        for point in field.points() {
            assert!(point.position.x >= -bound && point.position.x <= 400.0 + bound);
            assert!(point.position.y >= -bound && point.position.y <= 300.0 + bound);
        }
    }

    #[test]
    fn point_count_stays_bounded_for_fine_grids() {
        // Bypasses sanitized() on purpose: the field guards itself too.
        let mut field = PointField::new(FieldConfig {
            grid_size: 0.5,
            ..FieldConfig::default()
        });
        field.initialize(1280.0, 720.0, &mut rng());
        assert!(field.len() <= 40_000, "len = {}", field.len());
        assert!(field.len() > 1);

        let mut field = PointField::new(FieldConfig {
            max_points: 100,
            ..FieldConfig::default()
        });
        field.initialize(8192.0, 8192.0, &mut rng());
        assert!(field.len() <= 100, "len = {}", field.len());
    }

    #[test]
    fn largest_default_surface_keeps_formula() {
        let mut field = field();
        field.initialize(8192.0, 8192.0, &mut rng());
        let lines = (8192.0_f32 / 50.0).ceil() as usize + 1;
        assert_eq!(field.len(), lines * lines);
    }

    #[test]
    fn illumination_falls_off_linearly() {
        let mut field = field();
        field.set_points([Vec2::new(10.0, 10.0), Vec2::new(150.0, 0.0), Vec2::new(400.0, 400.0)]);
        field.illuminate(Vec2::ZERO);

        let expected = 0.1 + 0.5 * (1.0 - 200.0_f32.sqrt() / 150.0);
        assert!((field.points()[0].alpha - expected).abs() < 1e-5);
        assert!((field.points()[0].alpha - 0.547).abs() < 0.01);
        // Exactly on the radius is outside.
        assert_eq!(field.points()[1].alpha, 0.1);
        assert_eq!(field.points()[2].alpha, 0.1);
    }

    #[test]
    fn alpha_stays_within_bounds() {
        let mut field = field();
        field.initialize(600.0, 400.0, &mut rng());
        for pointer in [Vec2::ZERO, Vec2::new(300.0, 200.0), Vec2::new(-1000.0, 5.0)] {
            field.illuminate(pointer);
            for point in field.points() {
                assert!(point.alpha >= point.base_alpha);
                assert!(point.alpha <= point.base_alpha + 0.5 + 1e-6);
                if point.position.distance(pointer) >= 150.0 {
                    assert_eq!(point.alpha, point.base_alpha);
                }
            }
        }
    }

    #[test]
    fn edge_alpha_uses_weaker_endpoint() {
        let mut field = field();
        field.set_points([Vec2::ZERO, Vec2::new(60.0, 0.0)]);
        field.illuminate(Vec2::new(5000.0, 5000.0));

        let mut edges = Vec::new();
        let drawn = field.connect(|e| edges.push(e));

        assert_eq!(drawn, 1);
        assert!((edges[0].alpha - 0.025).abs() < 1e-6);
        assert_eq!(edges[0].from, Vec2::ZERO);
        assert_eq!(edges[0].to, Vec2::new(60.0, 0.0));
        assert!(field.points().iter().all(|p| p.connections == 1));
    }

    #[test]
    fn points_beyond_connection_distance_stay_unconnected() {
        let mut field = field();
        field.set_points([Vec2::ZERO, Vec2::new(80.0, 0.0)]);
        field.illuminate(Vec2::ZERO);
        assert_eq!(field.connect(|_| {}), 0);
    }

    #[test]
    fn only_closest_candidates_are_taken() {
        let mut field = field();
        // Origin first, then four neighbours at increasing distance.
        field.set_points([
            Vec2::ZERO,
            Vec2::new(40.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(-20.0, 0.0),
            Vec2::new(0.0, -30.0),
        ]);
        field.illuminate(Vec2::new(5000.0, 0.0));

        let mut targets = Vec::new();
        field.connect_from(0, |e| targets.push(e.to));
        assert_eq!(
            targets,
            vec![Vec2::new(0.0, 10.0), Vec2::new(-20.0, 0.0), Vec2::new(0.0, -30.0)]
        );
        assert_eq!(field.points()[0].connections, 3);
        assert_eq!(field.points()[1].connections, 0);
    }

    fn capped_field(max_connections: u32) -> PointField {
        PointField::new(FieldConfig {
            max_connections,
            ..FieldConfig::default()
        })
    }

    #[test]
    fn capped_candidate_is_skipped_not_replaced() {
        let mut field = capped_field(1);
        // Point 0 saturates point 2 first. Point 1's single closest candidate
        // is then point 2, which is skipped; point 3 is not taken instead.
        field.set_points([
            Vec2::ZERO,
            Vec2::new(50.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(95.0, 0.0),
        ]);
        field.illuminate(Vec2::new(5000.0, 0.0));

        let mut edges = Vec::new();
        field.connect(|e| edges.push((e.from, e.to)));

        assert_eq!(edges, vec![(Vec2::ZERO, Vec2::new(10.0, 0.0))]);
        assert_eq!(field.points()[1].connections, 0);
        assert_eq!(field.points()[3].connections, 0);
    }

    #[test]
    fn origin_at_cap_takes_no_more_edges() {
        let mut field = capped_field(1);
        field.set_points([Vec2::new(-10.0, 0.0), Vec2::ZERO, Vec2::new(10.0, 0.0)]);
        field.illuminate(Vec2::ZERO);

        assert_eq!(field.connect(|_| {}), 1);
        let counts: Vec<u32> = field.points().iter().map(|p| p.connections).collect();
        assert_eq!(counts, vec![1, 1, 0]);
    }

    #[test]
    fn connection_counts_never_exceed_cap() {
        let mut field = field();
        field.initialize(1000.0, 800.0, &mut rng());
        field.illuminate(Vec2::new(500.0, 400.0));
        let drawn = field.connect(|_| {});
        assert!(drawn > 0);
        for point in field.points() {
            assert!(point.connections <= 3, "connections = {}", point.connections);
        }
    }

    #[test]
    fn frame_pass_is_a_pure_function_of_state() {
        let mut field = field();
        field.initialize(640.0, 480.0, &mut rng());
        let pointer = Vec2::new(200.0, 100.0);

        field.illuminate(pointer);
        let mut first_edges = Vec::new();
        field.connect(|e| first_edges.push(e));
        let first = field.points().to_vec();

        field.illuminate(pointer);
        let mut second_edges = Vec::new();
        field.connect(|e| second_edges.push(e));

        assert_eq!(first, field.points());
        assert_eq!(first_edges, second_edges);
    }
}
